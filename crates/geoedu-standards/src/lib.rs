#![deny(unsafe_code)]

pub mod error;
pub mod layout;
pub mod loaders;
pub mod paths;
pub mod reference;

pub use crate::error::{Result, StandardsError};
pub use crate::layout::{FileSpec, InputLayout, ResolvedFile};
pub use crate::loaders::{
    load_default_input_layout, load_default_reference_tables, load_input_layout,
    load_reference_tables,
};
pub use crate::reference::{
    CohortCriteria, ColumnAdapter, CutoffTable, DependencyEntry, ReferenceTables, RegionEntry,
};
