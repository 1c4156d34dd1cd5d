//! Delimited text loading.

mod header;
mod reader;

pub use header::normalize_header;
pub use reader::{check_file_exists, read_text_table};
