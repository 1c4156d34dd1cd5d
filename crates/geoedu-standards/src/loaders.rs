use std::path::Path;

use crate::error::{Result, StandardsError};
use crate::layout::InputLayout;
use crate::paths::{LAYOUT_FILE, REFERENCE_FILE, standards_root_override};
use crate::reference::ReferenceTables;

const EMBEDDED_REFERENCE: &str = include_str!("../../../standards/reference.toml");
const EMBEDDED_LAYOUT: &str = include_str!("../../../standards/layout.toml");

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| StandardsError::io(path, source))
}

/// Load reference tables from `<dir>/reference.toml`.
pub fn load_reference_tables(dir: &Path) -> Result<ReferenceTables> {
    let path = dir.join(REFERENCE_FILE);
    let text = read_text(&path)?;
    ReferenceTables::from_toml_str(&text, &path.display().to_string())
}

/// Load the input layout from `<dir>/layout.toml`.
pub fn load_input_layout(dir: &Path) -> Result<InputLayout> {
    let path = dir.join(LAYOUT_FILE);
    let text = read_text(&path)?;
    InputLayout::from_toml_str(&text, &path.display().to_string())
}

/// Reference tables from `GEOEDU_STANDARDS_DIR`, or the embedded defaults.
pub fn load_default_reference_tables() -> Result<ReferenceTables> {
    match standards_root_override() {
        Some(dir) => load_reference_tables(&dir),
        None => ReferenceTables::from_toml_str(EMBEDDED_REFERENCE, "embedded reference.toml"),
    }
}

/// Input layout from `GEOEDU_STANDARDS_DIR`, or the embedded defaults.
pub fn load_default_input_layout() -> Result<InputLayout> {
    match standards_root_override() {
        Some(dir) => load_input_layout(&dir),
        None => InputLayout::from_toml_str(EMBEDDED_LAYOUT, "embedded layout.toml"),
    }
}
