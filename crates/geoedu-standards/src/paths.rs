//! Standards directory path resolution.

use std::path::PathBuf;

/// Environment variable for overriding the standards directory.
pub const STANDARDS_ENV_VAR: &str = "GEOEDU_STANDARDS_DIR";

/// File name of the reference tables inside a standards directory.
pub const REFERENCE_FILE: &str = "reference.toml";

/// File name of the input layout inside a standards directory.
pub const LAYOUT_FILE: &str = "layout.toml";

/// Standards directory override from the environment, if any.
///
/// When unset, loaders fall back to the tables embedded at build time from
/// the workspace `standards/` directory.
pub fn standards_root_override() -> Option<PathBuf> {
    std::env::var_os(STANDARDS_ENV_VAR).map(PathBuf::from)
}
