//! CSV artifact writing.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::checksum::compute_file_sha256;
use crate::error::{OutputError, Result};
use crate::manifest::ArtifactRecord;

/// Writes `df` as a comma-separated file with a header row.
pub fn write_frame_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    let mut data = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut data)
        .map_err(|e| OutputError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(())
}

/// Writes `<dir>/<name>.csv` and records it for the manifest.
pub fn write_artifact(dir: &Path, name: &str, df: &DataFrame) -> Result<ArtifactRecord> {
    let file_name = format!("{name}.csv");
    let path = dir.join(&file_name);
    write_frame_csv(df, &path)?;
    let sha256 = compute_file_sha256(&path)?;
    tracing::info!(artifact = name, rows = df.height(), path = %path.display(), "wrote artifact");
    Ok(ArtifactRecord {
        name: name.to_string(),
        file: file_name,
        rows: df.height(),
        sha256,
    })
}
