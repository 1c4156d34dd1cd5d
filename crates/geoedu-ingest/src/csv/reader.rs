//! CSV reading with every column kept as text.
//!
//! Type coercion happens afterwards in [`crate::schema`], column by column, so
//! that a malformed identifier can be reported with its row instead of failing
//! the whole parse.

use std::path::Path;

use polars::prelude::*;

use crate::error::{IngestError, Result};

use super::header::normalize_header;

/// Fails with [`IngestError::FileNotFound`] when `path` is not a readable file.
pub fn check_file_exists(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(()),
        Ok(_) => Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Reads a delimited file into a DataFrame of string columns.
///
/// Headers are trimmed and stripped of a UTF-8 byte-order mark. Invalid UTF-8
/// is replaced rather than rejected, since ministry exports are not always
/// clean.
pub fn read_text_table(path: &Path, delimiter: u8) -> Result<DataFrame> {
    check_file_exists(path)?;

    let csv_error = |e: PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| {
            opts.with_separator(delimiter)
                .with_encoding(CsvEncoding::LossyUtf8)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(csv_error)?
        .finish()
        .map_err(csv_error)?;

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| normalize_header(name.as_str()))
        .collect();
    if names.is_empty() || names.iter().all(String::is_empty) {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }
    df.set_column_names(names)?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read delimited file"
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn reads_semicolon_file_as_text() {
        let file = create_temp_csv("\u{feff}mrun;region_sede\n101;Región de Ñuble\n102;\n");
        let df = read_text_table(file.path(), b';').unwrap();

        assert_eq!(df.height(), 2);
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["mrun", "region_sede"]);
        assert_eq!(df.column("mrun").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_text_table(Path::new("/nonexistent/set.csv"), b',').unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
