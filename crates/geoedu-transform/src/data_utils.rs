//! Column extraction helpers.
//!
//! Stages read whole columns into vectors, work row by row in Rust and write
//! the result back with `DataFrame::with_column`.

use polars::prelude::*;

use crate::error::{Result, TransformError};

fn require<'a>(df: &'a DataFrame, stage: &'static str, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| TransformError::MissingColumn {
        stage,
        column: name.to_string(),
    })
}

/// Text values of a column, nulls preserved.
pub fn str_values(df: &DataFrame, stage: &'static str, name: &str) -> Result<Vec<Option<String>>> {
    let column = require(df, stage, name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Float values of a column, cast from any numeric type.
pub fn f64_values(df: &DataFrame, stage: &'static str, name: &str) -> Result<Vec<Option<f64>>> {
    let column = require(df, stage, name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

/// Integer values of a column, cast from any numeric type.
pub fn i64_values(df: &DataFrame, stage: &'static str, name: &str) -> Result<Vec<Option<i64>>> {
    let column = require(df, stage, name)?.cast(&DataType::Int64)?;
    Ok(column.i64()?.into_iter().collect())
}

/// Fails unless every listed column exists.
pub fn ensure_columns(df: &DataFrame, stage: &'static str, names: &[&str]) -> Result<()> {
    for name in names {
        require(df, stage, name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_cast_to_requested_type() {
        let df = df! {
            "code" => [Some(13i64), None],
            "lat" => [Some(-33.45f64), Some(-36.6)],
        }
        .unwrap();

        assert_eq!(f64_values(&df, "test", "code").unwrap(), vec![Some(13.0), None]);
        assert_eq!(i64_values(&df, "test", "code").unwrap(), vec![Some(13), None]);
        assert_eq!(
            str_values(&df, "test", "code").unwrap(),
            vec![Some("13".to_string()), None]
        );
    }

    #[test]
    fn missing_column_names_the_stage() {
        let df = df! { "a" => [1i64] }.unwrap();
        let err = f64_values(&df, "distance", "school_lat").unwrap_err();
        assert_eq!(err.to_string(), "distance: column 'school_lat' not found");
    }
}
