//! Source-to-canonical column mapping and type coercion.
//!
//! Each dataset declares which raw headers feed which canonical column and how
//! the text is coerced. Identifiers are strict: a non-empty value that is not
//! an integer aborts the load. Other numeric columns degrade to null and the
//! count is reported.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::*;

use geoedu_model::DatasetKind;
use geoedu_model::columns as cols;
use geoedu_standards::ColumnAdapter;

use crate::error::{IngestError, Result};
use crate::parse::{is_blank, parse_f64, parse_i64};

/// How a source column is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Trimmed text; blank becomes null.
    Text,
    /// Integer code; unparseable becomes null.
    Integer,
    /// Integer key; unparseable non-blank values are fatal.
    Identifier,
    /// Decimal; unparseable becomes null.
    Float,
}

/// One canonical column and the raw headers that may provide it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub canonical: &'static str,
    /// Candidate headers, first present wins.
    pub sources: Vec<String>,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    fn new(canonical: &'static str, source: &str, kind: ColumnKind) -> Self {
        Self {
            canonical,
            sources: vec![source.to_string()],
            kind,
        }
    }

    fn with_fallback(mut self, source: &str) -> Self {
        self.sources.push(source.to_string());
        self
    }
}

/// Column layout of one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSchema {
    pub dataset: DatasetKind,
    pub columns: Vec<ColumnSpec>,
}

/// Values that were present but could not be coerced, per canonical column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoercionReport {
    pub rows: usize,
    pub nulled: BTreeMap<&'static str, usize>,
}

impl CoercionReport {
    pub fn total_nulled(&self) -> usize {
        self.nulled.values().sum()
    }
}

pub fn enrollment_schema() -> DatasetSchema {
    use ColumnKind::{Identifier, Integer, Text};
    DatasetSchema {
        dataset: DatasetKind::Enrollment,
        columns: vec![
            ColumnSpec::new(cols::MRUN, "mrun", Identifier),
            ColumnSpec::new(cols::DESTINATION_REGION, "region_sede", Text),
            ColumnSpec::new(cols::DESTINATION_PROVINCE, "provincia_sede", Text),
            ColumnSpec::new(cols::DESTINATION_COMMUNE, "comuna_sede", Text),
            ColumnSpec::new(cols::INSTITUTION_CODE, "cod_inst", Integer),
            ColumnSpec::new(cols::INSTITUTION_NAME, "nomb_inst", Text),
            ColumnSpec::new(cols::PROGRAM_NAME, "nomb_carrera", Text),
            ColumnSpec::new(cols::INSTITUTION_TYPE_1, "tipo_inst_1", Text),
            ColumnSpec::new(cols::INSTITUTION_TYPE_2, "tipo_inst_2", Text),
            ColumnSpec::new(cols::INSTITUTION_TYPE_3, "tipo_inst_3", Text),
            ColumnSpec::new(cols::GLOBAL_LEVEL, "nivel_global", Text),
            ColumnSpec::new(cols::PROGRAM_LEVEL, "nivel_carrera_1", Text),
            ColumnSpec::new(cols::CURRENT_ENTRY_YEAR, "anio_ing_carr_act", Integer),
            ColumnSpec::new(cols::ORIGINAL_ENTRY_YEAR, "anio_ing_carr_ori", Integer),
            ColumnSpec::new(cols::ADMISSION_FORM, "forma_ingreso", Text),
            ColumnSpec::new(cols::AGE_RANGE, "rango_edad", Text),
        ],
    }
}

/// Score table schema for a cycle.
///
/// Adapter columns carry scores and are parsed as decimals. An adapter whose
/// canonical name matches a fixed column takes precedence over its header.
pub fn score_schema(adapters: &[&ColumnAdapter]) -> DatasetSchema {
    use ColumnKind::{Float, Identifier, Integer, Text};
    let mut columns = vec![
        ColumnSpec::new(cols::MRUN, "MRUN", Identifier),
        ColumnSpec::new(cols::RBD, "RBD", Identifier),
        ColumnSpec::new(cols::ORIGIN_REGION_CODE, "CODIGO_REGION_EGRESO", Integer),
        ColumnSpec::new(cols::ORIGIN_REGION, "NOMBRE_REGION_EGRESO", Text),
        ColumnSpec::new(cols::RANKING_SCORE, "PTJE_RANKING", Float),
        ColumnSpec::new(cols::NEM_SCORE, "PTJE_NEM", Float),
    ];
    for adapter in adapters {
        match columns
            .iter_mut()
            .find(|spec| spec.canonical == adapter.canonical)
        {
            Some(spec) => spec.sources.insert(0, adapter.source.clone()),
            None => match known_score_column(&adapter.canonical) {
                Some(canonical) => columns.push(ColumnSpec::new(canonical, &adapter.source, Float)),
                None => tracing::warn!(
                    canonical = %adapter.canonical,
                    source = %adapter.source,
                    "ignoring score adapter with unknown target column"
                ),
            },
        }
    }
    DatasetSchema {
        dataset: DatasetKind::Scores,
        columns,
    }
}

fn known_score_column(name: &str) -> Option<&'static str> {
    [cols::COMPOSITE_SCORE, cols::RANKING_SCORE, cols::NEM_SCORE]
        .into_iter()
        .find(|known| *known == name)
}

pub fn school_schema() -> DatasetSchema {
    use ColumnKind::{Float, Identifier, Integer, Text};
    DatasetSchema {
        dataset: DatasetKind::Schools,
        columns: vec![
            ColumnSpec::new(cols::RBD, "RBD", Identifier),
            ColumnSpec::new(cols::SCHOOL_NAME, "NOM_RBD", Text),
            ColumnSpec::new(cols::SCHOOL_REGION_CODE, "COD_REG_RB", Integer),
            ColumnSpec::new(cols::DEPENDENCY_CODE, "TIPO_DEPEN", Integer),
            ColumnSpec::new(cols::SCHOOL_LAT, "LATITUD", Float),
            ColumnSpec::new(cols::SCHOOL_LON, "LONGITUD", Float),
        ],
    }
}

pub fn campus_schema() -> DatasetSchema {
    use ColumnKind::{Float, Text};
    DatasetSchema {
        dataset: DatasetKind::Campuses,
        columns: vec![
            ColumnSpec::new(cols::CAMPUS_INSTITUTION, "NOMBRE_INS", Text),
            ColumnSpec::new(cols::CAMPUS_REGION, "REGIÓN", Text).with_fallback("REGION"),
            ColumnSpec::new(cols::CAMPUS_COMMUNE, "COMUNA", Text),
            ColumnSpec::new(cols::CAMPUS_LAT, "LATITUD", Float),
            ColumnSpec::new(cols::CAMPUS_LON, "LONGITUD", Float),
            ColumnSpec::new(cols::CAMPUS_INSTITUTION_TYPE, "TIPO_INST", Text),
        ],
    }
}

pub fn vulnerability_schema() -> DatasetSchema {
    use ColumnKind::{Float, Identifier};
    DatasetSchema {
        dataset: DatasetKind::Vulnerability,
        columns: vec![
            ColumnSpec::new(cols::RBD, "ID_RBD", Identifier),
            ColumnSpec::new(cols::EVALUATED, "N EVALUADO", Float),
            ColumnSpec::new(cols::IVM_LOW, "IVM Bajo", Float),
            ColumnSpec::new(cols::IVM_MEDIUM, "IVM Medio", Float),
            ColumnSpec::new(cols::IVM_HIGH, "IVM Alto", Float),
            ColumnSpec::new(cols::IVM_VERY_HIGH, "IVM Muy Alto", Float),
            ColumnSpec::new(cols::IVM_INDEX, "IVM Establecimiento", Float)
                .with_fallback("IVM Ponderado"),
        ],
    }
}

/// Selects, renames and coerces the raw text columns of `df`.
///
/// The result holds exactly the schema's canonical columns, in schema order.
pub fn apply_schema(
    df: &DataFrame,
    schema: &DatasetSchema,
    path: &Path,
) -> Result<(DataFrame, CoercionReport)> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut chosen = Vec::with_capacity(schema.columns.len());
    let mut missing = Vec::new();
    for spec in &schema.columns {
        match spec
            .sources
            .iter()
            .find(|source| available.iter().any(|have| have == *source))
        {
            Some(source) => chosen.push((spec, source.as_str())),
            None => missing.extend(spec.sources.first().cloned()),
        }
    }
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns {
            dataset: schema.dataset.to_string(),
            columns: missing,
            path: path.to_path_buf(),
        });
    }

    let mut report = CoercionReport {
        rows: df.height(),
        ..CoercionReport::default()
    };
    let mut columns = Vec::with_capacity(chosen.len());
    for (spec, source) in chosen {
        if spec.sources.first().is_some_and(|primary| primary != source) {
            tracing::debug!(
                dataset = %schema.dataset,
                column = spec.canonical,
                source,
                "using fallback source column"
            );
        }
        let raw = df.column(source)?.str()?;
        let (column, nulled) = coerce(raw, spec, schema.dataset)?;
        if nulled > 0 {
            report.nulled.insert(spec.canonical, nulled);
        }
        columns.push(column);
    }

    if report.total_nulled() > 0 {
        tracing::warn!(
            dataset = %schema.dataset,
            nulled = report.total_nulled(),
            columns = ?report.nulled,
            "unparseable numeric values set to null"
        );
    }

    Ok((DataFrame::new(columns)?, report))
}

fn coerce(raw: &StringChunked, spec: &ColumnSpec, dataset: DatasetKind) -> Result<(Column, usize)> {
    let name: PlSmallStr = spec.canonical.into();
    let mut nulled = 0usize;
    let series = match spec.kind {
        ColumnKind::Text => {
            let values: Vec<Option<String>> = raw
                .into_iter()
                .map(|value| {
                    value
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string)
                })
                .collect();
            Series::new(name, values)
        }
        ColumnKind::Integer => {
            let values: Vec<Option<i64>> = raw
                .into_iter()
                .map(|value| {
                    let value = value.filter(|v| !is_blank(v))?;
                    let parsed = parse_i64(value);
                    if parsed.is_none() {
                        nulled += 1;
                    }
                    parsed
                })
                .collect();
            Series::new(name, values)
        }
        ColumnKind::Identifier => {
            let mut values: Vec<Option<i64>> = Vec::with_capacity(raw.len());
            for (row, value) in raw.into_iter().enumerate() {
                let Some(value) = value.filter(|v| !is_blank(v)) else {
                    values.push(None);
                    continue;
                };
                let parsed = parse_i64(value).ok_or_else(|| IngestError::InvalidIdentifier {
                    dataset: dataset.to_string(),
                    column: spec.canonical.to_string(),
                    row,
                    value: value.to_string(),
                })?;
                values.push(Some(parsed));
            }
            Series::new(name, values)
        }
        ColumnKind::Float => {
            let values: Vec<Option<f64>> = raw
                .into_iter()
                .map(|value| {
                    let value = value.filter(|v| !is_blank(v))?;
                    let parsed = parse_f64(value);
                    if parsed.is_none() {
                        nulled += 1;
                    }
                    parsed
                })
                .collect();
            Series::new(name, values)
        }
    };
    Ok((series.into_column(), nulled))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_frame(columns: &[(&str, &[Option<&str>])]) -> DataFrame {
        let columns = columns
            .iter()
            .map(|(name, values)| Series::new((*name).into(), values.to_vec()).into_column())
            .collect();
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn renames_and_coerces_school_columns() {
        let df = text_frame(&[
            ("RBD", &[Some("101"), Some(" 102 ")]),
            ("NOM_RBD", &[Some(" LICEO A "), Some("")]),
            ("COD_REG_RB", &[Some("13"), Some("x")]),
            ("TIPO_DEPEN", &[Some("3"), Some("1")]),
            ("LATITUD", &[Some("-33,45"), None]),
            ("LONGITUD", &[Some("-70.66"), Some("-70.1")]),
            ("EXTRA", &[Some("a"), Some("b")]),
        ]);
        let (out, report) = apply_schema(&df, &school_schema(), Path::new("s.csv")).unwrap();

        assert_eq!(out.width(), 6);
        let rbd: Vec<Option<i64>> = out.column(cols::RBD).unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(rbd, vec![Some(101), Some(102)]);
        let names: Vec<Option<&str>> = out
            .column(cols::SCHOOL_NAME)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(names, vec![Some("LICEO A"), None]);
        let lat = out.column(cols::SCHOOL_LAT).unwrap().f64().unwrap();
        assert_eq!(lat.get(0), Some(-33.45));
        assert_eq!(lat.get(1), None);
        assert_eq!(report.nulled.get(cols::SCHOOL_REGION_CODE), Some(&1));
        assert_eq!(report.total_nulled(), 1);
    }

    #[test]
    fn malformed_identifier_is_fatal() {
        let df = text_frame(&[
            ("RBD", &[Some("101"), Some("ABC")]),
            ("NOM_RBD", &[Some("A"), Some("B")]),
            ("COD_REG_RB", &[Some("13"), Some("13")]),
            ("TIPO_DEPEN", &[Some("3"), Some("1")]),
            ("LATITUD", &[Some("1"), Some("1")]),
            ("LONGITUD", &[Some("1"), Some("1")]),
        ]);
        let err = apply_schema(&df, &school_schema(), Path::new("s.csv")).unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidIdentifier { row: 1, ref value, .. } if value == "ABC"
        ));
    }

    #[test]
    fn blank_identifier_is_null() {
        let df = text_frame(&[
            ("MRUN", &[Some("7"), Some("8")]),
            ("RBD", &[Some(""), Some("55")]),
            ("CODIGO_REGION_EGRESO", &[Some("16"), Some("13")]),
            ("NOMBRE_REGION_EGRESO", &[Some("REGIÓN DE ÑUBLE"), Some(" ")]),
            ("PTJE_RANKING", &[Some("700"), Some("650")]),
            ("PTJE_NEM", &[Some("690"), Some("640")]),
            ("PROM_CM_ACTUAL", &[Some("610,5"), Some("")]),
        ]);
        let adapter = ColumnAdapter {
            canonical: cols::COMPOSITE_SCORE.to_string(),
            source: "PROM_CM_ACTUAL".to_string(),
            from_year: None,
            until_year: Some(2022),
        };
        let (out, report) = apply_schema(&df, &score_schema(&[&adapter]), Path::new("b.csv")).unwrap();

        let rbd = out.column(cols::RBD).unwrap().i64().unwrap();
        assert_eq!(rbd.get(0), None);
        assert_eq!(rbd.get(1), Some(55));
        let composite = out.column(cols::COMPOSITE_SCORE).unwrap().f64().unwrap();
        assert_eq!(composite.get(0), Some(610.5));
        assert_eq!(composite.get(1), None);
        let region = out.column(cols::ORIGIN_REGION).unwrap().str().unwrap();
        assert_eq!(region.get(1), None);
        assert_eq!(report.total_nulled(), 0);
    }

    #[test]
    fn missing_columns_are_listed() {
        let df = text_frame(&[("ID_RBD", &[Some("1")]), ("N EVALUADO", &[Some("10")])]);
        let err = apply_schema(&df, &vulnerability_schema(), Path::new("e.csv")).unwrap_err();
        match err {
            IngestError::MissingColumns { columns, .. } => assert_eq!(
                columns,
                vec!["IVM Bajo", "IVM Medio", "IVM Alto", "IVM Muy Alto", "IVM Establecimiento"]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn weighted_index_falls_back_to_ponderado() {
        let df = text_frame(&[
            ("ID_RBD", &[Some("1")]),
            ("N EVALUADO", &[Some("10")]),
            ("IVM Bajo", &[Some("1")]),
            ("IVM Medio", &[Some("2")]),
            ("IVM Alto", &[Some("3")]),
            ("IVM Muy Alto", &[Some("4")]),
            ("IVM Ponderado", &[Some("22,5")]),
        ]);
        let (out, _) = apply_schema(&df, &vulnerability_schema(), Path::new("e.csv")).unwrap();
        assert_eq!(out.column(cols::IVM_INDEX).unwrap().f64().unwrap().get(0), Some(22.5));
    }

    #[test]
    fn composite_source_switches_with_adapter() {
        let adapter = ColumnAdapter {
            canonical: cols::COMPOSITE_SCORE.to_string(),
            source: "PROMEDIO_CM_MAX".to_string(),
            from_year: Some(2023),
            until_year: None,
        };
        let schema = score_schema(&[&adapter]);
        let composite = schema
            .columns
            .iter()
            .find(|spec| spec.canonical == cols::COMPOSITE_SCORE)
            .unwrap();
        assert_eq!(composite.sources, vec!["PROMEDIO_CM_MAX"]);
        assert_eq!(composite.kind, ColumnKind::Float);
    }
}
