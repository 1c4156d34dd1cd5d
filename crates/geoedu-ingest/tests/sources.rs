//! Loading a full dataset-year from disk.

use std::fs;
use std::path::Path;

use geoedu_ingest::{IngestError, check_year_sources, filter_cohort, load_year_sources};
use geoedu_model::columns as cols;
use geoedu_model::{CohortKind, DatasetKind};
use geoedu_standards::{load_default_input_layout, load_default_reference_tables};

const ENROLLMENT: &str = "\
mrun;region_sede;provincia_sede;comuna_sede;cod_inst;nomb_inst;nomb_carrera;tipo_inst_1;tipo_inst_2;tipo_inst_3;nivel_global;nivel_carrera_1;anio_ing_carr_act;anio_ing_carr_ori;forma_ingreso;rango_edad
1;REGION METROPOLITANA DE SANTIAGO;Santiago;SANTIAGO;71;UNIVERSIDAD DE CHILE;DERECHO;Universidades;Universidades CRUCH;Universidades Estatales CRUCH;Pregrado;Carreras Profesionales;2023;2023;1- Ingreso Directo (regular);15 a 19 años
2;REGION DE ÑUBLE;Diguillín;CHILLAN;80;UNIVERSIDAD DEL BIO-BIO;ENFERMERIA;Universidades;Universidades CRUCH;Universidades Estatales CRUCH;Pregrado;Carreras Profesionales;2023;2023;1- Ingreso Directo (regular);20 a 24 años
3;REGION DE ÑUBLE;Diguillín;CHILLAN;80;UNIVERSIDAD DEL BIO-BIO;ENFERMERIA;Universidades;Universidades CRUCH;Universidades Estatales CRUCH;Pregrado;Carreras Profesionales;2022;2022;1- Ingreso Directo (regular);15 a 19 años
";

const SCORES: &str = "\
MRUN;RBD;CODIGO_REGION_EGRESO;NOMBRE_REGION_EGRESO;PTJE_RANKING;PTJE_NEM;PROMEDIO_CM_MAX
1;101;16;REGIÓN DE ÑUBLE;780;760;812,5
2;102;13;REGIÓN METROPOLITANA DE SANTIAGO;650;640;600
";

const SCHOOLS: &str = "\
RBD,NOM_RBD,COD_REG_RB,TIPO_DEPEN,LATITUD,LONGITUD
101,LICEO NARCISO TONDREAU,16,1,-36.6066,-72.1034
102,COLEGIO SAN IGNACIO,13,3,-33.45,-70.66
";

const CAMPUSES: &str = "\
NOMBRE_INS,REGIÓN,COMUNA,LATITUD,LONGITUD,TIPO_INST
UNIVERSIDAD DE CHILE,REGIÓN METROPOLITANA DE SANTIAGO,SANTIAGO,-33.47,-70.65,UNIVERSIDADES
";

const VULNERABILITY: &str = "\
ID_RBD,N EVALUADO,IVM Bajo,IVM Medio,IVM Alto,IVM Muy Alto,IVM Ponderado
101,40,10,10,10,10,\"22,1\"
101,60,20,20,10,10,18.0
";

fn write_year(base: &Path, year: i32) {
    let dir = base.join(year.to_string());
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("20230802_Matrícula_Ed_Superior_{year}_PUBL_MRUN.csv")),
        ENROLLMENT,
    )
    .unwrap();
    fs::write(
        dir.join(format!("A_INSCRITOS_PUNTAJES_{year}_PAES_PUB_MRUN.csv")),
        SCORES,
    )
    .unwrap();
    fs::write(dir.join("establecimientos.csv"), SCHOOLS).unwrap();
    fs::write(dir.join("inmuebles_ies.csv"), CAMPUSES).unwrap();
    fs::write(dir.join(format!("IVM_Establecimientos_{year}.csv")), VULNERABILITY).unwrap();
}

#[test]
fn loads_all_sources_with_canonical_columns() {
    let dir = tempfile::tempdir().unwrap();
    write_year(dir.path(), 2023);
    let layout = load_default_input_layout().unwrap();
    let tables = load_default_reference_tables().unwrap();

    let sources = load_year_sources(dir.path(), 2023, &layout, &tables).unwrap();

    assert_eq!(sources.score_year, 2023);
    assert_eq!(sources.vulnerability_year, 2023);
    assert_eq!(sources.enrollment.height(), 3);
    assert_eq!(sources.scores.height(), 2);
    assert_eq!(sources.vulnerability.height(), 2);
    assert_eq!(sources.reports.len(), DatasetKind::ALL.len());

    let composite = sources.scores.column(cols::COMPOSITE_SCORE).unwrap().f64().unwrap();
    assert_eq!(composite.get(0), Some(812.5));
    let index = sources.vulnerability.column(cols::IVM_INDEX).unwrap().f64().unwrap();
    assert_eq!(index.get(0), Some(22.1));
    let campus_region = sources.campuses.column(cols::CAMPUS_REGION).unwrap().str().unwrap();
    assert_eq!(campus_region.get(0), Some("REGIÓN METROPOLITANA DE SANTIAGO"));
}

#[test]
fn cohort_filter_applies_to_loaded_enrollment() {
    let dir = tempfile::tempdir().unwrap();
    write_year(dir.path(), 2023);
    let layout = load_default_input_layout().unwrap();
    let tables = load_default_reference_tables().unwrap();
    let sources = load_year_sources(dir.path(), 2023, &layout, &tables).unwrap();

    let a0 = filter_cohort(&sources.enrollment, CohortKind::A0, 2023, &tables.cohorts).unwrap();
    let a1 = filter_cohort(&sources.enrollment, CohortKind::A1, 2023, &tables.cohorts).unwrap();
    assert_eq!(a0.height(), 2);
    assert_eq!(a1.height(), 1);
}

#[test]
fn missing_input_file_fails_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    write_year(dir.path(), 2023);
    fs::remove_file(dir.path().join("2023").join("inmuebles_ies.csv")).unwrap();
    let layout = load_default_input_layout().unwrap();

    let err = check_year_sources(dir.path(), 2023, &layout).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { ref path } if path.ends_with("inmuebles_ies.csv")));
}

#[test]
fn score_file_without_adapter_column_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_year(dir.path(), 2023);
    let score_path = dir
        .path()
        .join("2023")
        .join("A_INSCRITOS_PUNTAJES_2023_PAES_PUB_MRUN.csv");
    fs::write(&score_path, SCORES.replace("PROMEDIO_CM_MAX", "PROM_CM_ACTUAL")).unwrap();
    let layout = load_default_input_layout().unwrap();
    let tables = load_default_reference_tables().unwrap();

    let err = load_year_sources(dir.path(), 2023, &layout, &tables).unwrap_err();
    match err {
        IngestError::MissingColumns { dataset, columns, .. } => {
            assert_eq!(dataset, "scores");
            assert_eq!(columns, vec!["PROMEDIO_CM_MAX"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}
