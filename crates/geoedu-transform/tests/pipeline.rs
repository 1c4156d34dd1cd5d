//! Full transform chain over small in-memory sources.

use polars::prelude::*;

use geoedu_model::columns as cols;
use geoedu_model::{ResolutionReport, StageName};
use geoedu_standards::load_default_reference_tables;
use geoedu_transform::{
    CampusIndex, MobilityInputs, SourceNormalizer, run_mobility_pipeline,
    resolve_campus_coordinates,
};

fn enrollment() -> DataFrame {
    df! {
        cols::MRUN => [1i64, 2, 3, 4, 5],
        cols::DESTINATION_REGION => [
            "REGION METROPOLITANA DE SANTIAGO",
            "REGIÓN DE ÑUBLE",
            "REGION DE ÑUBLE",
            "REGION METROPOLITANA DE SANTIAGO",
            "REGION DEL MAULE",
        ],
        cols::DESTINATION_COMMUNE => ["SANTIAGO", "CHILLAN", "CHILLAN", "PROVIDENCIA", "TALCA"],
        cols::INSTITUTION_NAME => ["U CHILE", "U BIOBIO", "U BIOBIO", "U CHILE", "U TALCA"],
        cols::INSTITUTION_CODE => [71i64, 80, 80, 71, 90],
        cols::INSTITUTION_TYPE_3 => [
            "Universidades Estatales CRUCH",
            "Universidades Estatales CRUCH",
            "Universidades Estatales CRUCH",
            "Universidades Estatales CRUCH",
            "Universidades Privadas",
        ],
    }
    .unwrap()
}

fn scores() -> DataFrame {
    df! {
        cols::MRUN => [1i64, 2, 3, 4, 6],
        cols::RBD => [Some(101i64), Some(102), Some(101), Some(101), Some(103)],
        cols::ORIGIN_REGION_CODE => [16i64, 6, 16, 16, 7],
        cols::ORIGIN_REGION => [
            Some("REGIÓN DE ÑUBLE"),
            Some("REGION METROPOLITANA DE SANTIAGO"),
            Some("REGION DE ÑUBLE"),
            None,
            Some("REGION DEL LIBERTADOR GENERAL BERNARDO O'HIGGINS"),
        ],
    }
    .unwrap()
}

fn schools() -> DataFrame {
    df! {
        cols::RBD => [101i64, 102],
        cols::SCHOOL_NAME => ["LICEO NARCISO TONDREAU", "COLEGIO SAN IGNACIO"],
        cols::SCHOOL_REGION_CODE => [16i64, 6],
        cols::DEPENDENCY_CODE => [1i64, 3],
        cols::SCHOOL_LAT => [-36.6066, -33.45],
        cols::SCHOOL_LON => [-72.1034, -70.66],
    }
    .unwrap()
}

fn campuses() -> DataFrame {
    df! {
        cols::CAMPUS_INSTITUTION => ["U CHILE", "U BIOBIO", "U BIOBIO"],
        cols::CAMPUS_REGION => [
            "REGIÓN METROPOLITANA DE SANTIAGO",
            "REGIÓN DE ÑUBLE",
            "REGION DE ÑUBLE",
        ],
        cols::CAMPUS_COMMUNE => ["INDEPENDENCIA", "CHILLAN", "CHILLAN"],
        cols::CAMPUS_LAT => [-33.47, -36.5960, -40.0],
        cols::CAMPUS_LON => [-70.65, -72.0880, -73.0],
        cols::CAMPUS_INSTITUTION_TYPE => ["UNIVERSIDADES", "UNIVERSIDADES", "UNIVERSIDADES"],
    }
    .unwrap()
}

fn vulnerability() -> DataFrame {
    df! {
        cols::RBD => [101i64, 101],
        cols::EVALUATED => [40.0, 60.0],
        cols::IVM_LOW => [10.0, 20.0],
        cols::IVM_MEDIUM => [10.0, 20.0],
        cols::IVM_HIGH => [10.0, 10.0],
        cols::IVM_VERY_HIGH => [10.0, 10.0],
        cols::IVM_INDEX => [25.0, 22.0],
    }
    .unwrap()
}

fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

#[test]
fn pipeline_links_and_aggregates_records() {
    let tables = load_default_reference_tables().unwrap();
    let (enrollment, scores, schools, campuses, vulnerability) =
        (enrollment(), scores(), schools(), campuses(), vulnerability());
    let inputs = MobilityInputs {
        enrollment: &enrollment,
        scores: &scores,
        schools: &schools,
        campuses: &campuses,
        vulnerability: &vulnerability,
        vulnerability_year: 2021,
    };

    let out = run_mobility_pipeline(inputs, &tables).unwrap();

    let counts: Vec<usize> = out.stages.iter().map(|s| s.record_count()).collect();
    assert_eq!(counts, vec![3, 3, 3, 3]);
    assert_eq!(out.joins[0].dropped, 2);
    assert_eq!(out.joins[2].unmatched, 1);
    assert_eq!(out.joins[3].unmatched, 1);

    assert_eq!(
        out.resolution,
        ResolutionReport {
            attempted: 1,
            filled: 1,
            still_missing: 0,
            by_tier: [0, 1, 0, 0],
        }
    );
    assert_eq!(out.distances.computed, 3);
    assert_eq!(out.vulnerability.imputed, 1);
    assert_eq!(out.vulnerability.high, 2);

    let abcde = &out.stage(StageName::Abcde).unwrap().data;
    assert_eq!(
        strings(abcde, cols::ORIGIN_REGION),
        vec![
            Some("Ñuble".to_string()),
            Some("Metropolitana".to_string()),
            Some("Ñuble".to_string()),
        ]
    );
    let flags: Vec<Option<bool>> = abcde
        .column(cols::HIGH_VULNERABILITY)
        .unwrap()
        .bool()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(flags, vec![Some(true), Some(false), Some(true)]);

    let imputed = abcde.column(cols::SCHOOL_IVM).unwrap().f64().unwrap().get(1).unwrap();
    assert!((imputed - 19.03805).abs() < 1e-9);

    let abcd = &out.stage(StageName::Abcd).unwrap().data;
    let lat = abcd.column(cols::CAMPUS_LAT).unwrap().f64().unwrap();
    assert_eq!(lat.get(0), Some(-33.47));
    assert_eq!(lat.get(1), Some(-36.5960));

    assert_eq!(out.matrix.row_total("Ñuble"), 2);
    assert_eq!(out.matrix.get("Ñuble", "Metropolitana"), 1);
    assert_eq!(out.matrix.row_total("Metropolitana"), 1);

    let nuble = out.rates.iter().find(|r| r.region == "Ñuble").unwrap();
    assert_eq!(nuble.migration_rate, 50.0);
    assert_eq!(nuble.reception_rate, 50.0);
    let maule = out.rates.iter().find(|r| r.region == "Maule").unwrap();
    assert_eq!(maule.migration_rate, 0.0);
    assert_eq!(maule.avg_migration_distance_km, 0.0);

    let share = out
        .high_vulnerability
        .iter()
        .find(|s| s.region == "Ñuble")
        .unwrap();
    assert_eq!(share.high_vulnerability_pct, Some(100.0));

    let types = &out.university_types;
    let maule_row = types.regions.iter().position(|r| r == "Maule").unwrap();
    let estatal = types
        .types
        .iter()
        .position(|t| t == "Universidades Estatales CRUCH")
        .unwrap();
    let privada = types
        .types
        .iter()
        .position(|t| t == "Universidades Privadas")
        .unwrap();
    assert_eq!(types.percentages[maule_row][privada], 100.0);
    let metro_row = types.regions.iter().position(|r| r == "Metropolitana").unwrap();
    assert_eq!(types.percentages[metro_row][estatal], 100.0);
}

#[test]
fn year_without_cutoff_leaves_flags_null() {
    let tables = load_default_reference_tables().unwrap();
    let (enrollment, scores, schools, campuses, vulnerability) =
        (enrollment(), scores(), schools(), campuses(), vulnerability());
    let inputs = MobilityInputs {
        enrollment: &enrollment,
        scores: &scores,
        schools: &schools,
        campuses: &campuses,
        vulnerability: &vulnerability,
        vulnerability_year: 2019,
    };

    let out = run_mobility_pipeline(inputs, &tables).unwrap();

    assert_eq!(out.vulnerability.cutoff, None);
    assert_eq!(out.vulnerability.imputed, 0);
    let abcde = &out.stage(StageName::Abcde).unwrap().data;
    assert_eq!(abcde.column(cols::HIGH_VULNERABILITY).unwrap().null_count(), 3);
}

#[test]
fn coordinate_resolution_is_idempotent() {
    let tables = load_default_reference_tables().unwrap();
    let normalizer = SourceNormalizer::new(&tables);
    let campuses = normalizer.normalize_campuses(&campuses()).unwrap();
    let index = CampusIndex::build(&campuses).unwrap();

    let rows = df! {
        cols::INSTITUTION_NAME => ["U CHILE", "U BIOBIO", "U OTRA"],
        cols::DESTINATION_REGION => ["Metropolitana", "Ñuble", "Magallanes"],
        cols::DESTINATION_COMMUNE => ["SANTIAGO", "CHILLAN", "PUNTA ARENAS"],
        cols::CAMPUS_LAT => [None, Some(-10.0), None],
        cols::CAMPUS_LON => [None, Some(-20.0), None],
    }
    .unwrap();

    let (first, report) = resolve_campus_coordinates(&rows, &index).unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.filled, 1);
    assert_eq!(report.still_missing, 1);
    let lat = first.column(cols::CAMPUS_LAT).unwrap().f64().unwrap();
    assert_eq!(lat.get(1), Some(-10.0));

    let (second, again) = resolve_campus_coordinates(&first, &index).unwrap();
    assert!(first.equals_missing(&second));
    assert_eq!(again.filled, 0);
    assert_eq!(again.attempted, 1);
}

#[test]
fn campus_reference_is_deduplicated_after_normalization() {
    let tables = load_default_reference_tables().unwrap();
    let normalizer = SourceNormalizer::new(&tables);
    let campuses = normalizer.normalize_campuses(&campuses()).unwrap();

    assert_eq!(campuses.height(), 2);
    assert_eq!(
        strings(&campuses, cols::CAMPUS_INSTITUTION_TYPE),
        vec![Some("Universidades".to_string()), Some("Universidades".to_string())]
    );
    let lat = campuses.column(cols::CAMPUS_LAT).unwrap().f64().unwrap();
    assert_eq!(lat.get(1), Some(-36.5960));
}

#[test]
fn both_nuble_spellings_normalize_to_canonical_label() {
    let tables = load_default_reference_tables().unwrap();
    let normalizer = SourceNormalizer::new(&tables);
    assert_eq!(normalizer.normalize_region("REGIÓN DE ÑUBLE"), "Ñuble");
    assert_eq!(normalizer.normalize_region("REGION DE ÑUBLE"), "Ñuble");
    assert_eq!(normalizer.normalize_region("Región de Ñuble"), "Ñuble");
    assert_eq!(normalizer.normalize_region("Atlántida"), "Atlántida");
    assert_eq!(normalizer.region_for_code(15), Some("Arica y Parinacota"));
    assert_eq!(normalizer.dependency_name(3), Some("Particular Pagado"));
    assert_eq!(normalizer.region_for_code(99), None);
}
