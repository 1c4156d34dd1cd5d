//! Canonical column names shared by every pipeline stage.
//!
//! Source datasets arrive with ministry-specific headers (`MRUN`, `ID_RBD`,
//! `REGIÓN`, ...). Ingestion renames them to these names so joins and
//! aggregates never depend on the raw spelling.

// Enrollment
pub const MRUN: &str = "mrun";
pub const DESTINATION_REGION: &str = "destination_region";
pub const DESTINATION_PROVINCE: &str = "destination_province";
pub const DESTINATION_COMMUNE: &str = "destination_commune";
pub const INSTITUTION_CODE: &str = "institution_code";
pub const INSTITUTION_NAME: &str = "institution_name";
pub const PROGRAM_NAME: &str = "program_name";
pub const INSTITUTION_TYPE_1: &str = "institution_type_1";
pub const INSTITUTION_TYPE_2: &str = "institution_type_2";
pub const INSTITUTION_TYPE_3: &str = "institution_type_3";
pub const GLOBAL_LEVEL: &str = "global_level";
pub const PROGRAM_LEVEL: &str = "program_level";
pub const CURRENT_ENTRY_YEAR: &str = "current_entry_year";
pub const ORIGINAL_ENTRY_YEAR: &str = "original_entry_year";
pub const ADMISSION_FORM: &str = "admission_form";
pub const AGE_RANGE: &str = "age_range";

// Admission scores
pub const RBD: &str = "rbd";
pub const ORIGIN_REGION_CODE: &str = "origin_region_code";
pub const ORIGIN_REGION: &str = "origin_region";
pub const RANKING_SCORE: &str = "ranking_score";
pub const NEM_SCORE: &str = "nem_score";
pub const COMPOSITE_SCORE: &str = "composite_score";

// Schools
pub const SCHOOL_NAME: &str = "school_name";
pub const SCHOOL_REGION_CODE: &str = "school_region_code";
pub const DEPENDENCY_CODE: &str = "dependency_code";
pub const SCHOOL_LAT: &str = "school_lat";
pub const SCHOOL_LON: &str = "school_lon";

// Campuses
pub const CAMPUS_INSTITUTION: &str = "campus_institution";
pub const CAMPUS_REGION: &str = "campus_region";
pub const CAMPUS_COMMUNE: &str = "campus_commune";
pub const CAMPUS_LAT: &str = "campus_lat";
pub const CAMPUS_LON: &str = "campus_lon";
pub const CAMPUS_INSTITUTION_TYPE: &str = "campus_institution_type";

// Vulnerability
pub const EVALUATED: &str = "evaluated";
pub const IVM_LOW: &str = "ivm_low";
pub const IVM_MEDIUM: &str = "ivm_medium";
pub const IVM_HIGH: &str = "ivm_high";
pub const IVM_VERY_HIGH: &str = "ivm_very_high";
pub const IVM_INDEX: &str = "ivm_index";
pub const SCHOOL_IVM: &str = "school_ivm";
pub const IVM_CUTOFF: &str = "ivm_cutoff";

// Derived
pub const DISTANCE_KM: &str = "distance_km";
pub const HIGH_VULNERABILITY: &str = "high_vulnerability";

// Aggregate views
pub const REGION: &str = "region";
pub const MIGRATION_RATE: &str = "migration_rate_pct";
pub const RECEPTION_RATE: &str = "reception_rate_pct";
pub const AVG_MIGRATION_DISTANCE: &str = "avg_migration_distance_km";
pub const AVG_RECEPTION_DISTANCE: &str = "avg_reception_distance_km";
pub const HIGH_VULNERABILITY_SHARE: &str = "high_vulnerability_pct";
pub const SCHOOL_COUNT: &str = "school_count";
