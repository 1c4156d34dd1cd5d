//! Header normalization.

const BOM: char = '\u{feff}';

/// Trims whitespace and a leading byte-order mark from a header cell.
pub fn normalize_header(value: &str) -> String {
    value.trim_start_matches(BOM).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bom_and_whitespace() {
        assert_eq!(normalize_header("\u{feff}MRUN "), "MRUN");
        assert_eq!(normalize_header("  IVM Alto"), "IVM Alto");
        assert_eq!(normalize_header("REGIÓN"), "REGIÓN");
    }
}
