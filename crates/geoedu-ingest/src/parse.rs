//! Text-to-number parsing for ministry exports.

/// Parses a decimal, accepting a comma as the decimal separator.
///
/// Returns `None` for empty input. Non-finite results are treated as missing.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".").parse::<f64>().ok()
    } else {
        trimmed.parse::<f64>().ok()
    };
    parsed.filter(|v| v.is_finite())
}

/// Parses an integer, accepting integral decimals such as `"13.0"`.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    parse_f64(trimmed)
        .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}

/// True when a trimmed value carries no data.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
