//! Decimal-comma money text (`1.234,56`) to and from numbers.

use regex::Regex;
use std::sync::LazyLock;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9,.]").expect("static regex"));

/// Parses localized text where `.` groups thousands and `,` marks decimals.
/// Anything unparsable yields 0.
pub fn parse(text: &str) -> f64 {
    let normalized = text.trim().replace('.', "").replacen(',', ".", 1);
    if normalized.is_empty() {
        return 0.0;
    }
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Renders `R$ 1234,56`. Negative and NaN values render as zero.
pub fn format(value: f64) -> String {
    let value = if value.is_nan() || value < 0.0 { 0.0 } else { value };
    format!("R$ {}", format_plain(value))
}

/// Same as [`format`] without the currency symbol.
pub fn format_plain(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}

/// Cleans live input: keeps digits and separators, and keeps at most one
/// separator (the rest of the digits become the fractional part).
pub fn sanitize(input: &str) -> String {
    let value = DISALLOWED.replace_all(input, "").into_owned();
    let parts: Vec<&str> = value.split([',', '.']).collect();
    if parts.len() > 2 {
        format!("{},{}", parts[0], parts[1..].concat())
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_localized() {
        assert_eq!(parse("1.234,56"), 1234.56);
        assert_eq!(parse("0,20"), 0.2);
        assert_eq!(parse("3,50"), 3.5);
        assert_eq!(parse("12"), 12.0);
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert_eq!(parse(""), 0.0);
        assert_eq!(parse("abc"), 0.0);
        assert_eq!(parse("1,2,3"), 0.0);
        assert_eq!(parse("inf"), 0.0);
        assert_eq!(parse("NaN"), 0.0);
    }

    #[test]
    fn test_parse_keeps_negative() {
        assert_eq!(parse("-5,5"), -5.5);
    }

    #[test]
    fn test_format() {
        assert_eq!(format(12.9844), "R$ 12,98");
        assert_eq!(format(0.0), "R$ 0,00");
        assert_eq!(format(1234.5), "R$ 1234,50");
        assert_eq!(format(-3.0), "R$ 0,00");
        assert_eq!(format(f64::NAN), "R$ 0,00");
    }

    #[test]
    fn test_format_then_parse_keeps_value() {
        for text in ["0,20", "3,50", "1.234,56", "99,99", "7"] {
            let value = parse(text);
            let shown = format(value);
            let back = parse(shown.trim_start_matches("R$ "));
            assert!((back - value).abs() < 1e-9, "{text} -> {shown}");
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("R$ 12,50"), "12,50");
        assert_eq!(sanitize("1a2b"), "12");
        assert_eq!(sanitize("1.234,56"), "1,23456");
        assert_eq!(sanitize("3.5"), "3.5");
        assert_eq!(sanitize("1,2,3"), "1,23");
    }
}
