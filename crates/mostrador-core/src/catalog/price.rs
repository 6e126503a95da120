//! Price coercion for heterogeneous CSV cells.

/// Converts a price cell into a number.
///
/// Currency symbols, whitespace and thousands separators are dropped before
/// parsing. Anything that still fails to parse becomes `0.0` so that one bad
/// cell never aborts a catalog load.
pub fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_and_thousands_separator() {
        assert_eq!(parse_price("$1,234.50"), 1234.5);
    }

    #[test]
    fn test_plain_decimal() {
        assert_eq!(parse_price("1234.5"), 1234.5);
        assert_eq!(parse_price("  42 "), 42.0);
    }

    #[test]
    fn test_other_currency_symbols() {
        assert_eq!(parse_price("£12.00"), 12.0);
        assert_eq!(parse_price("USD 30"), 30.0);
    }

    #[test]
    fn test_unparseable_defaults_to_zero() {
        assert_eq!(parse_price("consultar"), 0.0);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("1.2.3"), 0.0);
    }
}
