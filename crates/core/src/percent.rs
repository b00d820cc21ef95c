//! Percent-change field parsing.

use thiserror::Error;

/// Errors from parsing a scraped percent cell.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PercentError {
    #[error("percent field is empty")]
    Empty,

    #[error("invalid percent value: {0:?}")]
    Invalid(String),
}

/// Parse a scraped percent cell such as ` +7.2% ` into a number.
///
/// Leading/trailing whitespace is stripped first, then `%` characters are
/// trimmed from both ends. The remainder must parse as an `f64`; interior
/// whitespace survives the trims and fails the parse.
pub fn parse_percent(raw: &str) -> Result<f64, PercentError> {
    let trimmed = raw.trim().trim_matches('%');
    if trimmed.is_empty() {
        return Err(PercentError::Empty);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| PercentError::Invalid(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_percent("7.2"), Ok(7.2));
    }

    #[test]
    fn test_parse_trailing_percent() {
        assert_eq!(parse_percent("5.2%"), Ok(5.2));
    }

    #[test]
    fn test_parse_surrounding_whitespace() {
        assert_eq!(parse_percent("  -3.5%  "), Ok(-3.5));
    }

    #[test]
    fn test_parse_leading_sign() {
        assert_eq!(parse_percent("+0.8%"), Ok(0.8));
    }

    #[test]
    fn test_parse_percent_on_both_ends() {
        assert_eq!(parse_percent("%5.2%"), Ok(5.2));
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert_eq!(parse_percent(""), Err(PercentError::Empty));
        assert_eq!(parse_percent("  %  "), Err(PercentError::Empty));
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(matches!(parse_percent("n/a"), Err(PercentError::Invalid(_))));
    }

    #[test]
    fn test_interior_whitespace_fails() {
        // "5.2 %" trims to "5.2 " which is not a valid number.
        assert!(matches!(parse_percent("5.2 %"), Err(PercentError::Invalid(_))));
    }
}
