//! Null-aware numeric parsing.
//!
//! The upstream data uses two different null markers: `n/a` in integer
//! columns and `NULL` (or an empty cell) in float columns. Anything else
//! has to parse cleanly; callers decide whether that is a fatal load error
//! or a per-row failure.

use std::num::{ParseFloatError, ParseIntError};

/// Parse an integer column where `n/a` (any case) means null.
pub fn opt_int(raw: &str) -> Result<Option<i64>, ParseIntError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("n/a") {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

/// Parse a float column where an empty cell or `NULL` (any case) means null.
pub fn opt_float(raw: &str) -> Result<Option<f64>, ParseFloatError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

/// Parse a required integer column.
pub fn req_int(raw: &str) -> Result<i64, ParseIntError> {
    raw.trim().parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opt_int_null_marker() {
        assert_eq!(opt_int("n/a").unwrap(), None);
        assert_eq!(opt_int("N/A").unwrap(), None);
        assert_eq!(opt_int(" 42 ").unwrap(), Some(42));
        assert_eq!(opt_int("-1").unwrap(), Some(-1));
        assert!(opt_int("").is_err());
        assert!(opt_int("forty").is_err());
    }

    #[test]
    fn test_opt_float_null_markers() {
        assert_eq!(opt_float("NULL").unwrap(), None);
        assert_eq!(opt_float("null").unwrap(), None);
        assert_eq!(opt_float("").unwrap(), None);
        assert_eq!(opt_float("  ").unwrap(), None);
        assert_eq!(opt_float("12.5").unwrap(), Some(12.5));
        assert!(opt_float("n/a").is_err());
    }

    #[test]
    fn test_req_int() {
        assert_eq!(req_int(" 7 ").unwrap(), 7);
        assert!(req_int("n/a").is_err());
    }
}
