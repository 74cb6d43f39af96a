//! Tender reference number generation.
//!
//! Format: `PREFIX-YYYYMMDD-<6 uppercase hex>`, e.g. `BTD-20250601-9F2C4A`.
//! Generated exactly once at tender creation; the unique constraint on
//! tenders.reference_number backs global uniqueness.

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

/// Default reference prefix, from the original deployment's numbering.
pub const DEFAULT_PREFIX: &str = "BTD";

/// Generate a reference number for a new tender.
pub fn generate(prefix: &str, now: DateTime<FixedOffset>) -> String {
    let date = now.format("%Y%m%d");
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("{prefix}-{date}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn fixed_now() -> DateTime<FixedOffset> {
        "2025-06-01T09:30:00+00:00".parse().unwrap()
    }

    #[test]
    fn test_reference_number_format() {
        let reference = generate(DEFAULT_PREFIX, fixed_now());
        let pattern = Regex::new(r"^[A-Z]+-\d{8}-[0-9A-F]{6}$").unwrap();
        assert!(pattern.is_match(&reference), "bad format: {reference}");
        assert!(reference.starts_with("BTD-20250601-"));
    }

    #[test]
    fn test_reference_numbers_are_distinct() {
        let a = generate(DEFAULT_PREFIX, fixed_now());
        let b = generate(DEFAULT_PREFIX, fixed_now());
        assert_ne!(a, b);
    }

    #[test]
    fn test_custom_prefix() {
        let reference = generate("ACME", fixed_now());
        assert!(reference.starts_with("ACME-20250601-"));
    }
}
