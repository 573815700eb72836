//! ERG ↔ nanoERG conversion.
//!
//! # Responsibilities
//! - Convert a human amount (ERG) to an integer count of nanoERG
//! - Render nanoERG as a fixed 9-decimal string for JSON, logs and UI
//!
//! # Design Decisions
//! - Conversion goes through the decimal text of the amount, so the integer
//!   result never passes through a float multiplication
//! - Fractional digits beyond the ninth are truncated (floor), never rounded
//! - Results are `u128` so large amounts cannot silently wrap

use thiserror::Error;

/// Fractional digits carried by one ERG.
pub const DECIMALS: usize = 9;

/// nanoERG per ERG.
pub const NANO_PER_ERG: u128 = 1_000_000_000;

/// Errors produced while converting amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The amount is not something that can be expressed in nanoERG.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Convert an ERG amount to nanoERG, truncating below the smallest unit.
///
/// `1.5` becomes `1_500_000_000`; `0.0000000004` becomes `0`.
pub fn to_smallest_units(amount: f64) -> Result<u128, UnitError> {
    if !amount.is_finite() {
        return Err(UnitError::InvalidAmount(format!(
            "{amount} is not a finite number"
        )));
    }
    if amount < 0.0 {
        return Err(UnitError::InvalidAmount(format!("{amount} is negative")));
    }

    // `Display` for f64 yields the shortest round-trip decimal and never uses
    // exponent notation. `abs` folds -0.0 into "0".
    parse_smallest_units(&amount.abs().to_string())
}

/// Convert a plain decimal string (`"12"`, `"0.5"`, `".25"`) to nanoERG.
///
/// Signs, exponents and separators are rejected.
pub fn parse_smallest_units(text: &str) -> Result<u128, UnitError> {
    let text = text.trim();
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(UnitError::InvalidAmount(format!("'{text}' is not a number")));
    }
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(whole) || !digits_only(fraction) {
        return Err(UnitError::InvalidAmount(format!(
            "'{text}' is not a plain decimal number"
        )));
    }

    let overflow = || UnitError::InvalidAmount(format!("{text} is too large"));

    let whole_units: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };

    let mut fraction_digits: String = fraction.chars().take(DECIMALS).collect();
    while fraction_digits.len() < DECIMALS {
        fraction_digits.push('0');
    }
    let fraction_units: u128 = fraction_digits.parse().map_err(|_| overflow())?;

    whole_units
        .checked_mul(NANO_PER_ERG)
        .and_then(|v| v.checked_add(fraction_units))
        .ok_or_else(overflow)
}

/// Render nanoERG as ERG with exactly nine fractional digits.
pub fn to_human_units(value: u128) -> String {
    format!(
        "{}.{:0width$}",
        value / NANO_PER_ERG,
        value % NANO_PER_ERG,
        width = DECIMALS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_smallest_units_floor() {
        assert_eq!(to_smallest_units(1.5).unwrap(), 1_500_000_000);
        assert_eq!(to_smallest_units(0.000000001).unwrap(), 1);
        assert_eq!(to_smallest_units(0.0000000004).unwrap(), 0);
        assert_eq!(to_smallest_units(0.0000000005).unwrap(), 0);
        assert_eq!(to_smallest_units(3.0).unwrap(), 3_000_000_000);
    }

    #[test]
    fn test_to_smallest_units_decimal_fractions() {
        // 0.3 and 4.35 have no exact binary representation
        assert_eq!(to_smallest_units(0.3).unwrap(), 300_000_000);
        assert_eq!(to_smallest_units(4.35).unwrap(), 4_350_000_000);
        assert_eq!(to_smallest_units(7.9989).unwrap(), 7_998_900_000);
    }

    #[test]
    fn test_to_smallest_units_large_amounts() {
        assert_eq!(
            to_smallest_units(1e20).unwrap(),
            100_000_000_000_000_000_000 * NANO_PER_ERG
        );
        assert!(to_smallest_units(1e300).is_err());
    }

    #[test]
    fn test_to_smallest_units_rejects_non_finite() {
        assert!(matches!(
            to_smallest_units(f64::NAN),
            Err(UnitError::InvalidAmount(_))
        ));
        assert!(to_smallest_units(f64::INFINITY).is_err());
        assert!(to_smallest_units(f64::NEG_INFINITY).is_err());
        assert!(to_smallest_units(-1.0).is_err());
    }

    #[test]
    fn test_zero_converts() {
        assert_eq!(to_smallest_units(0.0).unwrap(), 0);
        assert_eq!(to_smallest_units(-0.0).unwrap(), 0);
    }

    #[test]
    fn test_parse_smallest_units() {
        assert_eq!(parse_smallest_units("12").unwrap(), 12_000_000_000);
        assert_eq!(parse_smallest_units(".25").unwrap(), 250_000_000);
        assert_eq!(parse_smallest_units("5.").unwrap(), 5_000_000_000);
        assert_eq!(parse_smallest_units("0.1234567899").unwrap(), 123_456_789);
        assert!(parse_smallest_units("").is_err());
        assert!(parse_smallest_units(".").is_err());
        assert!(parse_smallest_units("-1").is_err());
        assert!(parse_smallest_units("1e3").is_err());
        assert!(parse_smallest_units("1,5").is_err());
    }

    #[test]
    fn test_to_human_units() {
        assert_eq!(to_human_units(1_500_000_000), "1.500000000");
        assert_eq!(to_human_units(0), "0.000000000");
        assert_eq!(to_human_units(1), "0.000000001");
        assert_eq!(to_human_units(7_998_900_000), "7.998900000");
        assert_eq!(
            to_human_units(u128::from(u64::MAX)),
            "18446744073.709551615"
        );
    }

    #[test]
    fn test_human_units_round_trip() {
        for value in [0u128, 1, 999_999_999, 1_000_000_000, 123_456_789_012] {
            assert_eq!(parse_smallest_units(&to_human_units(value)).unwrap(), value);
        }
    }
}
