//! Fixed-point value amounts
//!
//! The custodied unit is a single fungible coin. Amounts use rust_decimal so
//! deposits and withdrawals add up exactly; the smallest representable
//! fraction is fixed by `UNIT_SCALE`.

use rust_decimal::Decimal;

use crate::errors::AmountError;

/// Decimal places of the custodied unit (base unit = 10^-18).
pub const UNIT_SCALE: u32 = 18;

/// Largest scale `Decimal` can carry.
pub const MAX_SCALE: u32 = 28;

/// Check that `amount` is strictly positive and expressible in `scale`
/// decimal places. Trailing zeros do not count against the scale.
pub fn validate_amount(amount: Decimal, scale: u32) -> Result<Decimal, AmountError> {
    if amount <= Decimal::ZERO {
        return Err(AmountError::NotPositive {
            amount: amount.to_string(),
        });
    }
    if amount.normalize().scale() > scale {
        return Err(AmountError::ExcessPrecision {
            amount: amount.to_string(),
            scale,
        });
    }
    Ok(amount)
}

/// Parse a human-readable amount such as `"0.5"` into units.
pub fn parse_amount(s: &str) -> Result<Decimal, AmountError> {
    let amount =
        Decimal::from_str_exact(s.trim()).map_err(|e| AmountError::Parse(e.to_string()))?;
    validate_amount(amount, UNIT_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0.5").unwrap(), Decimal::new(5, 1));
        assert_eq!(parse_amount(" 1 ").unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_parse_amount_smallest_unit() {
        let wei = parse_amount("0.000000000000000001").unwrap();
        assert_eq!(wei, Decimal::new(1, 18));
    }

    #[test]
    fn test_parse_amount_rejects_zero() {
        assert!(matches!(
            parse_amount("0"),
            Err(AmountError::NotPositive { .. })
        ));
    }

    #[test]
    fn test_parse_amount_rejects_negative() {
        assert!(matches!(
            parse_amount("-2"),
            Err(AmountError::NotPositive { .. })
        ));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(parse_amount("one"), Err(AmountError::Parse(_))));
    }

    #[test]
    fn test_validate_trailing_zeros_ignored() {
        // 1.500 has scale 3 but normalizes to 1.5
        let amount = Decimal::new(1500, 3);
        assert_eq!(validate_amount(amount, 1).unwrap(), amount);
    }

    #[test]
    fn test_validate_excess_precision() {
        let amount = Decimal::new(1, 19);
        assert_eq!(
            validate_amount(amount, UNIT_SCALE),
            Err(AmountError::ExcessPrecision {
                amount: amount.to_string(),
                scale: UNIT_SCALE,
            })
        );
    }

    mod fuzz {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any positive amount within the unit scale validates unchanged.
            #[test]
            fn fuzz_positive_amounts_validate(mantissa in 1i64..i64::MAX, scale in 0u32..=UNIT_SCALE) {
                let amount = Decimal::new(mantissa, scale);
                prop_assert_eq!(validate_amount(amount, UNIT_SCALE), Ok(amount));
            }

            /// Parsing the display form of a valid amount gives it back.
            #[test]
            fn fuzz_parse_display(mantissa in 1i64..1_000_000_000_000i64, scale in 0u32..=UNIT_SCALE) {
                let amount = Decimal::new(mantissa, scale);
                prop_assert_eq!(parse_amount(&amount.to_string()), Ok(amount));
            }
        }
    }
}
