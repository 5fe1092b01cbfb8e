//! Currency codes and the conversion rounding rule.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ValidationError, ValidationResult};

/// Fraction digits kept on a converted amount.
pub const CONVERTED_AMOUNT_SCALE: u32 = 2;

/// Multiply `amount` by `rate` and round to two fraction digits.
///
/// Midpoints round to the nearest even digit (banker's rounding), so
/// `10.005` becomes `10.00` and `10.015` becomes `10.02`. A product too large
/// for `Decimal` is rejected.
pub fn convert_amount(amount: Decimal, rate: Decimal) -> ValidationResult<Decimal> {
    let product = amount
        .checked_mul(rate)
        .ok_or_else(|| ValidationError::AmountOutOfRange {
            amount: amount.to_string(),
            rate: rate.to_string(),
        })?;
    Ok(product.round_dp_with_strategy(CONVERTED_AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven))
}

/// ISO 4217 currency code, always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse and normalize a caller-supplied code.
    ///
    /// `field` names the argument in the error message (`"base"`, `"from"`, ...).
    pub fn parse(raw: &str, field: &'static str) -> ValidationResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingCurrency { field });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency {
                field,
                code: raw.to_string(),
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Common currencies
    pub fn eur() -> Self {
        Self("EUR".to_string())
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn gbp() -> Self {
        Self("GBP".to_string())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Amount to convert, guaranteed strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositiveAmount(Decimal);

impl PositiveAmount {
    /// Reject zero and negative amounts.
    pub fn new(value: Decimal) -> ValidationResult<Self> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Canonical text form: trailing zeros removed, so `10.00` and `10` agree.
    pub fn normalized(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl fmt::Display for PositiveAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_code_normalization() {
        let code = CurrencyCode::parse(" eur ", "base").unwrap();
        assert_eq!(code.code(), "EUR");
        assert_eq!(code, CurrencyCode::eur());
    }

    #[test]
    fn test_currency_code_rejects_blank() {
        assert_eq!(
            CurrencyCode::parse("   ", "base"),
            Err(ValidationError::MissingCurrency { field: "base" })
        );
    }

    #[test]
    fn test_currency_code_rejects_non_letters() {
        let err = CurrencyCode::parse("US&D", "to").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CURRENCY");
    }

    #[test]
    fn test_positive_amount() {
        assert!(PositiveAmount::new(dec!(0)).is_err());
        assert!(PositiveAmount::new(dec!(-1.5)).is_err());
        assert_eq!(PositiveAmount::new(dec!(10.00)).unwrap().normalized(), "10");
        assert_eq!(PositiveAmount::new(dec!(2.50)).unwrap().normalized(), "2.5");
    }

    #[test]
    fn test_convert_amount_simple() {
        assert_eq!(convert_amount(dec!(10), dec!(1.2)).unwrap(), dec!(12.00));
        assert_eq!(convert_amount(dec!(10), dec!(1.1)).unwrap(), dec!(11.00));
    }

    #[test]
    fn test_convert_amount_rounds_half_to_even() {
        // 10.005 -> 10.00, 10.015 -> 10.02, 10.025 -> 10.02
        assert_eq!(convert_amount(dec!(10), dec!(1.0005)).unwrap(), dec!(10.00));
        assert_eq!(convert_amount(dec!(10), dec!(1.0015)).unwrap(), dec!(10.02));
        assert_eq!(convert_amount(dec!(10), dec!(1.0025)).unwrap(), dec!(10.02));
        // Non-midpoints round to nearest.
        assert_eq!(convert_amount(dec!(3), dec!(0.3333)).unwrap(), dec!(1.00));
        assert_eq!(convert_amount(dec!(1), dec!(0.126)).unwrap(), dec!(0.13));
    }

    #[test]
    fn test_convert_amount_overflow_is_rejected() {
        assert_eq!(
            convert_amount(Decimal::MAX, dec!(1.2)).unwrap_err().error_code(),
            "AMOUNT_OUT_OF_RANGE"
        );
        assert_eq!(convert_amount(Decimal::MAX, dec!(1)), Ok(Decimal::MAX));
    }

    proptest! {
        #[test]
        fn prop_converted_amount_has_two_digits(
            amount in 1i64..10_000_000,
            rate in 1i64..100_000_000,
        ) {
            let amount = Decimal::new(amount, 2);
            let rate = Decimal::new(rate, 6);
            let converted = convert_amount(amount, rate).unwrap();

            prop_assert!(converted.scale() <= CONVERTED_AMOUNT_SCALE);
            prop_assert!((converted - amount * rate).abs() <= dec!(0.005));
            prop_assert_eq!(Ok(converted), convert_amount(amount, rate));
        }
    }
}
