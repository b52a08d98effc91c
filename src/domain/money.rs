use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Money Value Objects
// ============================================================================
//
// Monetary amounts are exact decimals paired with a 3-letter currency code.
// Arithmetic across different currencies is rejected rather than coerced.
//
// ============================================================================

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },
}

/// ISO-style 3-letter currency code, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Result<Self, MoneyError> {
        let code = code.into().trim().to_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MoneyError::InvalidCurrency(code));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative amount in a single currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, MoneyError> {
        if amount < Decimal::ZERO {
            return Err(MoneyError::NegativeAmount(amount));
        }
        Ok(Self { amount, currency })
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Add two amounts of the same currency.
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Money::new(self.amount + other.amount, self.currency.clone())
    }

    /// Subtract an amount of the same currency. Fails if the result would
    /// go negative.
    pub fn subtract(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Money::new(self.amount - other.amount, self.currency.clone())
    }

    /// Scale the amount by a factor, e.g. unit price times quantity.
    pub fn multiply(&self, factor: Decimal) -> Result<Money, MoneyError> {
        Money::new(self.amount * factor, self.currency.clone())
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::new("USD").unwrap()
    }

    #[test]
    fn test_currency_normalizes_to_uppercase() {
        let currency = Currency::new("usd").unwrap();
        assert_eq!(currency.as_str(), "USD");
    }

    #[test]
    fn test_currency_rejects_bad_codes() {
        assert!(matches!(
            Currency::new("US"),
            Err(MoneyError::InvalidCurrency(_))
        ));
        assert!(matches!(
            Currency::new("DOLLARS"),
            Err(MoneyError::InvalidCurrency(_))
        ));
        assert!(matches!(
            Currency::new("U5D"),
            Err(MoneyError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_money_rejects_negative_amount() {
        let result = Money::new(dec!(-0.01), usd());
        assert!(matches!(result, Err(MoneyError::NegativeAmount(_))));
    }

    #[test]
    fn test_add_same_currency() {
        let a = Money::new(dec!(19.99), usd()).unwrap();
        let b = Money::new(dec!(20.01), usd()).unwrap();
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.amount(), dec!(40.00));
    }

    #[test]
    fn test_add_rejects_currency_mismatch() {
        let a = Money::new(dec!(1.00), usd()).unwrap();
        let b = Money::new(dec!(1.00), Currency::new("EUR").unwrap()).unwrap();
        assert!(matches!(
            a.add(&b),
            Err(MoneyError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_subtract_cannot_go_negative() {
        let a = Money::new(dec!(1.00), usd()).unwrap();
        let b = Money::new(dec!(2.00), usd()).unwrap();
        assert!(matches!(
            a.subtract(&b),
            Err(MoneyError::NegativeAmount(_))
        ));
    }

    #[test]
    fn test_multiply_is_exact() {
        let price = Money::new(dec!(19.99), usd()).unwrap();
        let total = price.multiply(dec!(2)).unwrap();
        assert_eq!(total.amount(), dec!(39.98));
    }

    #[test]
    fn test_display_two_decimals() {
        let money = Money::new(dec!(5), usd()).unwrap();
        assert_eq!(money.to_string(), "5.00 USD");
    }
}
