//! Type-safe monetary value with embedded currency.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Currencies a wallet can be denominated in.
///
/// There is no conversion between them: every movement of funds happens
/// between wallets of the same currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    VND,
    USD,
    EUR,
    GBP,
    INR,
}

impl Currency {
    /// Returns the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::VND => 0,
            Currency::USD | Currency::EUR | Currency::GBP | Currency::INR => 2,
        }
    }

    /// Returns the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::VND => "₫",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::INR => "₹",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::str::FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VND" => Ok(Currency::VND),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "INR" => Ok(Currency::INR),
            other => Err(DomainError::Validation(format!(
                "Unsupported currency: {}",
                other
            ))),
        }
    }
}

/// Type-safe money representation with embedded currency.
///
/// Amount is stored in the smallest unit of the currency (cents, dong, etc.)
/// to avoid floating-point precision issues. It is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value. Zero is allowed, negative is not.
    pub fn new(amount: i64, currency: Currency) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::InvalidAmount);
        }
        Ok(Self { amount, currency })
    }

    /// Creates a strictly positive Money value, as required for every
    /// movement of funds.
    pub fn positive(amount: i64, currency: Currency) -> Result<Self, DomainError> {
        if amount <= 0 {
            return Err(DomainError::InvalidAmount);
        }
        Ok(Self { amount, currency })
    }

    /// Creates a zero-value Money for the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: 0,
            currency,
        }
    }

    /// Returns the amount in smallest currency unit.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                expected: self.currency,
                got: other.currency,
            });
        }
        Ok(())
    }

    /// Checked addition - fails on currency mismatch or overflow.
    pub fn checked_add(&self, other: Money) -> Result<Money, DomainError> {
        self.ensure_same_currency(&other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| DomainError::Validation("Amount overflow".into()))?;
        Ok(Money {
            amount,
            currency: self.currency,
        })
    }

    /// Checked subtraction - fails on currency mismatch or if the result would be negative.
    pub fn checked_sub(&self, other: Money) -> Result<Money, DomainError> {
        self.ensure_same_currency(&other)?;
        if self.amount < other.amount {
            return Err(DomainError::InsufficientFunds {
                available: self.amount,
                requested: other.amount,
            });
        }
        Ok(Money {
            amount: self.amount - other.amount,
            currency: self.currency,
        })
    }

    /// Returns true if this Money covers the other. Mismatched currencies never cover.
    pub fn covers(&self, other: &Money) -> bool {
        self.currency == other.currency && self.amount >= other.amount
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.currency.decimal_places() {
            0 => write!(f, "{}{}", self.amount, self.currency.symbol()),
            _ => {
                let major = self.amount / 100;
                let minor = self.amount % 100;
                write!(f, "{}{}.{:02}", self.currency.symbol(), major, minor)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let money = Money::new(1000, Currency::USD).unwrap();
        assert_eq!(money.amount(), 1000);
        assert_eq!(money.currency(), Currency::USD);
    }

    #[test]
    fn test_negative_money_fails() {
        let result = Money::new(-100, Currency::USD);
        assert!(matches!(result, Err(DomainError::InvalidAmount)));
    }

    #[test]
    fn test_positive_rejects_zero() {
        assert!(matches!(
            Money::positive(0, Currency::VND),
            Err(DomainError::InvalidAmount)
        ));
        assert!(Money::positive(1, Currency::VND).is_ok());
    }

    #[test]
    fn test_currency_mismatch() {
        let usd = Money::new(100, Currency::USD).unwrap();
        let eur = Money::new(50, Currency::EUR).unwrap();
        let result = usd.checked_add(eur);
        assert!(matches!(result, Err(DomainError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_sub_below_zero_is_insufficient_funds() {
        let a = Money::new(100, Currency::VND).unwrap();
        let b = Money::new(150, Currency::VND).unwrap();
        assert_eq!(
            a.checked_sub(b),
            Err(DomainError::InsufficientFunds {
                available: 100,
                requested: 150
            })
        );
    }

    #[test]
    fn test_add_overflow_is_rejected() {
        let a = Money::new(i64::MAX, Currency::VND).unwrap();
        let b = Money::new(1, Currency::VND).unwrap();
        assert!(matches!(a.checked_add(b), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_money_display() {
        let money = Money::new(1050, Currency::USD).unwrap();
        assert_eq!(format!("{}", money), "$10.50");
        let dong = Money::new(50_000, Currency::VND).unwrap();
        assert_eq!(format!("{}", dong), "50000₫");
    }
}
