//! Account (wallet) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::money::{Currency, Money};
use crate::error::DomainError;

crate::domain::uuid_id! {
    /// Unique identifier for an Account.
    ///
    /// Ordered so that multi-account operations can acquire locks in a fixed
    /// global order.
    AccountId
}

/// A user's wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Username of the owning user, unique across accounts
    pub username: String,
    /// Current balance (includes currency information). Never negative.
    pub balance: Money,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Opens a new wallet with zero balance.
    ///
    /// # Validation
    /// - Username cannot be empty
    pub fn new(username: String, currency: Currency) -> Result<Self, DomainError> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(DomainError::Validation("Username cannot be empty".into()));
        }

        Ok(Self {
            id: AccountId::new(),
            username,
            balance: Money::zero(currency),
            created_at: Utc::now(),
        })
    }

    /// Creates an account with all fields specified (for database reconstruction).
    pub fn from_parts(
        id: AccountId,
        username: String,
        balance: Money,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            balance,
            created_at,
        }
    }

    /// Returns the currency of this account.
    pub fn currency(&self) -> Currency {
        self.balance.currency()
    }

    /// Credits (adds) money to the account. The amount must be strictly positive.
    pub fn credit(&mut self, amount: Money) -> Result<(), DomainError> {
        if amount.is_zero() {
            return Err(DomainError::InvalidAmount);
        }
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    /// Debits (subtracts) money from the account.
    pub fn debit(&mut self, amount: Money) -> Result<(), DomainError> {
        if amount.is_zero() {
            return Err(DomainError::InvalidAmount);
        }
        self.balance = self.balance.checked_sub(amount)?;
        Ok(())
    }

    /// Checks if the account has sufficient funds for a debit.
    pub fn has_sufficient_funds(&self, amount: &Money) -> bool {
        self.balance.covers(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_parses_and_orders_like_its_uuid() {
        let a = AccountId::new();
        let b = AccountId::new();
        assert_eq!(a.to_string().parse::<AccountId>().unwrap(), a);
        assert_eq!(a < b, a.as_uuid() < b.as_uuid());
        assert!("not-a-uuid".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_account_creation() {
        let account = Account::new("  alice ".to_string(), Currency::VND).unwrap();
        assert_eq!(account.username, "alice");
        assert_eq!(account.balance.amount(), 0);
        assert_eq!(account.currency(), Currency::VND);
    }

    #[test]
    fn test_empty_username_fails() {
        let result = Account::new("   ".to_string(), Currency::VND);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_credit_then_debit() {
        let mut account = Account::new("bob".to_string(), Currency::VND).unwrap();
        account
            .credit(Money::new(1000, Currency::VND).unwrap())
            .unwrap();
        account
            .debit(Money::new(300, Currency::VND).unwrap())
            .unwrap();
        assert_eq!(account.balance.amount(), 700);
    }

    #[test]
    fn test_zero_credit_is_invalid_amount() {
        let mut account = Account::new("bob".to_string(), Currency::VND).unwrap();
        let result = account.credit(Money::zero(Currency::VND));
        assert_eq!(result, Err(DomainError::InvalidAmount));
    }

    #[test]
    fn test_insufficient_funds_leaves_balance_untouched() {
        let mut account = Account::new("carol".to_string(), Currency::VND).unwrap();
        account
            .credit(Money::new(100, Currency::VND).unwrap())
            .unwrap();
        let result = account.debit(Money::new(200, Currency::VND).unwrap());
        assert!(matches!(result, Err(DomainError::InsufficientFunds { .. })));
        assert_eq!(account.balance.amount(), 100);
    }
}
