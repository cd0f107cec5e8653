//! Wallet store port.

use crate::domain::{Account, AccountId, Money};
use crate::dto::CreateAccountRequest;
use crate::error::RepoError;

/// Holds each account's balance.
///
/// `credit`, `debit` and `transfer` are atomic with respect to each other for
/// the same account, and a balance is never left negative. A transfer is
/// all-or-nothing.
#[async_trait::async_trait]
pub trait WalletStore: Send + Sync + 'static {
    /// Opens a zero-balance wallet. Usernames are unique.
    async fn create_account(&self, req: CreateAccountRequest) -> Result<Account, RepoError>;

    /// Gets an account by ID.
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepoError>;

    /// Gets an account by its owner's username.
    async fn find_account_by_username(&self, username: &str)
    -> Result<Option<Account>, RepoError>;

    /// Adds a strictly positive amount.
    async fn credit(&self, id: AccountId, amount: Money) -> Result<Account, RepoError>;

    /// Removes an amount, failing with `InsufficientFunds` if the balance does not cover it.
    async fn debit(&self, id: AccountId, amount: Money) -> Result<Account, RepoError>;

    /// Debits `from` and credits `to` as one step. Returns both updated accounts.
    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Money,
    ) -> Result<(Account, Account), RepoError>;
}
