//! # Hire Repository
//!
//! Concrete store implementations (adapters) for the hire marketplace.
//! Every adapter implements all four store ports from `hire-types`, so any
//! of them satisfies `MarketRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hire_types::{
    Account, AccountId, ContractId, ContractQuery, ContractStore, CreateAccountRequest,
    HireBooking, HireContract, Ledger, LedgerEntry, LedgerEntryId, LedgerQuery, Money, Rating,
    RepoError, Review, ReviewStore, StatusChange, WalletStore,
};

pub mod memory;
mod settlement;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
mod types;

#[cfg(test)]
mod memory_tests;

pub use memory::MemoryRepo;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepo;

/// URL that selects the in-memory store.
pub const MEMORY_URL: &str = "memory://";

/// Store chosen at start-up from the database URL.
pub enum Repo {
    Memory(MemoryRepo),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteRepo),
}

/// Build and initialize a repository from a database URL.
///
/// This function:
/// 1. Picks the adapter from the URL scheme
/// 2. Connects and runs migrations (SQLite only)
/// 3. Returns a ready-to-use `Repo`
///
/// # Examples
///
/// ```ignore
/// let repo = build_repo("memory://").await?;
///
/// // With the `sqlite` feature
/// let repo = build_repo("sqlite://hire.db?mode=rwc").await?;
/// ```
pub async fn build_repo(database_url: &str) -> anyhow::Result<Repo> {
    Repo::new(database_url).await
}

impl Repo {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        if database_url.starts_with(MEMORY_URL) {
            return Ok(Repo::Memory(MemoryRepo::new()));
        }

        #[cfg(feature = "sqlite")]
        if database_url.starts_with("sqlite:") {
            return Ok(Repo::Sqlite(SqliteRepo::new(database_url).await?));
        }

        anyhow::bail!("Unsupported database URL: {database_url}")
    }

    /// Short adapter name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Repo::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Repo::Sqlite(_) => "sqlite",
        }
    }
}

macro_rules! delegate {
    ($self:ident, $repo:ident => $call:expr) => {
        match $self {
            Repo::Memory($repo) => $call,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite($repo) => $call,
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Port implementations for Repo (delegation)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl WalletStore for Repo {
    async fn create_account(&self, req: CreateAccountRequest) -> Result<Account, RepoError> {
        delegate!(self, r => r.create_account(req).await)
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepoError> {
        delegate!(self, r => r.get_account(id).await)
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, RepoError> {
        delegate!(self, r => r.find_account_by_username(username).await)
    }

    async fn credit(&self, id: AccountId, amount: Money) -> Result<Account, RepoError> {
        delegate!(self, r => r.credit(id, amount).await)
    }

    async fn debit(&self, id: AccountId, amount: Money) -> Result<Account, RepoError> {
        delegate!(self, r => r.debit(id, amount).await)
    }

    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Money,
    ) -> Result<(Account, Account), RepoError> {
        delegate!(self, r => r.transfer(from, to, amount).await)
    }
}

#[async_trait]
impl Ledger for Repo {
    async fn record(&self, entry: LedgerEntry) -> Result<LedgerEntry, RepoError> {
        delegate!(self, r => r.record(entry).await)
    }

    async fn post(&self, entry: LedgerEntry) -> Result<LedgerEntry, RepoError> {
        delegate!(self, r => r.post(entry).await)
    }

    async fn transition(
        &self,
        id: LedgerEntryId,
        change: StatusChange,
    ) -> Result<LedgerEntry, RepoError> {
        delegate!(self, r => r.transition(id, change).await)
    }

    async fn get_entry(&self, id: LedgerEntryId) -> Result<Option<LedgerEntry>, RepoError> {
        delegate!(self, r => r.get_entry(id).await)
    }

    async fn find_by_idempotency_key(
        &self,
        account_id: AccountId,
        key: &str,
    ) -> Result<Option<LedgerEntry>, RepoError> {
        delegate!(self, r => r.find_by_idempotency_key(account_id, key).await)
    }

    async fn list_entries(&self, query: LedgerQuery) -> Result<Vec<LedgerEntry>, RepoError> {
        delegate!(self, r => r.list_entries(query).await)
    }
}

#[async_trait]
impl ContractStore for Repo {
    async fn book_hire(
        &self,
        booking: HireBooking,
    ) -> Result<(HireContract, LedgerEntry), RepoError> {
        delegate!(self, r => r.book_hire(booking).await)
    }

    async fn cancel_hire(
        &self,
        id: ContractId,
        requester: AccountId,
        now: DateTime<Utc>,
    ) -> Result<(HireContract, LedgerEntry), RepoError> {
        delegate!(self, r => r.cancel_hire(id, requester, now).await)
    }

    async fn get_contract(&self, id: ContractId) -> Result<Option<HireContract>, RepoError> {
        delegate!(self, r => r.get_contract(id).await)
    }

    async fn list_contracts(&self, query: ContractQuery) -> Result<Vec<HireContract>, RepoError> {
        delegate!(self, r => r.list_contracts(query).await)
    }

    async fn settle_elapsed(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        delegate!(self, r => r.settle_elapsed(now).await)
    }
}

#[async_trait]
impl ReviewStore for Repo {
    async fn submit_review(
        &self,
        contract_id: ContractId,
        reviewer_id: AccountId,
        rating: Rating,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Review, RepoError> {
        delegate!(self, r => r.submit_review(contract_id, reviewer_id, rating, comment, now).await)
    }

    async fn get_review_for_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<Option<Review>, RepoError> {
        delegate!(self, r => r.get_review_for_contract(contract_id).await)
    }

    async fn list_reviews_for_player(
        &self,
        player_id: AccountId,
    ) -> Result<Vec<Review>, RepoError> {
        delegate!(self, r => r.list_reviews_for_player(player_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_repo_selects_memory_store() {
        let repo = build_repo("memory://").await.unwrap();
        assert_eq!(repo.kind(), "memory");
    }

    #[tokio::test]
    async fn test_build_repo_rejects_unknown_scheme() {
        assert!(build_repo("mysql://localhost/hire").await.is_err());
    }
}
