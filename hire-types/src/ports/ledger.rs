//! Ledger port.

use chrono::{DateTime, Utc};

use crate::domain::{AccountId, EntryKind, EntryStatus, LedgerEntry, LedgerEntryId, StatusChange};
use crate::error::RepoError;

/// Filter for ledger listings. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerQuery {
    /// Owning account
    pub account_id: Option<AccountId>,
    pub counterparty_id: Option<AccountId>,
    pub status: Option<EntryStatus>,
    pub kind: Option<EntryKind>,
    /// Inclusive
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive
    pub created_to: Option<DateTime<Utc>>,
}

impl LedgerQuery {
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        self.account_id.is_none_or(|id| entry.account_id == id)
            && self
                .counterparty_id
                .is_none_or(|id| entry.counterparty_id == Some(id))
            && self.status.is_none_or(|s| entry.status == s)
            && self.kind.is_none_or(|k| entry.kind == k)
            && self.created_from.is_none_or(|t| entry.created_at >= t)
            && self.created_to.is_none_or(|t| entry.created_at <= t)
    }
}

/// Append-only record of every balance-affecting event.
///
/// Entries are never deleted. Status changes follow
/// PENDING -> COMPLETED | FAILED and COMPLETED -> REFUNDED; the balance effect
/// of a change is applied in the same atomic step as the status write.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync + 'static {
    /// Persists a PENDING TOPUP or WITHDRAW entry. No funds move.
    async fn record(&self, entry: LedgerEntry) -> Result<LedgerEntry, RepoError>;

    /// Persists a COMPLETED TOPUP or WITHDRAW entry and applies it to the
    /// owner's balance. Keys are scoped to the owner: a repeated key returns
    /// the original entry when it records the same movement and fails with
    /// `IdempotencyKeyReused` when it does not.
    async fn post(&self, entry: LedgerEntry) -> Result<LedgerEntry, RepoError>;

    /// Moves an entry along the status graph, applying any balance effect.
    async fn transition(
        &self,
        id: LedgerEntryId,
        change: StatusChange,
    ) -> Result<LedgerEntry, RepoError>;

    async fn get_entry(&self, id: LedgerEntryId) -> Result<Option<LedgerEntry>, RepoError>;

    async fn find_by_idempotency_key(
        &self,
        account_id: AccountId,
        key: &str,
    ) -> Result<Option<LedgerEntry>, RepoError>;

    /// Matching entries, newest first.
    async fn list_entries(&self, query: LedgerQuery) -> Result<Vec<LedgerEntry>, RepoError>;
}
