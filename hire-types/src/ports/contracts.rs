//! Hire contract store port.

use chrono::{DateTime, Utc};

use crate::domain::{AccountId, ContractId, HireContract, LedgerEntry, LedgerEntryId};
use crate::error::RepoError;

/// A validated booking request handed to the store.
#[derive(Debug, Clone)]
pub struct HireBooking {
    pub hirer_id: AccountId,
    pub player_id: AccountId,
    /// In the hirer's currency, smallest unit
    pub amount: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub idempotency_key: Option<String>,
    /// Id given to the HIRE entry if this booking is written. A replay
    /// returns the stored entry with its original id instead.
    pub entry_id: LedgerEntryId,
    pub description: Option<String>,
    /// The instant every time rule of this booking is evaluated at
    pub now: DateTime<Utc>,
}

/// Filter for contract listings. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractQuery {
    pub hirer_id: Option<AccountId>,
    pub player_id: Option<AccountId>,
}

impl ContractQuery {
    pub fn matches(&self, contract: &HireContract) -> bool {
        self.hirer_id.is_none_or(|id| contract.hirer_id == id)
            && self.player_id.is_none_or(|id| contract.player_id == id)
    }
}

/// Stores hire contracts.
///
/// `book_hire` and `cancel_hire` evaluate their checks (player overlap,
/// balances) in the same atomic step as their writes, so concurrent bookings
/// cannot double-book a player or overdraw a wallet.
#[async_trait::async_trait]
pub trait ContractStore: Send + Sync + 'static {
    /// Moves the amount from hirer to player, records the HIRE entry and
    /// creates the ACTIVE contract. A repeated idempotency key from the same
    /// hirer returns the original contract and entry if the amount and player
    /// match, and fails with `IdempotencyKeyReused` otherwise.
    async fn book_hire(
        &self,
        booking: HireBooking,
    ) -> Result<(HireContract, LedgerEntry), RepoError>;

    /// Reverses the transfer, records the REFUND entry, marks the HIRE entry
    /// REFUNDED and the contract CANCELED.
    async fn cancel_hire(
        &self,
        id: ContractId,
        requester: AccountId,
        now: DateTime<Utc>,
    ) -> Result<(HireContract, LedgerEntry), RepoError>;

    async fn get_contract(&self, id: ContractId) -> Result<Option<HireContract>, RepoError>;

    /// Matching contracts, newest first.
    async fn list_contracts(&self, query: ContractQuery) -> Result<Vec<HireContract>, RepoError>;

    /// Persists COMPLETED for every ACTIVE contract whose end has passed.
    /// Returns how many were updated.
    async fn settle_elapsed(&self, now: DateTime<Utc>) -> Result<u64, RepoError>;
}
