//! Ledger entry domain model.
//!
//! Every balance-affecting event is recorded as a [`LedgerEntry`]. Entries are
//! never deleted; only their status (and the free-text description) move
//! along the graph enforced by [`EntryStatus::can_transition_to`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::account::AccountId;
use super::money::Money;
use crate::error::DomainError;

crate::domain::uuid_id! {
    /// Unique identifier for a LedgerEntry.
    LedgerEntryId
}

/// What kind of financial event an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryKind {
    /// Funds entering a wallet from an external source
    TopUp,
    /// Funds moving from a hirer to a player for a contract
    Hire,
    /// Funds leaving a wallet to an external destination
    Withdraw,
    /// Funds returned to a hirer after a cancellation
    Refund,
}

impl EntryKind {
    /// Direction of the movement relative to the owning account.
    pub fn direction(&self) -> Direction {
        match self {
            EntryKind::TopUp | EntryKind::Refund => Direction::Credit,
            EntryKind::Hire | EntryKind::Withdraw => Direction::Debit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::TopUp => "TOPUP",
            EntryKind::Hire => "HIRE",
            EntryKind::Withdraw => "WITHDRAW",
            EntryKind::Refund => "REFUND",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntryKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TOPUP" => Ok(EntryKind::TopUp),
            "HIRE" => Ok(EntryKind::Hire),
            "WITHDRAW" => Ok(EntryKind::Withdraw),
            "REFUND" => Ok(EntryKind::Refund),
            other => Err(DomainError::Validation(format!(
                "Unknown payment kind: {}",
                other
            ))),
        }
    }
}

/// Lifecycle of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl EntryStatus {
    /// PENDING -> COMPLETED | FAILED, COMPLETED -> REFUNDED. Nothing else.
    pub fn can_transition_to(&self, next: EntryStatus) -> bool {
        matches!(
            (self, next),
            (EntryStatus::Pending, EntryStatus::Completed)
                | (EntryStatus::Pending, EntryStatus::Failed)
                | (EntryStatus::Completed, EntryStatus::Refunded)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "PENDING",
            EntryStatus::Completed => "COMPLETED",
            EntryStatus::Failed => "FAILED",
            EntryStatus::Refunded => "REFUNDED",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(EntryStatus::Pending),
            "COMPLETED" => Ok(EntryStatus::Completed),
            "FAILED" => Ok(EntryStatus::Failed),
            "REFUNDED" => Ok(EntryStatus::Refunded),
            other => Err(DomainError::Validation(format!(
                "Unknown payment status: {}",
                other
            ))),
        }
    }
}

/// Debit or credit, seen from the owning account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Debit => Direction::Credit,
            Direction::Credit => Direction::Debit,
        }
    }
}

/// Payment method recorded for internal wallet movements.
pub const WALLET_METHOD: &str = "WALLET";

/// An immutable record of one financial event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    /// Account the entry belongs to (the payer for HIRE, the payee for REFUND)
    pub account_id: AccountId,
    /// Other side of an internal movement, `None` for TOPUP and WITHDRAW
    pub counterparty_id: Option<AccountId>,
    pub amount: Money,
    pub kind: EntryKind,
    pub status: EntryStatus,
    /// How the money moved (`WALLET`, `BANK`, `MOMO`, ...)
    pub payment_method: String,
    /// Reference assigned by an external payment gateway
    pub external_ref: Option<String>,
    /// Client supplied key used to detect retried requests
    pub idempotency_key: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// Creates a PENDING entry.
    pub fn pending(
        kind: EntryKind,
        account_id: AccountId,
        counterparty_id: Option<AccountId>,
        amount: Money,
        payment_method: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            account_id,
            counterparty_id,
            amount,
            kind,
            status: EntryStatus::Pending,
            payment_method: payment_method.into(),
            external_ref: None,
            idempotency_key: None,
            description: None,
            created_at: now,
            completed_at: None,
        }
    }

    /// HIRE entry: hirer pays player. Recorded as COMPLETED since funds move at booking.
    pub fn hire(hirer: AccountId, player: AccountId, amount: Money, now: DateTime<Utc>) -> Self {
        Self::pending(
            EntryKind::Hire,
            hirer,
            Some(player),
            amount,
            WALLET_METHOD,
            now,
        )
        .completed_at(now)
    }

    /// REFUND entry: player returns a canceled hire's amount to the hirer.
    pub fn refund(hirer: AccountId, player: AccountId, amount: Money, now: DateTime<Utc>) -> Self {
        Self::pending(
            EntryKind::Refund,
            hirer,
            Some(player),
            amount,
            WALLET_METHOD,
            now,
        )
        .completed_at(now)
    }

    /// Marks a freshly built entry as already settled.
    pub fn completed_at(mut self, now: DateTime<Utc>) -> Self {
        self.status = EntryStatus::Completed;
        self.completed_at = Some(now);
        self
    }

    /// Replaces the generated id. Lets a caller tell its own write from a replay.
    pub fn with_id(mut self, id: LedgerEntryId) -> Self {
        self.id = id;
        self
    }

    pub fn with_idempotency_key(mut self, key: Option<String>) -> Self {
        self.idempotency_key = key;
        self
    }

    pub fn with_external_ref(mut self, external_ref: Option<String>) -> Self {
        self.external_ref = external_ref;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Whether `other` moves the same money between the same parties. A key
    /// may only be replayed by a request that passes this check.
    pub fn same_request(&self, other: &LedgerEntry) -> bool {
        self.account_id == other.account_id
            && self.counterparty_id == other.counterparty_id
            && self.kind == other.kind
            && self.amount == other.amount
    }

    /// Moves the entry along the status graph.
    pub fn transition(&mut self, next: EntryStatus, at: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        if next == EntryStatus::Completed {
            self.completed_at = Some(at);
        }
        Ok(())
    }

    /// Balance effect on the owner when a PENDING entry completes.
    pub fn settlement_direction(&self) -> Direction {
        self.kind.direction()
    }

    /// Balance effect on the owner when a COMPLETED entry is refunded.
    pub fn refund_direction(&self) -> Direction {
        self.kind.direction().reversed()
    }

    /// Applies a status change and returns the balance movement the owner's
    /// wallet must undergo for it, if any. The caller persists both together.
    pub fn apply(&mut self, change: &StatusChange) -> Result<Option<Direction>, DomainError> {
        if change.to == EntryStatus::Refunded
            && matches!(self.kind, EntryKind::Hire | EntryKind::Refund)
        {
            if !self.status.can_transition_to(change.to) {
                return Err(DomainError::InvalidTransition {
                    from: self.status,
                    to: change.to,
                });
            }
            return Err(DomainError::Validation(
                "Hire payments are refunded by canceling the contract".into(),
            ));
        }

        self.transition(change.to, change.at)?;
        if change.external_ref.is_some() {
            self.external_ref = change.external_ref.clone();
        }
        if change.reason.is_some() {
            self.description = change.reason.clone();
        }

        Ok(match change.to {
            EntryStatus::Completed => Some(self.settlement_direction()),
            EntryStatus::Refunded => Some(self.refund_direction()),
            EntryStatus::Pending | EntryStatus::Failed => None,
        })
    }
}

/// A requested move along the status graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub to: EntryStatus,
    /// Gateway reference, recorded when a payment completes
    pub external_ref: Option<String>,
    /// Replaces the description (failure or refund reason)
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

impl StatusChange {
    pub fn complete(external_ref: Option<String>, at: DateTime<Utc>) -> Self {
        Self {
            to: EntryStatus::Completed,
            external_ref,
            reason: None,
            at,
        }
    }

    pub fn fail(reason: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            to: EntryStatus::Failed,
            external_ref: None,
            reason: Some(reason.into()),
            at,
        }
    }

    pub fn refund(reason: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            to: EntryStatus::Refunded,
            external_ref: None,
            reason: Some(reason.into()),
            at,
        }
    }
}
