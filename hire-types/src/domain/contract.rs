//! Hire contract domain model.
//!
//! A contract books a player for a fixed `[start_time, end_time]` window.
//! The stored status is only ever written as ACTIVE or CANCELED by the
//! booking flows; COMPLETED is derived from the clock by
//! [`HireContract::effective_status`] (a sweeper may persist it, but no reader
//! depends on that).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::account::AccountId;
use super::ledger::LedgerEntryId;
use super::money::Money;
use crate::error::DomainError;

crate::domain::uuid_id! {
    /// Unique identifier for a HireContract.
    ContractId
}

/// Lifecycle of a hire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HireStatus {
    Active,
    Completed,
    Canceled,
}

impl HireStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HireStatus::Active => "ACTIVE",
            HireStatus::Completed => "COMPLETED",
            HireStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for HireStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HireStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(HireStatus::Active),
            "COMPLETED" => Ok(HireStatus::Completed),
            "CANCELED" => Ok(HireStatus::Canceled),
            other => Err(DomainError::Validation(format!(
                "Unknown hire status: {}",
                other
            ))),
        }
    }
}

/// A time-boxed engagement between a hirer and a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HireContract {
    pub id: ContractId,
    pub hirer_id: AccountId,
    pub player_id: AccountId,
    pub amount: Money,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Stored status. Use [`HireContract::effective_status`] for reads.
    pub status: HireStatus,
    /// The HIRE ledger entry that funded this contract
    pub ledger_entry_id: LedgerEntryId,
    pub created_at: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
}

impl HireContract {
    /// Validates a requested window against the current time.
    pub fn validate_window(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if start >= end {
            return Err(DomainError::InvalidTimeRange);
        }
        if start < now {
            return Err(DomainError::TimeInPast);
        }
        Ok(())
    }

    /// Creates an ACTIVE contract funded by `ledger_entry_id`.
    pub fn book(
        hirer_id: AccountId,
        player_id: AccountId,
        amount: Money,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        ledger_entry_id: LedgerEntryId,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if hirer_id == player_id {
            return Err(DomainError::Validation("A player cannot hire themselves".into()));
        }
        if amount.is_zero() {
            return Err(DomainError::InvalidAmount);
        }
        Self::validate_window(start_time, end_time, now)?;

        Ok(Self {
            id: ContractId::new(),
            hirer_id,
            player_id,
            amount,
            start_time,
            end_time,
            status: HireStatus::Active,
            ledger_entry_id,
            created_at: now,
            canceled_at: None,
        })
    }

    /// Whether this contract blocks a booking of the same player for
    /// `[start, end]` made at `now`. Touching windows count as overlapping;
    /// a contract whose window has elapsed no longer blocks.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == HireStatus::Active
            && self.start_time <= end
            && self.end_time >= start
    }

    /// Status as observed at `now`. Pure: two readers with the same `now` agree.
    pub fn effective_status(&self, now: DateTime<Utc>) -> HireStatus {
        match self.status {
            HireStatus::Active if now >= self.end_time => HireStatus::Completed,
            status => status,
        }
    }

    pub fn is_completed_at(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == HireStatus::Completed
    }

    /// Checks the cancellation rules without mutating.
    pub fn ensure_cancellable(
        &self,
        requester: AccountId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if requester != self.hirer_id {
            return Err(DomainError::Forbidden);
        }
        if self.status != HireStatus::Active {
            return Err(DomainError::NotActive);
        }
        if now >= self.start_time {
            return Err(DomainError::AlreadyStarted);
        }
        Ok(())
    }

    /// Marks the contract CANCELED.
    pub fn cancel(&mut self, requester: AccountId, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_cancellable(requester, now)?;
        self.status = HireStatus::Canceled;
        self.canceled_at = Some(now);
        Ok(())
    }

    /// Checks whether `reviewer` may review this contract at `now`.
    pub fn ensure_reviewable(
        &self,
        reviewer: AccountId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if reviewer != self.hirer_id {
            return Err(DomainError::Forbidden);
        }
        if self.status == HireStatus::Canceled {
            return Err(DomainError::NotActive);
        }
        if now < self.end_time {
            return Err(DomainError::ContractNotEnded);
        }
        Ok(())
    }

    /// Persists COMPLETED once the window has elapsed. Returns whether it changed.
    pub fn settle_if_elapsed(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == HireStatus::Active && now >= self.end_time {
            self.status = HireStatus::Completed;
            return true;
        }
        false
    }

    /// Booked length in hours.
    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_seconds() as f64 / 3600.0
    }
}
