//! Database row types for the SQLite adapter.
//!
//! SQLite has no native UUID or timestamp type, so ids are stored as text and
//! instants as fixed-width RFC 3339 strings (microseconds, `Z` suffix). The
//! fixed width makes lexical order match time order, which the range and
//! overlap queries rely on.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use hire_types::{
    Account, AccountId, ContractId, Currency, EntryKind, EntryStatus, HireContract, HireStatus,
    LedgerEntry, LedgerEntryId, Money, Rating, RepoError, Review, ReviewId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Column codecs
// ─────────────────────────────────────────────────────────────────────────────

pub fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn opt_ts(at: Option<DateTime<Utc>>) -> Option<String> {
    at.map(ts)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepoError::Database(e.to_string()))
}

fn parse_opt_ts(s: Option<String>) -> Result<Option<DateTime<Utc>>, RepoError> {
    s.as_deref().map(parse_ts).transpose()
}

fn parse_uuid(s: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(s).map_err(|e| RepoError::Database(e.to_string()))
}

fn parse_money(amount: i64, currency: &str) -> Result<Money, RepoError> {
    let currency: Currency = currency.parse()?;
    Ok(Money::new(amount, currency)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Rows
// ─────────────────────────────────────────────────────────────────────────────

/// Account row from database.
#[derive(FromRow)]
pub struct DbAccount {
    pub id: String,
    pub username: String,
    pub balance: i64,
    pub currency: String,
    pub created_at: String,
}

impl DbAccount {
    pub fn into_domain(self) -> Result<Account, RepoError> {
        Ok(Account::from_parts(
            AccountId::from_uuid(parse_uuid(&self.id)?),
            self.username,
            parse_money(self.balance, &self.currency)?,
            parse_ts(&self.created_at)?,
        ))
    }
}

/// Ledger entry row from database.
#[derive(FromRow)]
pub struct DbLedgerEntry {
    pub id: String,
    pub account_id: String,
    pub counterparty_id: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub kind: String,
    pub status: String,
    pub payment_method: String,
    pub external_ref: Option<String>,
    pub idempotency_key: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl DbLedgerEntry {
    pub fn into_domain(self) -> Result<LedgerEntry, RepoError> {
        let counterparty_id = match self.counterparty_id.as_deref() {
            Some(id) => Some(AccountId::from_uuid(parse_uuid(id)?)),
            None => None,
        };
        Ok(LedgerEntry {
            id: LedgerEntryId::from_uuid(parse_uuid(&self.id)?),
            account_id: AccountId::from_uuid(parse_uuid(&self.account_id)?),
            counterparty_id,
            amount: parse_money(self.amount, &self.currency)?,
            kind: self.kind.parse::<EntryKind>()?,
            status: self.status.parse::<EntryStatus>()?,
            payment_method: self.payment_method,
            external_ref: self.external_ref,
            idempotency_key: self.idempotency_key,
            description: self.description,
            created_at: parse_ts(&self.created_at)?,
            completed_at: parse_opt_ts(self.completed_at)?,
        })
    }
}

/// Hire contract row from database.
#[derive(FromRow)]
pub struct DbHireContract {
    pub id: String,
    pub hirer_id: String,
    pub player_id: String,
    pub amount: i64,
    pub currency: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    pub ledger_entry_id: String,
    pub created_at: String,
    pub canceled_at: Option<String>,
}

impl DbHireContract {
    pub fn into_domain(self) -> Result<HireContract, RepoError> {
        Ok(HireContract {
            id: ContractId::from_uuid(parse_uuid(&self.id)?),
            hirer_id: AccountId::from_uuid(parse_uuid(&self.hirer_id)?),
            player_id: AccountId::from_uuid(parse_uuid(&self.player_id)?),
            amount: parse_money(self.amount, &self.currency)?,
            start_time: parse_ts(&self.start_time)?,
            end_time: parse_ts(&self.end_time)?,
            status: self.status.parse::<HireStatus>()?,
            ledger_entry_id: LedgerEntryId::from_uuid(parse_uuid(&self.ledger_entry_id)?),
            created_at: parse_ts(&self.created_at)?,
            canceled_at: parse_opt_ts(self.canceled_at)?,
        })
    }
}

/// Review row from database.
#[derive(FromRow)]
pub struct DbReview {
    pub id: String,
    pub contract_id: String,
    pub player_id: String,
    pub reviewer_id: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

impl DbReview {
    pub fn into_domain(self) -> Result<Review, RepoError> {
        Ok(Review {
            id: ReviewId::from_uuid(parse_uuid(&self.id)?),
            contract_id: ContractId::from_uuid(parse_uuid(&self.contract_id)?),
            player_id: AccountId::from_uuid(parse_uuid(&self.player_id)?),
            reviewer_id: AccountId::from_uuid(parse_uuid(&self.reviewer_id)?),
            rating: Rating::try_from(self.rating)?,
            comment: self.comment,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}
