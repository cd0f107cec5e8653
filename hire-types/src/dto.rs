//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Account, AccountId, Currency, EntryKind, EntryStatus, HireContract, HireStatus, LedgerEntry,
    StatsPeriod, WALLET_METHOD,
};

// ─────────────────────────────────────────────────────────────────────────────
// Account DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to open a wallet for a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    /// Username of the wallet owner
    #[schema(example = "alice")]
    pub username: String,
    #[serde(default = "default_currency")]
    pub currency: Currency,
}

fn default_currency() -> Currency {
    Currency::VND
}

fn default_method() -> String {
    WALLET_METHOD.to_string()
}

/// Wallet as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: AccountId,
    #[schema(example = "alice")]
    pub username: String,
    /// Current balance in smallest currency unit
    #[schema(example = 100000)]
    pub balance: i64,
    pub currency: Currency,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            balance: account.balance.amount(),
            currency: account.currency(),
            username: account.username,
        }
    }
}

/// How a caller identifies an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    Id(AccountId),
    Username(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Wallet DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to add funds to a wallet, in the wallet's currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopUpRequest {
    pub account_id: AccountId,
    /// Amount in smallest currency unit
    #[schema(example = 100000)]
    pub amount: i64,
    /// Gateway the funds came through
    #[serde(default = "default_method")]
    #[schema(example = "BANK")]
    pub payment_method: String,
    /// Transaction reference assigned by the gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    /// Optional idempotency key to prevent duplicate top-ups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request to move funds out of a wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    pub account_id: AccountId,
    #[schema(example = 20000)]
    pub amount: i64,
    #[serde(default = "default_method")]
    #[schema(example = "BANK")]
    pub payment_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Confirms a pending payment once the gateway reports success.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    #[schema(example = "GW-20240501-0001")]
    pub external_ref: String,
}

/// Marks a pending payment failed, or refunds a completed one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentReasonRequest {
    #[schema(example = "Gateway declined the card")]
    pub reason: String,
}

/// Filters for payment listings. All filters combine with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PaymentFilter {
    #[serde(default)]
    pub status: Option<EntryStatus>,
    #[serde(default)]
    pub kind: Option<EntryKind>,
    /// Inclusive lower bound on creation time
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Hire DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to book a player. The hirer is the authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookHireRequest {
    pub player_id: AccountId,
    /// Price of the whole window in smallest currency unit
    #[schema(example = 50000)]
    pub amount: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Optional idempotency key; a retried booking with the same key
    /// returns the original contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A contract together with its status as observed now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContractView {
    #[serde(flatten)]
    pub contract: HireContract,
    pub effective_status: HireStatus,
}

impl ContractView {
    pub fn at(contract: HireContract, now: DateTime<Utc>) -> Self {
        let effective_status = contract.effective_status(now);
        Self {
            contract,
            effective_status,
        }
    }
}

/// Result of a successful booking.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HireReceipt {
    pub contract: ContractView,
    /// The HIRE ledger entry that moved the funds
    pub payment: LedgerEntry,
}

/// Result of a successful cancellation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CancellationReceipt {
    pub contract: ContractView,
    /// The REFUND ledger entry that returned the funds
    pub refund: LedgerEntry,
}

/// Which side of a contract a history listing is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HireRole {
    #[default]
    Hirer,
    Player,
}

/// Query parameters for hire history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct HireHistoryQuery {
    #[serde(default)]
    pub role: HireRole,
}

// ─────────────────────────────────────────────────────────────────────────────
// Review DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to review a finished contract.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    /// 0 to 5
    #[schema(example = 5)]
    pub rating: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Query parameters for player statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StatsQuery {
    #[serde(default)]
    pub period: StatsPeriod,
}
