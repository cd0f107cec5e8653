//! Error types for the hire marketplace.

use crate::domain::{Currency, EntryStatus};

/// Domain-level errors (business rule violations).
///
/// Every variant is surfaced to the caller unmodified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Amount must be strictly positive")]
    InvalidAmount,

    #[error("Start time must be before end time")]
    InvalidTimeRange,

    #[error("Start time is in the past")]
    TimeInPast,

    #[error("Player already has an active hire overlapping the requested window")]
    PlayerUnavailable,

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: i64, requested: i64 },

    #[error("Player cannot return the hire amount: available {available}, required {required}")]
    PlayerInsufficientFunds { available: i64, required: i64 },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Requester is not allowed to perform this action")]
    Forbidden,

    #[error("Contract is not active")]
    NotActive,

    #[error("Contract has already started")]
    AlreadyStarted,

    #[error("Contract has not ended yet")]
    ContractNotEnded,

    #[error("Contract has already been reviewed")]
    AlreadyReviewed,

    #[error("Rating must be between 0 and 5, got {0}")]
    InvalidRating(i32),

    #[error("Idempotency key was already used for a different request")]
    IdempotencyKeyReused,

    #[error("Invalid payment status transition: {from} -> {to}")]
    InvalidTransition { from: EntryStatus, to: EntryStatus },

    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: Currency, got: Currency },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl DomainError {
    /// Stable machine-readable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidAmount => "INVALID_AMOUNT",
            DomainError::InvalidTimeRange => "INVALID_TIME_RANGE",
            DomainError::TimeInPast => "TIME_IN_PAST",
            DomainError::PlayerUnavailable => "PLAYER_UNAVAILABLE",
            DomainError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            DomainError::PlayerInsufficientFunds { .. } => "PLAYER_INSUFFICIENT_FUNDS",
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::Forbidden => "FORBIDDEN",
            DomainError::NotActive => "NOT_ACTIVE",
            DomainError::AlreadyStarted => "ALREADY_STARTED",
            DomainError::ContractNotEnded => "CONTRACT_NOT_ENDED",
            DomainError::AlreadyReviewed => "ALREADY_REVIEWED",
            DomainError::InvalidRating(_) => "INVALID_RATING",
            DomainError::IdempotencyKeyReused => "IDEMPOTENCY_KEY_REUSED",
            DomainError::InvalidTransition { .. } => "INVALID_TRANSITION",
            DomainError::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            DomainError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,
}

/// Application-level errors returned by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A business rule rejected the request.
    #[error(transparent)]
    Rejected(#[from] DomainError),

    /// The store could not complete the request. Safe to retry with the
    /// same idempotency key.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Rejected(e) => e.code(),
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => AppError::Rejected(e),
            RepoError::NotFound => AppError::Rejected(DomainError::NotFound("Resource")),
            RepoError::Database(e) => AppError::StoreUnavailable(e),
            RepoError::Transaction(e) => AppError::StoreUnavailable(e),
        }
    }
}
