//! # Hire Types
//!
//! Domain types and port traits for the hire marketplace wallet ledger.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Money, Account, LedgerEntry, HireContract, Review)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Account, AccountId, ContractId, Currency, Direction, EntryKind, EntryStatus, HireContract,
    HireStats, HireStatus, LedgerEntry, LedgerEntryId, Money, PlayerStats, Rating, Review,
    ReviewId, StatsPeriod, StatusChange, WALLET_METHOD,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    Clock, ContractQuery, ContractStore, HireBooking, Ledger, LedgerQuery, ManualClock,
    MarketRepository, NotificationKind, Notifier, NotifyError, ReviewStore, SystemClock,
    WalletStore,
};
