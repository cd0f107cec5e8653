//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod clock;
mod contracts;
mod ledger;
mod notifier;
mod reviews;
mod wallet;

pub use clock::{Clock, ManualClock, SystemClock};
pub use contracts::{ContractQuery, ContractStore, HireBooking};
pub use ledger::{Ledger, LedgerQuery};
pub use notifier::{NotificationKind, Notifier, NotifyError};
pub use reviews::ReviewStore;
pub use wallet::WalletStore;

/// Everything the application service needs from a store.
///
/// Implemented automatically for any type that implements all four store ports.
pub trait MarketRepository: WalletStore + Ledger + ContractStore + ReviewStore {}

impl<T> MarketRepository for T where T: WalletStore + Ledger + ContractStore + ReviewStore {}
