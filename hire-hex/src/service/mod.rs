//! Market Application Service
//!
//! Orchestrates domain operations through the store ports.
//! Contains NO infrastructure logic - pure business orchestration.
//!
//! Every operation reads the clock once and hands that instant to the store,
//! so a rule's check and its write agree on "now". Notifications go out
//! after the store has committed.

mod hire;
mod query;
mod review;
mod wallet;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hire_types::{
    Account, AccountId, AccountRef, AppError, Clock, CreateAccountRequest, DomainError,
    MarketRepository, NotificationKind, Notifier, SystemClock,
};

use crate::outbound::LogNotifier;

/// Application service for the hire marketplace.
///
/// Generic over `R: MarketRepository` - the store is injected at compile time.
/// The clock and notifier are injected at run time so tests can drive time
/// and observe notifications.
pub struct MarketService<R: MarketRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl<R: MarketRepository> MarketService<R> {
    /// Creates a service on the system clock that only logs notifications.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Returns a reference to the underlying store.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fire-and-forget: a failed notification is logged, never returned.
    async fn notify(
        &self,
        account_id: AccountId,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) {
        if let Err(e) = self.notifier.notify(account_id, kind, payload).await {
            tracing::warn!(%account_id, %kind, error = %e, "notification failed");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Accounts & identity
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers the wallet side of a user.
    #[tracing::instrument(skip(self, req), fields(username = %req.username))]
    pub async fn create_account(&self, req: CreateAccountRequest) -> Result<Account, AppError> {
        let account = self.repo.create_account(req).await?;
        tracing::info!(account_id = %account.id, "account opened");
        Ok(account)
    }

    /// Gets an account by ID.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, AppError> {
        self.repo
            .get_account(id)
            .await?
            .ok_or(AppError::Rejected(DomainError::NotFound("Account")))
    }

    /// Gets an account by ID or username.
    pub async fn find_account(&self, account: AccountRef) -> Result<Account, AppError> {
        match account {
            AccountRef::Id(id) => self.get_account(id).await,
            AccountRef::Username(username) => self
                .repo
                .find_account_by_username(&username)
                .await?
                .ok_or(AppError::Rejected(DomainError::NotFound("Account"))),
        }
    }

    /// Resolves a user reference to its wallet id.
    pub async fn resolve_account(&self, account: AccountRef) -> Result<AccountId, AppError> {
        Ok(self.find_account(account).await?.id)
    }
}
