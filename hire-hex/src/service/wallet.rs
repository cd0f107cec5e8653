//! Wallet flows: top-ups, withdrawals and the payment lifecycle.

use chrono::{DateTime, Utc};
use hire_types::{
    AppError, EntryKind, LedgerEntry, LedgerEntryId, MarketRepository, Money, NotificationKind,
    StatusChange, TopUpRequest, WithdrawRequest,
};
use serde_json::json;

use super::MarketService;

impl<R: MarketRepository> MarketService<R> {
    /// Credits a wallet and records a COMPLETED TOPUP entry in one step.
    ///
    /// A retried request with the same idempotency key returns the original
    /// entry without crediting again.
    #[tracing::instrument(skip(self, req), fields(account_id = %req.account_id, amount = req.amount))]
    pub async fn top_up(&self, req: TopUpRequest) -> Result<LedgerEntry, AppError> {
        let now = self.now();
        let entry = self.top_up_entry(&req, now).await?.completed_at(now);
        let built = entry.id;

        let posted = self.repo.post(entry).await?;
        if posted.id == built {
            tracing::info!(entry_id = %posted.id, "top-up completed");
            self.notify(
                posted.account_id,
                NotificationKind::TopUpCompleted,
                payment_payload(&posted),
            )
            .await;
        }
        Ok(posted)
    }

    /// Records a PENDING TOPUP awaiting confirmation by the payment gateway.
    /// No funds move until [`MarketService::confirm_payment`].
    #[tracing::instrument(skip(self, req), fields(account_id = %req.account_id, amount = req.amount))]
    pub async fn request_top_up(&self, req: TopUpRequest) -> Result<LedgerEntry, AppError> {
        let now = self.now();
        let entry = self.top_up_entry(&req, now).await?;
        let recorded = self.repo.record(entry).await?;
        tracing::info!(entry_id = %recorded.id, "top-up pending");
        Ok(recorded)
    }

    /// Debits a wallet and records a COMPLETED WITHDRAW entry in one step.
    #[tracing::instrument(skip(self, req), fields(account_id = %req.account_id, amount = req.amount))]
    pub async fn withdraw(&self, req: WithdrawRequest) -> Result<LedgerEntry, AppError> {
        let now = self.now();
        let account = self.get_account(req.account_id).await?;
        let amount = Money::positive(req.amount, account.currency())?;

        let entry = LedgerEntry::pending(
            EntryKind::Withdraw,
            account.id,
            None,
            amount,
            req.payment_method,
            now,
        )
        .completed_at(now)
        .with_idempotency_key(req.idempotency_key)
        .with_description(req.description);
        let built = entry.id;

        let posted = self.repo.post(entry).await?;
        if posted.id == built {
            tracing::info!(entry_id = %posted.id, "withdrawal completed");
            self.notify(
                posted.account_id,
                NotificationKind::WithdrawCompleted,
                payment_payload(&posted),
            )
            .await;
        }
        Ok(posted)
    }

    /// PENDING -> COMPLETED. Applies the entry's balance effect and stores
    /// the gateway reference.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_payment(
        &self,
        id: LedgerEntryId,
        external_ref: Option<String>,
    ) -> Result<LedgerEntry, AppError> {
        let entry = self
            .repo
            .transition(id, StatusChange::complete(external_ref, self.now()))
            .await?;

        let kind = match entry.kind {
            EntryKind::Withdraw => NotificationKind::WithdrawCompleted,
            _ => NotificationKind::TopUpCompleted,
        };
        self.notify(entry.account_id, kind, payment_payload(&entry))
            .await;
        Ok(entry)
    }

    /// PENDING -> FAILED. No funds move.
    #[tracing::instrument(skip(self))]
    pub async fn fail_payment(
        &self,
        id: LedgerEntryId,
        reason: String,
    ) -> Result<LedgerEntry, AppError> {
        let entry = self
            .repo
            .transition(id, StatusChange::fail(reason, self.now()))
            .await?;
        tracing::info!(entry_id = %entry.id, "payment failed");
        self.notify(
            entry.account_id,
            NotificationKind::PaymentFailed,
            payment_payload(&entry),
        )
        .await;
        Ok(entry)
    }

    /// COMPLETED -> REFUNDED for TOPUP and WITHDRAW entries, reversing the
    /// balance effect. HIRE payments are refunded by canceling the contract.
    #[tracing::instrument(skip(self))]
    pub async fn refund_payment(
        &self,
        id: LedgerEntryId,
        reason: String,
    ) -> Result<LedgerEntry, AppError> {
        let entry = self
            .repo
            .transition(id, StatusChange::refund(reason, self.now()))
            .await?;
        tracing::info!(entry_id = %entry.id, kind = %entry.kind, "payment refunded");
        self.notify(
            entry.account_id,
            NotificationKind::PaymentRefunded,
            payment_payload(&entry),
        )
        .await;
        Ok(entry)
    }

    async fn top_up_entry(
        &self,
        req: &TopUpRequest,
        now: DateTime<Utc>,
    ) -> Result<LedgerEntry, AppError> {
        let account = self.get_account(req.account_id).await?;
        let amount = Money::positive(req.amount, account.currency())?;

        let entry = LedgerEntry::pending(
            EntryKind::TopUp,
            account.id,
            None,
            amount,
            req.payment_method.clone(),
            now,
        );
        Ok(entry
            .with_external_ref(req.external_ref.clone())
            .with_idempotency_key(req.idempotency_key.clone())
            .with_description(req.description.clone()))
    }
}

fn payment_payload(entry: &LedgerEntry) -> serde_json::Value {
    json!({
        "payment_id": entry.id,
        "kind": entry.kind,
        "status": entry.status,
        "amount": entry.amount.amount(),
        "currency": entry.amount.currency(),
        "payment_method": entry.payment_method,
    })
}
