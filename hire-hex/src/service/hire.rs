//! Hire Contract Manager: booking, cancellation and lazy completion.

use hire_types::{
    AccountId, AppError, BookHireRequest, CancellationReceipt, ContractId, ContractView,
    DomainError, HireBooking, HireContract, HireReceipt, LedgerEntryId, MarketRepository,
    NotificationKind,
};
use serde_json::json;

use super::MarketService;

impl<R: MarketRepository> MarketService<R> {
    /// Books `req.player_id` for the requested window, paying immediately.
    ///
    /// The overlap check, the balance check and every write happen inside one
    /// store operation. A retry carrying the same idempotency key returns the
    /// original contract without moving funds again.
    #[tracing::instrument(skip(self, req), fields(%hirer_id, player_id = %req.player_id, amount = req.amount))]
    pub async fn book_hire(
        &self,
        hirer_id: AccountId,
        req: BookHireRequest,
    ) -> Result<HireReceipt, AppError> {
        let now = self.now();
        if hirer_id == req.player_id {
            return Err(DomainError::Validation("A player cannot hire themselves".into()).into());
        }
        if req.amount <= 0 {
            return Err(DomainError::InvalidAmount.into());
        }
        HireContract::validate_window(req.start_time, req.end_time, now)?;

        let entry_id = LedgerEntryId::new();
        let (contract, payment) = self
            .repo
            .book_hire(HireBooking {
                hirer_id,
                player_id: req.player_id,
                amount: req.amount,
                start_time: req.start_time,
                end_time: req.end_time,
                idempotency_key: req.idempotency_key,
                entry_id,
                description: req.description,
                now,
            })
            .await?;

        if payment.id == entry_id {
            tracing::info!(contract_id = %contract.id, payment_id = %payment.id, "hire booked");
            let payload = contract_payload(&contract);
            self.notify(contract.hirer_id, NotificationKind::HireBooked, payload.clone())
                .await;
            self.notify(contract.player_id, NotificationKind::HireBooked, payload)
                .await;
        }

        Ok(HireReceipt {
            contract: ContractView::at(contract, now),
            payment,
        })
    }

    /// Cancels a contract before it starts and returns the funds to the hirer.
    ///
    /// Fails with `PlayerInsufficientFunds` if the player has already spent
    /// the payment; nothing changes in that case.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_hire(
        &self,
        contract_id: ContractId,
        requester: AccountId,
    ) -> Result<CancellationReceipt, AppError> {
        let now = self.now();
        let (contract, refund) = match self.repo.cancel_hire(contract_id, requester, now).await {
            Ok(done) => done,
            Err(e) => {
                tracing::warn!(error = %e, "cancellation rolled back");
                return Err(e.into());
            }
        };

        tracing::info!(refund_id = %refund.id, "hire canceled");
        let payload = contract_payload(&contract);
        self.notify(contract.hirer_id, NotificationKind::HireCanceled, payload.clone())
            .await;
        self.notify(contract.player_id, NotificationKind::HireCanceled, payload)
            .await;

        Ok(CancellationReceipt {
            contract: ContractView::at(contract, now),
            refund,
        })
    }

    /// Gets a contract with its status as observed now.
    pub async fn get_contract(&self, contract_id: ContractId) -> Result<ContractView, AppError> {
        let now = self.now();
        let contract = self.load_contract(contract_id).await?;
        Ok(ContractView::at(contract, now))
    }

    /// Lazy completion check. Never writes; two calls at the same instant agree.
    pub async fn complete_if_elapsed(
        &self,
        contract_id: ContractId,
    ) -> Result<ContractView, AppError> {
        self.get_contract(contract_id).await
    }

    /// Persists COMPLETED for every elapsed ACTIVE contract. Returns how many
    /// contracts changed.
    #[tracing::instrument(skip(self))]
    pub async fn settle_elapsed(&self) -> Result<u64, AppError> {
        let settled = self.repo.settle_elapsed(self.now()).await?;
        if settled > 0 {
            tracing::info!(settled, "elapsed contracts settled");
        }
        Ok(settled)
    }

    pub(super) async fn load_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<HireContract, AppError> {
        self.repo
            .get_contract(contract_id)
            .await?
            .ok_or(AppError::Rejected(DomainError::NotFound("Contract")))
    }
}

fn contract_payload(contract: &HireContract) -> serde_json::Value {
    json!({
        "contract_id": contract.id,
        "hirer_id": contract.hirer_id,
        "player_id": contract.player_id,
        "amount": contract.amount.amount(),
        "currency": contract.amount.currency(),
        "start_time": contract.start_time,
        "end_time": contract.end_time,
        "status": contract.status,
    })
}
