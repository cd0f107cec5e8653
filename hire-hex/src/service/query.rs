//! Query Façade: read-only payment and hire projections, newest first.

use chrono::{DateTime, Utc};
use hire_types::{
    AccountId, AppError, ContractQuery, ContractView, DomainError, EntryKind, EntryStatus,
    HireRole, LedgerEntry, LedgerQuery, MarketRepository, PaymentFilter,
};

use super::MarketService;

impl<R: MarketRepository> MarketService<R> {
    /// Entries owned by an account.
    pub async fn payments_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        self.account_entries(account_id, LedgerQuery::default()).await
    }

    /// Entries where the account is the counter-party (hire payments received,
    /// refunds paid back).
    pub async fn payments_received_by(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        self.get_account(account_id).await?;
        Ok(self
            .repo
            .list_entries(LedgerQuery {
                counterparty_id: Some(account_id),
                ..Default::default()
            })
            .await?)
    }

    pub async fn payments_by_status(
        &self,
        status: EntryStatus,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        self.search_payments(PaymentFilter {
            status: Some(status),
            ..Default::default()
        })
        .await
    }

    /// Entries created within `[start, end]`.
    pub async fn payments_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        self.search_payments(PaymentFilter {
            from: Some(start),
            to: Some(end),
            ..Default::default()
        })
        .await
    }

    pub async fn payments_for_account_with_status(
        &self,
        account_id: AccountId,
        status: EntryStatus,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        self.payments_for_account_matching(
            account_id,
            PaymentFilter {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn payments_for_account_of_kind(
        &self,
        account_id: AccountId,
        kind: EntryKind,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        self.payments_for_account_matching(
            account_id,
            PaymentFilter {
                kind: Some(kind),
                ..Default::default()
            },
        )
        .await
    }

    /// Entries owned by an account that pass every filter.
    pub async fn payments_for_account_matching(
        &self,
        account_id: AccountId,
        filter: PaymentFilter,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let query = ledger_query(&filter)?;
        self.account_entries(account_id, query).await
    }

    /// Ledger-wide listing. All filters combine with AND.
    pub async fn search_payments(&self, filter: PaymentFilter) -> Result<Vec<LedgerEntry>, AppError> {
        let query = ledger_query(&filter)?;
        Ok(self.repo.list_entries(query).await?)
    }

    pub async fn hires_as_hirer(&self, account_id: AccountId) -> Result<Vec<ContractView>, AppError> {
        self.hire_history(account_id, HireRole::Hirer).await
    }

    pub async fn hires_as_player(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<ContractView>, AppError> {
        self.hire_history(account_id, HireRole::Player).await
    }

    /// Contracts on one side of an account, with effective status at now.
    pub async fn hire_history(
        &self,
        account_id: AccountId,
        role: HireRole,
    ) -> Result<Vec<ContractView>, AppError> {
        let now = self.now();
        self.get_account(account_id).await?;

        let query = match role {
            HireRole::Hirer => ContractQuery {
                hirer_id: Some(account_id),
                ..Default::default()
            },
            HireRole::Player => ContractQuery {
                player_id: Some(account_id),
                ..Default::default()
            },
        };
        let contracts = self.repo.list_contracts(query).await?;
        Ok(contracts
            .into_iter()
            .map(|c| ContractView::at(c, now))
            .collect())
    }

    async fn account_entries(
        &self,
        account_id: AccountId,
        query: LedgerQuery,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        self.get_account(account_id).await?;
        Ok(self
            .repo
            .list_entries(LedgerQuery {
                account_id: Some(account_id),
                ..query
            })
            .await?)
    }
}

fn ledger_query(filter: &PaymentFilter) -> Result<LedgerQuery, AppError> {
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(DomainError::InvalidTimeRange.into());
        }
    }
    Ok(LedgerQuery {
        status: filter.status,
        kind: filter.kind,
        created_from: filter.from,
        created_to: filter.to,
        ..Default::default()
    })
}
