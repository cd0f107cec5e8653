//! In-memory store adapter.
//!
//! Balances live in an arena keyed by account id, one `tokio::sync::Mutex`
//! per account. Multi-account operations lock accounts in ascending id order,
//! then the contract table, then the ledger, then the reviews. Every check
//! runs under the locks that its write needs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use hire_types::{
    Account, AccountId, ContractId, ContractQuery, ContractStore, CreateAccountRequest,
    DomainError, EntryStatus, HireBooking, HireContract, Ledger, LedgerEntry, LedgerEntryId,
    LedgerQuery, Money, Rating, RepoError, Review, ReviewStore, StatusChange, WalletStore,
};

use crate::settlement;

type AccountGuard = OwnedMutexGuard<Account>;

#[derive(Default)]
struct LedgerTable {
    entries: Vec<LedgerEntry>,
    by_id: HashMap<LedgerEntryId, usize>,
    /// Keys are scoped to the owning account
    by_key: HashMap<(AccountId, String), LedgerEntryId>,
}

impl LedgerTable {
    fn get(&self, id: LedgerEntryId) -> Option<&LedgerEntry> {
        self.by_id.get(&id).map(|&i| &self.entries[i])
    }

    fn find_by_key(&self, account_id: AccountId, key: &str) -> Option<&LedgerEntry> {
        self.by_key
            .get(&(account_id, key.to_string()))
            .and_then(|id| self.get(*id))
    }

    fn replay(&self, candidate: &LedgerEntry) -> Result<Option<LedgerEntry>, DomainError> {
        let stored = candidate
            .idempotency_key
            .as_deref()
            .and_then(|key| self.find_by_key(candidate.account_id, key))
            .cloned();
        settlement::replay(stored, candidate)
    }

    fn insert(&mut self, entry: LedgerEntry) {
        if let Some(key) = &entry.idempotency_key {
            self.by_key.insert((entry.account_id, key.clone()), entry.id);
        }
        self.by_id.insert(entry.id, self.entries.len());
        self.entries.push(entry);
    }

    fn replace(&mut self, entry: LedgerEntry) {
        if let Some(&i) = self.by_id.get(&entry.id) {
            self.entries[i] = entry;
        }
    }
}

/// In-memory implementation of every store port.
#[derive(Default)]
pub struct MemoryRepo {
    accounts: DashMap<AccountId, Arc<Mutex<Account>>>,
    usernames: DashMap<String, AccountId>,
    contracts: RwLock<HashMap<ContractId, HireContract>>,
    ledger: RwLock<LedgerTable>,
    reviews: RwLock<HashMap<ContractId, Review>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, id: AccountId) -> Result<Arc<Mutex<Account>>, RepoError> {
        self.accounts
            .get(&id)
            .map(|a| Arc::clone(a.value()))
            .ok_or(RepoError::Domain(DomainError::NotFound("Account")))
    }

    async fn lock(&self, id: AccountId) -> Result<AccountGuard, RepoError> {
        Ok(self.handle(id)?.lock_owned().await)
    }

    /// Locks two distinct accounts in ascending id order. Guards come back in
    /// argument order.
    async fn lock_pair(
        &self,
        a: AccountId,
        b: AccountId,
    ) -> Result<(AccountGuard, AccountGuard), RepoError> {
        if a == b {
            return Err(DomainError::Validation(
                "Source and destination accounts must differ".into(),
            )
            .into());
        }
        let (ha, hb) = (self.handle(a)?, self.handle(b)?);
        if a < b {
            let ga = ha.lock_owned().await;
            let gb = hb.lock_owned().await;
            Ok((ga, gb))
        } else {
            let gb = hb.lock_owned().await;
            let ga = ha.lock_owned().await;
            Ok((ga, gb))
        }
    }
}

fn newest_first<T, F>(items: &mut [T], created_at: F)
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Wallet store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl WalletStore for MemoryRepo {
    async fn create_account(&self, req: CreateAccountRequest) -> Result<Account, RepoError> {
        let account = Account::new(req.username, req.currency)?;

        match self.usernames.entry(account.username.clone()) {
            Entry::Occupied(_) => Err(DomainError::Validation(format!(
                "Username '{}' is already taken",
                account.username
            ))
            .into()),
            Entry::Vacant(slot) => {
                self.accounts
                    .insert(account.id, Arc::new(Mutex::new(account.clone())));
                slot.insert(account.id);
                Ok(account)
            }
        }
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepoError> {
        let Some(handle) = self.accounts.get(&id).map(|a| Arc::clone(a.value())) else {
            return Ok(None);
        };
        let account = handle.lock().await.clone();
        Ok(Some(account))
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, RepoError> {
        let Some(id) = self.usernames.get(username.trim()).map(|id| *id) else {
            return Ok(None);
        };
        self.get_account(id).await
    }

    async fn credit(&self, id: AccountId, amount: Money) -> Result<Account, RepoError> {
        let mut account = self.lock(id).await?;
        account.credit(amount)?;
        Ok(account.clone())
    }

    async fn debit(&self, id: AccountId, amount: Money) -> Result<Account, RepoError> {
        let mut account = self.lock(id).await?;
        account.debit(amount)?;
        Ok(account.clone())
    }

    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Money,
    ) -> Result<(Account, Account), RepoError> {
        let (mut from_guard, mut to_guard) = self.lock_pair(from, to).await?;
        let (from_next, to_next) = settlement::transfer(&from_guard, &to_guard, amount)?;
        *from_guard = from_next.clone();
        *to_guard = to_next.clone();
        Ok((from_next, to_next))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ledger
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl Ledger for MemoryRepo {
    async fn record(&self, entry: LedgerEntry) -> Result<LedgerEntry, RepoError> {
        settlement::ensure_external_kind(&entry)?;
        if entry.status != EntryStatus::Pending {
            return Err(DomainError::Validation("Recorded entries must be PENDING".into()).into());
        }
        self.handle(entry.account_id)?;

        let mut ledger = self.ledger.write().await;
        if let Some(existing) = ledger.replay(&entry)? {
            return Ok(existing);
        }
        ledger.insert(entry.clone());
        Ok(entry)
    }

    async fn post(&self, entry: LedgerEntry) -> Result<LedgerEntry, RepoError> {
        settlement::ensure_external_kind(&entry)?;
        if entry.status != EntryStatus::Completed {
            return Err(DomainError::Validation("Posted entries must be COMPLETED".into()).into());
        }

        let mut account = self.lock(entry.account_id).await?;
        let mut ledger = self.ledger.write().await;
        if let Some(existing) = ledger.replay(&entry)? {
            return Ok(existing);
        }

        let next = settlement::apply(&account, entry.settlement_direction(), entry.amount)?;
        *account = next;
        ledger.insert(entry.clone());
        Ok(entry)
    }

    async fn transition(
        &self,
        id: LedgerEntryId,
        change: StatusChange,
    ) -> Result<LedgerEntry, RepoError> {
        // The owner never changes, so it is safe to read it before locking.
        let owner = self
            .ledger
            .read()
            .await
            .get(id)
            .map(|e| e.account_id)
            .ok_or(RepoError::Domain(DomainError::NotFound("Payment")))?;

        let mut account = self.lock(owner).await?;
        let mut ledger = self.ledger.write().await;
        let mut entry = ledger
            .get(id)
            .cloned()
            .ok_or(RepoError::Domain(DomainError::NotFound("Payment")))?;

        let effect = entry.apply(&change)?;
        if let Some(direction) = effect {
            *account = settlement::apply(&account, direction, entry.amount)?;
        }
        ledger.replace(entry.clone());
        Ok(entry)
    }

    async fn get_entry(&self, id: LedgerEntryId) -> Result<Option<LedgerEntry>, RepoError> {
        Ok(self.ledger.read().await.get(id).cloned())
    }

    async fn find_by_idempotency_key(
        &self,
        account_id: AccountId,
        key: &str,
    ) -> Result<Option<LedgerEntry>, RepoError> {
        Ok(self
            .ledger
            .read()
            .await
            .find_by_key(account_id, key)
            .cloned())
    }

    async fn list_entries(&self, query: LedgerQuery) -> Result<Vec<LedgerEntry>, RepoError> {
        let ledger = self.ledger.read().await;
        let mut entries: Vec<LedgerEntry> = ledger
            .entries
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        newest_first(&mut entries, |e| e.created_at);
        Ok(entries)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hire contracts
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ContractStore for MemoryRepo {
    async fn book_hire(
        &self,
        booking: HireBooking,
    ) -> Result<(HireContract, LedgerEntry), RepoError> {
        if booking.hirer_id == booking.player_id {
            return Err(settlement::self_hire().into());
        }

        let (mut hirer, mut player) = self.lock_pair(booking.hirer_id, booking.player_id).await?;
        let mut contracts = self.contracts.write().await;
        let mut ledger = self.ledger.write().await;

        let amount = Money::positive(booking.amount, hirer.currency())?;
        if player.currency() != hirer.currency() {
            return Err(DomainError::CurrencyMismatch {
                expected: hirer.currency(),
                got: player.currency(),
            }
            .into());
        }

        let entry = LedgerEntry::hire(booking.hirer_id, booking.player_id, amount, booking.now)
            .with_id(booking.entry_id)
            .with_idempotency_key(booking.idempotency_key)
            .with_description(booking.description);

        if let Some(stored) = ledger.replay(&entry)? {
            let contract = contracts
                .values()
                .find(|c| c.ledger_entry_id == stored.id)
                .cloned()
                .ok_or(RepoError::Domain(DomainError::NotFound("Contract")))?;
            return Ok((contract, stored));
        }

        let contract = HireContract::book(
            booking.hirer_id,
            booking.player_id,
            amount,
            booking.start_time,
            booking.end_time,
            entry.id,
            booking.now,
        )?;

        let clash = contracts.values().any(|c| {
            c.player_id == booking.player_id
                && c.overlaps(contract.start_time, contract.end_time, booking.now)
        });
        if clash {
            return Err(DomainError::PlayerUnavailable.into());
        }

        let (hirer_next, player_next) = settlement::transfer(&hirer, &player, amount)?;
        *hirer = hirer_next;
        *player = player_next;
        contracts.insert(contract.id, contract.clone());
        ledger.insert(entry.clone());

        Ok((contract, entry))
    }

    async fn cancel_hire(
        &self,
        id: ContractId,
        requester: AccountId,
        now: DateTime<Utc>,
    ) -> Result<(HireContract, LedgerEntry), RepoError> {
        let (hirer_id, player_id) = self
            .contracts
            .read()
            .await
            .get(&id)
            .map(|c| (c.hirer_id, c.player_id))
            .ok_or(RepoError::Domain(DomainError::NotFound("Contract")))?;

        let (mut hirer, mut player) = self.lock_pair(hirer_id, player_id).await?;
        let mut contracts = self.contracts.write().await;
        let mut ledger = self.ledger.write().await;

        let mut contract = contracts
            .get(&id)
            .cloned()
            .ok_or(RepoError::Domain(DomainError::NotFound("Contract")))?;
        contract.cancel(requester, now)?;

        let mut hire_entry = ledger
            .get(contract.ledger_entry_id)
            .cloned()
            .ok_or(RepoError::Domain(DomainError::NotFound("Payment")))?;
        hire_entry.transition(EntryStatus::Refunded, now)?;

        let (player_next, hirer_next) =
            settlement::reverse_hire(&player, &hirer, contract.amount)?;

        let refund = LedgerEntry::refund(hirer_id, player_id, contract.amount, now)
            .with_description(Some(format!("Refund for canceled hire {id}")));

        *player = player_next;
        *hirer = hirer_next;
        contracts.insert(contract.id, contract.clone());
        ledger.replace(hire_entry);
        ledger.insert(refund.clone());

        Ok((contract, refund))
    }

    async fn get_contract(&self, id: ContractId) -> Result<Option<HireContract>, RepoError> {
        Ok(self.contracts.read().await.get(&id).cloned())
    }

    async fn list_contracts(&self, query: ContractQuery) -> Result<Vec<HireContract>, RepoError> {
        let mut contracts: Vec<HireContract> = self
            .contracts
            .read()
            .await
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        newest_first(&mut contracts, |c| c.created_at);
        Ok(contracts)
    }

    async fn settle_elapsed(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let mut contracts = self.contracts.write().await;
        let settled = contracts
            .values_mut()
            .map(|c| c.settle_if_elapsed(now))
            .filter(|changed| *changed)
            .count();
        Ok(settled as u64)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reviews
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ReviewStore for MemoryRepo {
    async fn submit_review(
        &self,
        contract_id: ContractId,
        reviewer_id: AccountId,
        rating: Rating,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Review, RepoError> {
        let contracts = self.contracts.read().await;
        let mut reviews = self.reviews.write().await;

        let contract = contracts
            .get(&contract_id)
            .ok_or(RepoError::Domain(DomainError::NotFound("Contract")))?;
        let review = Review::for_contract(contract, reviewer_id, rating, comment, now)?;

        if reviews.contains_key(&contract_id) {
            return Err(DomainError::AlreadyReviewed.into());
        }
        reviews.insert(contract_id, review.clone());
        Ok(review)
    }

    async fn get_review_for_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<Option<Review>, RepoError> {
        Ok(self.reviews.read().await.get(&contract_id).cloned())
    }

    async fn list_reviews_for_player(
        &self,
        player_id: AccountId,
    ) -> Result<Vec<Review>, RepoError> {
        let mut reviews: Vec<Review> = self
            .reviews
            .read()
            .await
            .values()
            .filter(|r| r.player_id == player_id)
            .cloned()
            .collect();
        newest_first(&mut reviews, |r| r.created_at);
        Ok(reviews)
    }
}
