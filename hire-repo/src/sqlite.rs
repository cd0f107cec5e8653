//! SQLite repository adapter.
//!
//! Every mutating operation runs in one transaction whose first statement is
//! a write, so the database write lock is held before any check is read. The
//! check and the write it guards therefore see no concurrent writer.
#![allow(clippy::collapsible_if)]

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction};

use hire_types::{
    Account, AccountId, ContractId, ContractQuery, ContractStore, CreateAccountRequest,
    Direction, DomainError, EntryStatus, HireBooking, HireContract, HireStatus, Ledger, LedgerEntry,
    LedgerEntryId, LedgerQuery, Money, Rating, RepoError, Review, ReviewStore, StatusChange,
    WalletStore,
};

use crate::settlement;
use crate::types::{DbAccount, DbHireContract, DbLedgerEntry, DbReview, opt_ts, ts};

const ACCOUNT_COLUMNS: &str = "id, username, balance, currency, created_at";
const ENTRY_COLUMNS: &str = "id, account_id, counterparty_id, amount, currency, kind, status, \
     payment_method, external_ref, idempotency_key, description, created_at, completed_at";
const CONTRACT_COLUMNS: &str = "id, hirer_id, player_id, amount, currency, start_time, end_time, \
     status, ledger_entry_id, created_at, canceled_at";
const REVIEW_COLUMNS: &str = "id, contract_id, player_id, reviewer_id, rating, comment, created_at";

fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

fn tx_err(e: sqlx::Error) -> RepoError {
    RepoError::Transaction(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        // Ensure on-disk SQLite target directory exists.
        if !in_memory {
            if let Some(path) = database_url.strip_prefix("sqlite://") {
                let path = path.split('?').next().unwrap_or(path);
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        // Each connection to `:memory:` is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        tracing::debug!(in_memory, "sqlite store ready");
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema. Safe to run repeatedly.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::raw_sql(ddl).execute(&self.pool).await.map_err(db_err)?;
        Ok(())
    }

    /// Begins a transaction holding the database write lock.
    async fn begin_write(&self) -> Result<Transaction<'_, Sqlite>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(tx_err)?;
        sqlx::query("UPDATE accounts SET balance = balance WHERE 0")
            .execute(&mut *tx)
            .await
            .map_err(tx_err)?;
        Ok(tx)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row helpers (run inside a transaction)
// ─────────────────────────────────────────────────────────────────────────────

async fn load_account(conn: &mut SqliteConnection, id: AccountId) -> Result<Account, RepoError> {
    let row: Option<DbAccount> =
        sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err)?;
    row.ok_or(RepoError::Domain(DomainError::NotFound("Account")))?
        .into_domain()
}

async fn store_balance(conn: &mut SqliteConnection, account: &Account) -> Result<(), RepoError> {
    sqlx::query("UPDATE accounts SET balance = ? WHERE id = ?")
        .bind(account.balance.amount())
        .bind(account.id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

async fn load_entry(
    conn: &mut SqliteConnection,
    id: LedgerEntryId,
) -> Result<Option<LedgerEntry>, RepoError> {
    let row: Option<DbLedgerEntry> =
        sqlx::query_as(&format!("SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err)?;
    row.map(DbLedgerEntry::into_domain).transpose()
}

async fn entry_by_key(
    conn: &mut SqliteConnection,
    account_id: AccountId,
    key: &str,
) -> Result<Option<LedgerEntry>, RepoError> {
    let row: Option<DbLedgerEntry> = sqlx::query_as(&format!(
        "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE account_id = ? AND idempotency_key = ?"
    ))
    .bind(account_id.to_string())
    .bind(key)
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_err)?;
    row.map(DbLedgerEntry::into_domain).transpose()
}

/// The stored entry a keyed write replays, if any.
async fn replay(
    conn: &mut SqliteConnection,
    candidate: &LedgerEntry,
) -> Result<Option<LedgerEntry>, RepoError> {
    let Some(key) = candidate.idempotency_key.as_deref() else {
        return Ok(None);
    };
    let stored = entry_by_key(conn, candidate.account_id, key).await?;
    Ok(settlement::replay(stored, candidate)?)
}

async fn insert_entry(conn: &mut SqliteConnection, entry: &LedgerEntry) -> Result<(), RepoError> {
    sqlx::query(
        r#"INSERT INTO ledger_entries (id, account_id, counterparty_id, amount, currency, kind, status,
               payment_method, external_ref, idempotency_key, description, created_at, completed_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(entry.id.to_string())
    .bind(entry.account_id.to_string())
    .bind(entry.counterparty_id.map(|id| id.to_string()))
    .bind(entry.amount.amount())
    .bind(entry.amount.currency().to_string())
    .bind(entry.kind.as_str())
    .bind(entry.status.as_str())
    .bind(&entry.payment_method)
    .bind(&entry.external_ref)
    .bind(&entry.idempotency_key)
    .bind(&entry.description)
    .bind(ts(entry.created_at))
    .bind(opt_ts(entry.completed_at))
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn update_entry(conn: &mut SqliteConnection, entry: &LedgerEntry) -> Result<(), RepoError> {
    sqlx::query(
        r#"UPDATE ledger_entries
           SET status = ?, external_ref = ?, description = ?, completed_at = ?
           WHERE id = ?"#,
    )
    .bind(entry.status.as_str())
    .bind(&entry.external_ref)
    .bind(&entry.description)
    .bind(opt_ts(entry.completed_at))
    .bind(entry.id.to_string())
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn load_contract(
    conn: &mut SqliteConnection,
    id: ContractId,
) -> Result<Option<HireContract>, RepoError> {
    let row: Option<DbHireContract> =
        sqlx::query_as(&format!("SELECT {CONTRACT_COLUMNS} FROM hire_contracts WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err)?;
    row.map(DbHireContract::into_domain).transpose()
}

// ─────────────────────────────────────────────────────────────────────────────
// Wallet store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl WalletStore for SqliteRepo {
    async fn create_account(&self, req: CreateAccountRequest) -> Result<Account, RepoError> {
        let account = Account::new(req.username, req.currency)?;

        sqlx::query(
            r#"INSERT INTO accounts (id, username, balance, currency, created_at) VALUES (?, ?, 0, ?, ?)"#,
        )
        .bind(account.id.to_string())
        .bind(&account.username)
        .bind(account.currency().to_string())
        .bind(ts(account.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::Domain(DomainError::Validation(format!(
                    "Username '{}' is already taken",
                    account.username
                )))
            } else {
                db_err(e)
            }
        })?;

        Ok(account)
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepoError> {
        let row: Option<DbAccount> =
            sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(DbAccount::into_domain).transpose()
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, RepoError> {
        let row: Option<DbAccount> =
            sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?"))
                .bind(username.trim())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(DbAccount::into_domain).transpose()
    }

    async fn credit(&self, id: AccountId, amount: Money) -> Result<Account, RepoError> {
        let mut tx = self.begin_write().await?;
        let account = settlement::apply(
            &load_account(&mut tx, id).await?,
            Direction::Credit,
            amount,
        )?;
        store_balance(&mut tx, &account).await?;
        tx.commit().await.map_err(tx_err)?;
        Ok(account)
    }

    async fn debit(&self, id: AccountId, amount: Money) -> Result<Account, RepoError> {
        let mut tx = self.begin_write().await?;
        let account = settlement::apply(
            &load_account(&mut tx, id).await?,
            Direction::Debit,
            amount,
        )?;
        store_balance(&mut tx, &account).await?;
        tx.commit().await.map_err(tx_err)?;
        Ok(account)
    }

    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Money,
    ) -> Result<(Account, Account), RepoError> {
        if from == to {
            return Err(DomainError::Validation(
                "Source and destination accounts must differ".into(),
            )
            .into());
        }

        let mut tx = self.begin_write().await?;
        let source = load_account(&mut tx, from).await?;
        let destination = load_account(&mut tx, to).await?;
        let (source, destination) = settlement::transfer(&source, &destination, amount)?;
        store_balance(&mut tx, &source).await?;
        store_balance(&mut tx, &destination).await?;
        tx.commit().await.map_err(tx_err)?;

        Ok((source, destination))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ledger
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl Ledger for SqliteRepo {
    async fn record(&self, entry: LedgerEntry) -> Result<LedgerEntry, RepoError> {
        settlement::ensure_external_kind(&entry)?;
        if entry.status != EntryStatus::Pending {
            return Err(DomainError::Validation("Recorded entries must be PENDING".into()).into());
        }

        let mut tx = self.begin_write().await?;
        if let Some(existing) = replay(&mut tx, &entry).await? {
            return Ok(existing);
        }
        load_account(&mut tx, entry.account_id).await?;
        insert_entry(&mut tx, &entry).await?;
        tx.commit().await.map_err(tx_err)?;
        Ok(entry)
    }

    async fn post(&self, entry: LedgerEntry) -> Result<LedgerEntry, RepoError> {
        settlement::ensure_external_kind(&entry)?;
        if entry.status != EntryStatus::Completed {
            return Err(DomainError::Validation("Posted entries must be COMPLETED".into()).into());
        }

        let mut tx = self.begin_write().await?;
        let account = load_account(&mut tx, entry.account_id).await?;
        if let Some(existing) = replay(&mut tx, &entry).await? {
            return Ok(existing);
        }

        let account = settlement::apply(&account, entry.settlement_direction(), entry.amount)?;
        store_balance(&mut tx, &account).await?;
        insert_entry(&mut tx, &entry).await?;
        tx.commit().await.map_err(tx_err)?;
        Ok(entry)
    }

    async fn transition(
        &self,
        id: LedgerEntryId,
        change: StatusChange,
    ) -> Result<LedgerEntry, RepoError> {
        let mut tx = self.begin_write().await?;
        let mut entry = load_entry(&mut tx, id)
            .await?
            .ok_or(RepoError::Domain(DomainError::NotFound("Payment")))?;

        if let Some(direction) = entry.apply(&change)? {
            let account = load_account(&mut tx, entry.account_id).await?;
            let account = settlement::apply(&account, direction, entry.amount)?;
            store_balance(&mut tx, &account).await?;
        }
        update_entry(&mut tx, &entry).await?;
        tx.commit().await.map_err(tx_err)?;
        Ok(entry)
    }

    async fn get_entry(&self, id: LedgerEntryId) -> Result<Option<LedgerEntry>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        load_entry(&mut conn, id).await
    }

    async fn find_by_idempotency_key(
        &self,
        account_id: AccountId,
        key: &str,
    ) -> Result<Option<LedgerEntry>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        entry_by_key(&mut conn, account_id, key).await
    }

    async fn list_entries(&self, query: LedgerQuery) -> Result<Vec<LedgerEntry>, RepoError> {
        let mut sql: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE 1 = 1"));
        if let Some(id) = query.account_id {
            sql.push(" AND account_id = ").push_bind(id.to_string());
        }
        if let Some(id) = query.counterparty_id {
            sql.push(" AND counterparty_id = ").push_bind(id.to_string());
        }
        if let Some(status) = query.status {
            sql.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(kind) = query.kind {
            sql.push(" AND kind = ").push_bind(kind.as_str());
        }
        if let Some(from) = query.created_from {
            sql.push(" AND created_at >= ").push_bind(ts(from));
        }
        if let Some(to) = query.created_to {
            sql.push(" AND created_at <= ").push_bind(ts(to));
        }
        sql.push(" ORDER BY created_at DESC");

        let rows: Vec<DbLedgerEntry> = sql
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(DbLedgerEntry::into_domain).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hire contracts
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ContractStore for SqliteRepo {
    async fn book_hire(
        &self,
        booking: HireBooking,
    ) -> Result<(HireContract, LedgerEntry), RepoError> {
        if booking.hirer_id == booking.player_id {
            return Err(settlement::self_hire().into());
        }

        let mut tx = self.begin_write().await?;
        let hirer = load_account(&mut tx, booking.hirer_id).await?;
        let player = load_account(&mut tx, booking.player_id).await?;

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

        if let Some(stored) = replay(&mut tx, &entry).await? {
            let row: Option<DbHireContract> = sqlx::query_as(&format!(
                "SELECT {CONTRACT_COLUMNS} FROM hire_contracts WHERE ledger_entry_id = ?"
            ))
            .bind(stored.id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
            let contract = row
                .ok_or(RepoError::Domain(DomainError::NotFound("Contract")))?
                .into_domain()?;
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

        // A stored ACTIVE contract whose end has passed is already completed.
        let (clashes,): (i64,) = sqlx::query_as(
            r#"SELECT COUNT(*) FROM hire_contracts
               WHERE player_id = ? AND status = ? AND start_time <= ? AND end_time >= ?
                 AND end_time > ?"#,
        )
        .bind(contract.player_id.to_string())
        .bind(HireStatus::Active.as_str())
        .bind(ts(contract.end_time))
        .bind(ts(contract.start_time))
        .bind(ts(booking.now))
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;
        if clashes > 0 {
            return Err(DomainError::PlayerUnavailable.into());
        }

        let (hirer, player) = settlement::transfer(&hirer, &player, amount)?;
        store_balance(&mut tx, &hirer).await?;
        store_balance(&mut tx, &player).await?;
        insert_entry(&mut tx, &entry).await?;

        sqlx::query(
            r#"INSERT INTO hire_contracts (id, hirer_id, player_id, amount, currency, start_time,
               end_time, status, ledger_entry_id, created_at, canceled_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)"#,
        )
        .bind(contract.id.to_string())
        .bind(contract.hirer_id.to_string())
        .bind(contract.player_id.to_string())
        .bind(contract.amount.amount())
        .bind(contract.amount.currency().to_string())
        .bind(ts(contract.start_time))
        .bind(ts(contract.end_time))
        .bind(contract.status.as_str())
        .bind(contract.ledger_entry_id.to_string())
        .bind(ts(contract.created_at))
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(tx_err)?;
        Ok((contract, entry))
    }

    async fn cancel_hire(
        &self,
        id: ContractId,
        requester: AccountId,
        now: DateTime<Utc>,
    ) -> Result<(HireContract, LedgerEntry), RepoError> {
        let mut tx = self.begin_write().await?;
        let mut contract = load_contract(&mut tx, id)
            .await?
            .ok_or(RepoError::Domain(DomainError::NotFound("Contract")))?;
        contract.cancel(requester, now)?;

        let mut hire_entry = load_entry(&mut tx, contract.ledger_entry_id)
            .await?
            .ok_or(RepoError::Domain(DomainError::NotFound("Payment")))?;
        hire_entry.transition(EntryStatus::Refunded, now)?;

        let hirer = load_account(&mut tx, contract.hirer_id).await?;
        let player = load_account(&mut tx, contract.player_id).await?;
        let (player, hirer) = settlement::reverse_hire(&player, &hirer, contract.amount)?;

        let refund = LedgerEntry::refund(contract.hirer_id, contract.player_id, contract.amount, now)
            .with_description(Some(format!("Refund for canceled hire {id}")));

        store_balance(&mut tx, &player).await?;
        store_balance(&mut tx, &hirer).await?;
        update_entry(&mut tx, &hire_entry).await?;
        insert_entry(&mut tx, &refund).await?;
        sqlx::query("UPDATE hire_contracts SET status = ?, canceled_at = ? WHERE id = ?")
            .bind(contract.status.as_str())
            .bind(opt_ts(contract.canceled_at))
            .bind(contract.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(tx_err)?;
        Ok((contract, refund))
    }

    async fn get_contract(&self, id: ContractId) -> Result<Option<HireContract>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        load_contract(&mut conn, id).await
    }

    async fn list_contracts(&self, query: ContractQuery) -> Result<Vec<HireContract>, RepoError> {
        let mut sql: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {CONTRACT_COLUMNS} FROM hire_contracts WHERE 1 = 1"));
        if let Some(id) = query.hirer_id {
            sql.push(" AND hirer_id = ").push_bind(id.to_string());
        }
        if let Some(id) = query.player_id {
            sql.push(" AND player_id = ").push_bind(id.to_string());
        }
        sql.push(" ORDER BY created_at DESC");

        let rows: Vec<DbHireContract> = sql
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(DbHireContract::into_domain).collect()
    }

    async fn settle_elapsed(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let result =
            sqlx::query("UPDATE hire_contracts SET status = ? WHERE status = ? AND end_time <= ?")
                .bind(HireStatus::Completed.as_str())
                .bind(HireStatus::Active.as_str())
                .bind(ts(now))
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(result.rows_affected())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reviews
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ReviewStore for SqliteRepo {
    async fn submit_review(
        &self,
        contract_id: ContractId,
        reviewer_id: AccountId,
        rating: Rating,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Review, RepoError> {
        let mut tx = self.begin_write().await?;
        let contract = load_contract(&mut tx, contract_id)
            .await?
            .ok_or(RepoError::Domain(DomainError::NotFound("Contract")))?;
        let review = Review::for_contract(&contract, reviewer_id, rating, comment, now)?;

        sqlx::query(
            r#"INSERT INTO reviews (id, contract_id, player_id, reviewer_id, rating, comment, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(review.id.to_string())
        .bind(review.contract_id.to_string())
        .bind(review.player_id.to_string())
        .bind(review.reviewer_id.to_string())
        .bind(i32::from(review.rating))
        .bind(&review.comment)
        .bind(ts(review.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::Domain(DomainError::AlreadyReviewed)
            } else {
                db_err(e)
            }
        })?;

        tx.commit().await.map_err(tx_err)?;
        Ok(review)
    }

    async fn get_review_for_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<Option<Review>, RepoError> {
        let row: Option<DbReview> =
            sqlx::query_as(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE contract_id = ?"))
                .bind(contract_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(DbReview::into_domain).transpose()
    }

    async fn list_reviews_for_player(
        &self,
        player_id: AccountId,
    ) -> Result<Vec<Review>, RepoError> {
        let rows: Vec<DbReview> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE player_id = ? ORDER BY created_at DESC"
        ))
        .bind(player_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(DbReview::into_domain).collect()
    }
}
