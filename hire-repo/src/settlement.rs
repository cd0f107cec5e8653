//! Balance arithmetic shared by the adapters.
//!
//! Each helper returns the next state without touching the input, so an
//! adapter can compute every side of an operation before writing any of it.

use hire_types::{Account, Direction, DomainError, EntryKind, LedgerEntry, Money};

/// Both sides of a transfer, `(from, to)`.
pub(crate) fn transfer(
    from: &Account,
    to: &Account,
    amount: Money,
) -> Result<(Account, Account), DomainError> {
    let mut from = from.clone();
    let mut to = to.clone();
    from.debit(amount)?;
    to.credit(amount)?;
    Ok((from, to))
}

/// Reverses a hire: the player pays the amount back to the hirer.
/// Returns `(player, hirer)`.
pub(crate) fn reverse_hire(
    player: &Account,
    hirer: &Account,
    amount: Money,
) -> Result<(Account, Account), DomainError> {
    transfer(player, hirer, amount).map_err(|e| match e {
        DomainError::InsufficientFunds {
            available,
            requested,
        } => DomainError::PlayerInsufficientFunds {
            available,
            required: requested,
        },
        other => other,
    })
}

pub(crate) fn apply(
    account: &Account,
    direction: Direction,
    amount: Money,
) -> Result<Account, DomainError> {
    let mut next = account.clone();
    match direction {
        Direction::Credit => next.credit(amount)?,
        Direction::Debit => next.debit(amount)?,
    }
    Ok(next)
}

/// Only gateway-facing kinds go through `record`/`post`.
pub(crate) fn ensure_external_kind(entry: &LedgerEntry) -> Result<(), DomainError> {
    if !matches!(entry.kind, EntryKind::TopUp | EntryKind::Withdraw) {
        return Err(DomainError::Validation(format!(
            "{} entries are written by the contract manager",
            entry.kind
        )));
    }
    Ok(())
}

/// Decides what a write carrying an already stored key gets back: the stored
/// entry when both describe the same movement, `IdempotencyKeyReused` when
/// they do not.
pub(crate) fn replay(
    stored: Option<LedgerEntry>,
    candidate: &LedgerEntry,
) -> Result<Option<LedgerEntry>, DomainError> {
    match stored {
        Some(entry) if entry.same_request(candidate) => Ok(Some(entry)),
        Some(_) => Err(DomainError::IdempotencyKeyReused),
        None => Ok(None),
    }
}

pub(crate) fn self_hire() -> DomainError {
    DomainError::Validation("A player cannot hire themselves".into())
}
