//! In-memory store tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use hire_types::{
        AccountId, ContractQuery, ContractStore, CreateAccountRequest, Currency, DomainError,
        EntryKind, EntryStatus, HireBooking, HireStatus, Ledger, LedgerEntry, LedgerEntryId,
        LedgerQuery, Money,
        Rating, RepoError, ReviewStore, StatusChange, WalletStore,
    };

    use crate::MemoryRepo;

    fn vnd(amount: i64) -> Money {
        Money::new(amount, Currency::VND).unwrap()
    }

    async fn open(repo: &MemoryRepo, username: &str, balance: i64) -> AccountId {
        let account = repo
            .create_account(CreateAccountRequest {
                username: username.to_string(),
                currency: Currency::VND,
            })
            .await
            .unwrap();
        if balance > 0 {
            repo.credit(account.id, vnd(balance)).await.unwrap();
        }
        account.id
    }

    async fn balance(repo: &MemoryRepo, id: AccountId) -> i64 {
        repo.get_account(id).await.unwrap().unwrap().balance.amount()
    }

    fn booking(hirer: AccountId, player: AccountId, amount: i64, start_h: i64, end_h: i64) -> HireBooking {
        let now = Utc::now();
        HireBooking {
            hirer_id: hirer,
            player_id: player,
            amount,
            start_time: now + Duration::hours(start_h),
            end_time: now + Duration::hours(end_h),
            idempotency_key: None,
            entry_id: LedgerEntryId::new(),
            description: None,
            now,
        }
    }

    fn domain(err: RepoError) -> DomainError {
        match err {
            RepoError::Domain(e) => e,
            other => panic!("expected a domain error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let repo = MemoryRepo::new();
        open(&repo, "alice", 0).await;

        let err = repo
            .create_account(CreateAccountRequest {
                username: " alice ".to_string(),
                currency: Currency::VND,
            })
            .await
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Validation(_)));

        let found = repo.find_account_by_username("alice").await.unwrap();
        assert!(found.is_some());
        assert!(repo.find_account_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_debit_never_goes_negative() {
        let repo = MemoryRepo::new();
        let alice = open(&repo, "alice", 100).await;

        let err = repo.debit(alice, vnd(101)).await.unwrap_err();
        assert_eq!(
            domain(err),
            DomainError::InsufficientFunds {
                available: 100,
                requested: 101
            }
        );
        assert_eq!(balance(&repo, alice).await, 100);
    }

    #[tokio::test]
    async fn test_transfer_to_unknown_account_moves_nothing() {
        let repo = MemoryRepo::new();
        let alice = open(&repo, "alice", 100).await;

        let err = repo.transfer(alice, AccountId::new(), vnd(50)).await.unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound("Account"));
        assert_eq!(balance(&repo, alice).await, 100);
    }

    #[tokio::test]
    async fn test_post_applies_balance_and_replays_key() {
        let repo = MemoryRepo::new();
        let alice = open(&repo, "alice", 0).await;
        let now = Utc::now();

        let entry = LedgerEntry::pending(EntryKind::TopUp, alice, None, vnd(500), "BANK", now)
            .completed_at(now)
            .with_idempotency_key(Some("topup-1".into()));
        let first = repo.post(entry.clone()).await.unwrap();

        let retry = LedgerEntry::pending(EntryKind::TopUp, alice, None, vnd(500), "BANK", now)
            .completed_at(now)
            .with_idempotency_key(Some("topup-1".into()));
        let second = repo.post(retry).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(balance(&repo, alice).await, 500);
    }

    #[tokio::test]
    async fn test_record_rejects_hire_entries() {
        let repo = MemoryRepo::new();
        let alice = open(&repo, "alice", 0).await;
        let bob = open(&repo, "bob", 0).await;

        let mut entry = LedgerEntry::hire(alice, bob, vnd(10), Utc::now());
        entry.status = EntryStatus::Pending;
        let err = repo.record(entry).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_pending_top_up_credits_only_on_confirm() {
        let repo = MemoryRepo::new();
        let alice = open(&repo, "alice", 0).await;
        let now = Utc::now();

        let pending = repo
            .record(LedgerEntry::pending(EntryKind::TopUp, alice, None, vnd(300), "MOMO", now))
            .await
            .unwrap();
        assert_eq!(balance(&repo, alice).await, 0);

        let done = repo
            .transition(pending.id, StatusChange::complete(Some("GW-1".into()), now))
            .await
            .unwrap();
        assert_eq!(done.status, EntryStatus::Completed);
        assert_eq!(done.external_ref.as_deref(), Some("GW-1"));
        assert_eq!(balance(&repo, alice).await, 300);

        let err = repo
            .transition(pending.id, StatusChange::fail("late", now))
            .await
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_refunding_spent_top_up_fails_atomically() {
        let repo = MemoryRepo::new();
        let alice = open(&repo, "alice", 0).await;
        let now = Utc::now();

        let topup = repo
            .post(LedgerEntry::pending(EntryKind::TopUp, alice, None, vnd(300), "BANK", now).completed_at(now))
            .await
            .unwrap();
        repo.debit(alice, vnd(200)).await.unwrap();

        let err = repo
            .transition(topup.id, StatusChange::refund("chargeback", now))
            .await
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::InsufficientFunds { .. }));

        let entry = repo.get_entry(topup.id).await.unwrap().unwrap();
        assert_eq!(entry.status, EntryStatus::Completed);
        assert_eq!(balance(&repo, alice).await, 100);
    }

    #[tokio::test]
    async fn test_book_and_cancel_restore_balances() {
        let repo = MemoryRepo::new();
        let hirer = open(&repo, "hirer", 100_000).await;
        let player = open(&repo, "player", 0).await;

        let (contract, entry) = repo.book_hire(booking(hirer, player, 50_000, 1, 2)).await.unwrap();
        assert_eq!(contract.status, HireStatus::Active);
        assert_eq!(entry.kind, EntryKind::Hire);
        assert_eq!(entry.status, EntryStatus::Completed);
        assert_eq!(balance(&repo, hirer).await, 50_000);
        assert_eq!(balance(&repo, player).await, 50_000);

        let (canceled, refund) = repo.cancel_hire(contract.id, hirer, Utc::now()).await.unwrap();
        assert_eq!(canceled.status, HireStatus::Canceled);
        assert_eq!(refund.kind, EntryKind::Refund);
        assert_eq!(balance(&repo, hirer).await, 100_000);
        assert_eq!(balance(&repo, player).await, 0);

        let hire_entry = repo.get_entry(entry.id).await.unwrap().unwrap();
        assert_eq!(hire_entry.status, EntryStatus::Refunded);
    }

    #[tokio::test]
    async fn test_overlapping_booking_is_rejected() {
        let repo = MemoryRepo::new();
        let hirer = open(&repo, "hirer", 100_000).await;
        let other = open(&repo, "other", 100_000).await;
        let player = open(&repo, "player", 0).await;

        repo.book_hire(booking(hirer, player, 10_000, 1, 3)).await.unwrap();
        let err = repo.book_hire(booking(other, player, 10_000, 2, 4)).await.unwrap_err();
        assert_eq!(domain(err), DomainError::PlayerUnavailable);
        assert_eq!(balance(&repo, other).await, 100_000);
    }

    #[tokio::test]
    async fn test_canceled_contract_frees_the_window() {
        let repo = MemoryRepo::new();
        let hirer = open(&repo, "hirer", 100_000).await;
        let player = open(&repo, "player", 0).await;

        let (contract, _) = repo.book_hire(booking(hirer, player, 10_000, 1, 3)).await.unwrap();
        repo.cancel_hire(contract.id, hirer, Utc::now()).await.unwrap();
        repo.book_hire(booking(hirer, player, 10_000, 1, 3)).await.unwrap();
    }

    #[tokio::test]
    async fn test_booking_replays_idempotency_key() {
        let repo = MemoryRepo::new();
        let hirer = open(&repo, "hirer", 100_000).await;
        let player = open(&repo, "player", 0).await;

        let mut req = booking(hirer, player, 10_000, 1, 2);
        req.idempotency_key = Some("book-1".into());
        let (first, first_entry) = repo.book_hire(req.clone()).await.unwrap();
        req.entry_id = LedgerEntryId::new();
        let (second, second_entry) = repo.book_hire(req).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first_entry.id, second_entry.id);
        assert_eq!(balance(&repo, hirer).await, 90_000);
    }

    #[tokio::test]
    async fn test_idempotency_key_is_scoped_to_the_account() {
        let repo = MemoryRepo::new();
        let hirer = open(&repo, "hirer", 100_000).await;
        let player = open(&repo, "player", 0).await;
        let bob = open(&repo, "bob", 0).await;

        let mut req = booking(hirer, player, 10_000, 1, 2);
        req.idempotency_key = Some("k-1".into());
        repo.book_hire(req).await.unwrap();

        let now = Utc::now();
        let topup = LedgerEntry::pending(EntryKind::TopUp, bob, None, vnd(5_000), "BANK", now)
            .completed_at(now)
            .with_idempotency_key(Some("k-1".into()));
        let posted = repo.post(topup).await.unwrap();

        assert_eq!(posted.kind, EntryKind::TopUp);
        assert_eq!(posted.account_id, bob);
        assert_eq!(balance(&repo, bob).await, 5_000);

        let hirer_entry = repo.find_by_idempotency_key(hirer, "k-1").await.unwrap().unwrap();
        assert_eq!(hirer_entry.kind, EntryKind::Hire);
        let bob_entry = repo.find_by_idempotency_key(bob, "k-1").await.unwrap().unwrap();
        assert_eq!(bob_entry.id, posted.id);
    }

    #[tokio::test]
    async fn test_reusing_a_key_for_a_different_request_is_rejected() {
        let repo = MemoryRepo::new();
        let alice = open(&repo, "alice", 0).await;
        let player = open(&repo, "player", 0).await;
        let now = Utc::now();
        let keyed = |kind, amount| {
            LedgerEntry::pending(kind, alice, None, vnd(amount), "BANK", now)
                .completed_at(now)
                .with_idempotency_key(Some("k-1".into()))
        };

        repo.post(keyed(EntryKind::TopUp, 500)).await.unwrap();

        let err = repo.post(keyed(EntryKind::TopUp, 600)).await.unwrap_err();
        assert_eq!(domain(err), DomainError::IdempotencyKeyReused);
        let err = repo.post(keyed(EntryKind::Withdraw, 100)).await.unwrap_err();
        assert_eq!(domain(err), DomainError::IdempotencyKeyReused);

        let mut req = booking(alice, player, 500, 1, 2);
        req.idempotency_key = Some("k-1".into());
        let err = repo.book_hire(req).await.unwrap_err();
        assert_eq!(domain(err), DomainError::IdempotencyKeyReused);

        assert_eq!(balance(&repo, alice).await, 500);
        assert_eq!(balance(&repo, player).await, 0);
        assert!(repo.list_contracts(ContractQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_elapsed_contract_does_not_block_whether_settled_or_not() {
        for sweep in [false, true] {
            let repo = MemoryRepo::new();
            let hirer = open(&repo, "hirer", 100_000).await;
            let player = open(&repo, "player", 0).await;

            let (first, _) = repo.book_hire(booking(hirer, player, 1_000, 1, 2)).await.unwrap();
            if sweep {
                assert_eq!(repo.settle_elapsed(first.end_time).await.unwrap(), 1);
            }

            let mut next = booking(hirer, player, 1_000, 0, 0);
            next.now = first.end_time;
            next.start_time = first.end_time;
            next.end_time = first.end_time + Duration::hours(1);
            assert!(repo.book_hire(next).await.is_ok(), "sweep = {sweep}");
        }
    }

    #[tokio::test]
    async fn test_cancel_fails_when_player_spent_the_funds() {
        let repo = MemoryRepo::new();
        let hirer = open(&repo, "hirer", 100_000).await;
        let player = open(&repo, "player", 0).await;

        let (contract, entry) = repo.book_hire(booking(hirer, player, 50_000, 1, 2)).await.unwrap();
        repo.debit(player, vnd(30_000)).await.unwrap();

        let err = repo.cancel_hire(contract.id, hirer, Utc::now()).await.unwrap_err();
        assert_eq!(
            domain(err),
            DomainError::PlayerInsufficientFunds {
                available: 20_000,
                required: 50_000
            }
        );
        assert_eq!(balance(&repo, hirer).await, 50_000);
        let stored = repo.get_contract(contract.id).await.unwrap().unwrap();
        assert_eq!(stored.status, HireStatus::Active);
        let hire_entry = repo.get_entry(entry.id).await.unwrap().unwrap();
        assert_eq!(hire_entry.status, EntryStatus::Completed);
    }

    #[tokio::test]
    async fn test_only_hirer_cancels_before_start() {
        let repo = MemoryRepo::new();
        let hirer = open(&repo, "hirer", 100_000).await;
        let player = open(&repo, "player", 0).await;
        let (contract, _) = repo.book_hire(booking(hirer, player, 50_000, 1, 2)).await.unwrap();

        let err = repo.cancel_hire(contract.id, player, Utc::now()).await.unwrap_err();
        assert_eq!(domain(err), DomainError::Forbidden);

        let later = Utc::now() + Duration::minutes(90);
        let err = repo.cancel_hire(contract.id, hirer, later).await.unwrap_err();
        assert_eq!(domain(err), DomainError::AlreadyStarted);

        let err = repo.cancel_hire(hire_types::ContractId::new(), hirer, Utc::now()).await.unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound("Contract"));
    }

    #[tokio::test]
    async fn test_review_once_after_end() {
        let repo = MemoryRepo::new();
        let hirer = open(&repo, "hirer", 100_000).await;
        let player = open(&repo, "player", 0).await;
        let (contract, _) = repo.book_hire(booking(hirer, player, 50_000, 1, 2)).await.unwrap();
        let rating = Rating::try_from(5).unwrap();

        let err = repo
            .submit_review(contract.id, hirer, rating, None, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(domain(err), DomainError::ContractNotEnded);

        let after = Utc::now() + Duration::hours(3);
        let review = repo
            .submit_review(contract.id, hirer, rating, Some("great".into()), after)
            .await
            .unwrap();
        assert_eq!(review.player_id, player);

        let err = repo
            .submit_review(contract.id, hirer, rating, None, after)
            .await
            .unwrap_err();
        assert_eq!(domain(err), DomainError::AlreadyReviewed);

        let reviews = repo.list_reviews_for_player(player).await.unwrap();
        assert_eq!(reviews.len(), 1);
    }

    #[tokio::test]
    async fn test_settle_elapsed_writes_completed_once() {
        let repo = MemoryRepo::new();
        let hirer = open(&repo, "hirer", 100_000).await;
        let player = open(&repo, "player", 0).await;
        repo.book_hire(booking(hirer, player, 10_000, 1, 2)).await.unwrap();
        repo.book_hire(booking(hirer, player, 10_000, 5, 6)).await.unwrap();

        let at = Utc::now() + Duration::hours(3);
        assert_eq!(repo.settle_elapsed(at).await.unwrap(), 1);
        assert_eq!(repo.settle_elapsed(at).await.unwrap(), 0);

        let contracts = repo
            .list_contracts(ContractQuery {
                player_id: Some(player),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(contracts.len(), 2);
        assert!(contracts[0].created_at >= contracts[1].created_at);
    }

    #[tokio::test]
    async fn test_list_entries_filters_by_counterparty() {
        let repo = MemoryRepo::new();
        let hirer = open(&repo, "hirer", 100_000).await;
        let player = open(&repo, "player", 0).await;
        repo.book_hire(booking(hirer, player, 10_000, 1, 2)).await.unwrap();

        let received = repo
            .list_entries(LedgerQuery {
                counterparty_id: Some(player),
                kind: Some(EntryKind::Hire),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].account_id, hirer);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transfers_conserve_funds() {
        let repo = Arc::new(MemoryRepo::new());
        let a = open(&repo, "a", 1_000).await;
        let b = open(&repo, "b", 1_000).await;
        let c = open(&repo, "c", 1_000).await;
        let ids = [a, b, c];

        let mut handles = Vec::new();
        for i in 0..300 {
            let repo = Arc::clone(&repo);
            let from = ids[i % 3];
            let to = ids[(i + 1 + i / 3 % 2) % 3];
            handles.push(tokio::spawn(async move {
                match i % 4 {
                    0 => repo.debit(from, vnd(37)).await.map(|_| ()),
                    1 => repo.credit(from, vnd(37)).await.map(|_| ()),
                    _ => repo.transfer(from, to, vnd(113)).await.map(|_| ()),
                }
            }));
        }

        let mut debited = 0;
        let mut credited = 0;
        for (i, handle) in handles.into_iter().enumerate() {
            let outcome = handle.await.unwrap();
            match (i % 4, outcome) {
                (0, Ok(())) => debited += 37,
                (1, Ok(())) => credited += 37,
                (_, Ok(())) => {}
                (_, Err(RepoError::Domain(DomainError::InsufficientFunds { .. }))) => {}
                (_, Err(e)) => panic!("unexpected error: {e:?}"),
            }
        }

        let mut total = 0;
        for id in ids {
            let b = balance(&repo, id).await;
            assert!(b >= 0);
            total += b;
        }
        assert_eq!(total, 3_000 - debited + credited);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bookings_never_double_book() {
        let repo = Arc::new(MemoryRepo::new());
        let player = open(&repo, "player", 0).await;
        let mut hirers = Vec::new();
        for i in 0..8 {
            hirers.push(open(&repo, &format!("hirer{i}"), 10_000).await);
        }

        let mut handles = Vec::new();
        for hirer in hirers.clone() {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.book_hire(booking(hirer, player, 5_000, 1, 2)).await
            }));
        }

        let mut booked = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => booked += 1,
                Err(e) => assert_eq!(domain(e), DomainError::PlayerUnavailable),
            }
        }
        assert_eq!(booked, 1);
        assert_eq!(balance(&repo, player).await, 5_000);
    }
}
