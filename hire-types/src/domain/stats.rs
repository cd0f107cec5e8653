//! Player statistics projections.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::account::AccountId;
use super::contract::{HireContract, HireStatus};
use super::ledger::{EntryKind, EntryStatus, LedgerEntry};
use super::money::Currency;
use super::review::Review;

/// How many reviews a stats projection carries inline.
pub const RECENT_REVIEWS: usize = 5;

/// Granularity of the per-period hire breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    #[default]
    Day,
    Month,
    Year,
}

impl StatsPeriod {
    /// Bucket label for an instant (`2024-05-01`, `2024-05`, `2024`).
    pub fn label(&self, at: DateTime<Utc>) -> String {
        let fmt = match self {
            StatsPeriod::Day => "%Y-%m-%d",
            StatsPeriod::Month => "%Y-%m",
            StatsPeriod::Year => "%Y",
        };
        at.format(fmt).to_string()
    }
}

/// Hire activity within one period bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HireStats {
    pub period: String,
    pub total_hires: u32,
    pub completed_hires: u32,
    pub total_hours: f64,
    /// Sum of non-canceled hire amounts, smallest currency unit
    pub earnings: i64,
}

/// Aggregated view of a player's hires and reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlayerStats {
    pub player_id: AccountId,
    /// `None` until the player has been reviewed
    pub average_rating: Option<f64>,
    pub total_reviews: u32,
    pub total_hires: u32,
    pub completed_hires: u32,
    pub canceled_hires: u32,
    pub total_hire_hours: f64,
    /// completed / (completed + canceled), 0 when neither has happened
    pub completion_rate: f64,
    /// Sum of settled HIRE payments received, smallest currency unit
    pub total_earnings: i64,
    pub currency: Currency,
    pub recent_reviews: Vec<Review>,
    pub hire_stats: Vec<HireStats>,
}

impl PlayerStats {
    /// Builds the projection from the player's contracts, reviews and the
    /// HIRE entries paid to them, as observed at `now`.
    pub fn compute(
        player_id: AccountId,
        currency: Currency,
        contracts: &[HireContract],
        reviews: &[Review],
        payments_received: &[LedgerEntry],
        period: StatsPeriod,
        now: DateTime<Utc>,
    ) -> Self {
        let contracts: Vec<&HireContract> = contracts
            .iter()
            .filter(|c| c.player_id == player_id)
            .collect();

        let mut completed_hires = 0u32;
        let mut canceled_hires = 0u32;
        let mut total_hire_hours = 0.0;
        let mut buckets: BTreeMap<String, HireStats> = BTreeMap::new();

        for contract in &contracts {
            let status = contract.effective_status(now);
            let label = period.label(contract.start_time);
            let bucket = buckets.entry(label.clone()).or_insert_with(|| HireStats {
                period: label,
                total_hires: 0,
                completed_hires: 0,
                total_hours: 0.0,
                earnings: 0,
            });
            bucket.total_hires += 1;

            match status {
                HireStatus::Completed => {
                    completed_hires += 1;
                    total_hire_hours += contract.duration_hours();
                    bucket.completed_hires += 1;
                    bucket.total_hours += contract.duration_hours();
                }
                HireStatus::Canceled => canceled_hires += 1,
                HireStatus::Active => {}
            }
            if status != HireStatus::Canceled {
                bucket.earnings = bucket.earnings.saturating_add(contract.amount.amount());
            }
        }

        let reviews: Vec<&Review> = reviews
            .iter()
            .filter(|r| r.player_id == player_id)
            .collect();
        let average_rating = if reviews.is_empty() {
            None
        } else {
            let sum: u32 = reviews.iter().map(|r| r.rating.value() as u32).sum();
            Some(sum as f64 / reviews.len() as f64)
        };
        let mut recent_reviews: Vec<Review> = reviews.iter().map(|r| (*r).clone()).collect();
        recent_reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_reviews.truncate(RECENT_REVIEWS);

        let finished = completed_hires + canceled_hires;
        let completion_rate = if finished == 0 {
            0.0
        } else {
            completed_hires as f64 / finished as f64
        };

        let total_earnings = payments_received
            .iter()
            .filter(|e| {
                e.kind == EntryKind::Hire
                    && e.status == EntryStatus::Completed
                    && e.counterparty_id == Some(player_id)
            })
            .fold(0i64, |acc, e| acc.saturating_add(e.amount.amount()));

        Self {
            player_id,
            average_rating,
            total_reviews: reviews.len() as u32,
            total_hires: contracts.len() as u32,
            completed_hires,
            canceled_hires,
            total_hire_hours,
            completion_rate,
            total_earnings,
            currency,
            recent_reviews,
            hire_stats: buckets.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LedgerEntryId, Money, Rating};
    use chrono::{Duration, TimeZone};

    fn contract(
        player: AccountId,
        start: DateTime<Utc>,
        hours: i64,
        status: HireStatus,
    ) -> HireContract {
        HireContract {
            id: crate::domain::ContractId::new(),
            hirer_id: AccountId::new(),
            player_id: player,
            amount: Money::new(10_000, Currency::VND).unwrap(),
            start_time: start,
            end_time: start + Duration::hours(hours),
            status,
            ledger_entry_id: LedgerEntryId::new(),
            created_at: start - Duration::days(1),
            canceled_at: None,
        }
    }

    #[test]
    fn test_empty_stats() {
        let player = AccountId::new();
        let stats = PlayerStats::compute(
            player,
            Currency::VND,
            &[],
            &[],
            &[],
            StatsPeriod::Day,
            Utc::now(),
        );
        assert_eq!(stats.average_rating, None);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.total_hires, 0);
        assert!(stats.hire_stats.is_empty());
    }

    #[test]
    fn test_completed_canceled_and_pending_hires() {
        let player = AccountId::new();
        let may1 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let may2 = Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 11, 0, 0).unwrap();

        let contracts = vec![
            contract(player, may1, 2, HireStatus::Active),
            contract(player, may1, 1, HireStatus::Canceled),
            contract(player, may2, 3, HireStatus::Active),
            contract(AccountId::new(), may1, 5, HireStatus::Active),
        ];

        let stats = PlayerStats::compute(
            player,
            Currency::VND,
            &contracts,
            &[],
            &[],
            StatsPeriod::Day,
            now,
        );

        assert_eq!(stats.total_hires, 3);
        assert_eq!(stats.completed_hires, 1);
        assert_eq!(stats.canceled_hires, 1);
        assert_eq!(stats.total_hire_hours, 2.0);
        assert_eq!(stats.completion_rate, 0.5);

        assert_eq!(stats.hire_stats.len(), 2);
        assert_eq!(stats.hire_stats[0].period, "2024-05-01");
        assert_eq!(stats.hire_stats[0].total_hires, 2);
        assert_eq!(stats.hire_stats[0].earnings, 10_000);
        assert_eq!(stats.hire_stats[1].period, "2024-05-02");
        assert_eq!(stats.hire_stats[1].completed_hires, 0);

        let monthly = PlayerStats::compute(
            player,
            Currency::VND,
            &contracts,
            &[],
            &[],
            StatsPeriod::Month,
            now,
        );
        assert_eq!(monthly.hire_stats.len(), 1);
        assert_eq!(monthly.hire_stats[0].period, "2024-05");
    }

    #[test]
    fn test_ratings_and_earnings() {
        let player = AccountId::new();
        let now = Utc::now();
        let contract_id = crate::domain::ContractId::new();
        let review = |rating: i32, minutes: i64| Review {
            id: crate::domain::ReviewId::new(),
            contract_id,
            player_id: player,
            reviewer_id: AccountId::new(),
            rating: Rating::try_from(rating).unwrap(),
            comment: None,
            created_at: now - Duration::minutes(minutes),
        };
        let reviews: Vec<Review> = (0..7).map(|i| review(if i % 2 == 0 { 5 } else { 4 }, i)).collect();

        let hirer = AccountId::new();
        let amount = Money::new(30_000, Currency::VND).unwrap();
        let paid = LedgerEntry::hire(hirer, player, amount, now);
        let mut refunded = LedgerEntry::hire(hirer, player, amount, now);
        refunded.transition(EntryStatus::Refunded, now).unwrap();
        let other = LedgerEntry::hire(hirer, AccountId::new(), amount, now);

        let stats = PlayerStats::compute(
            player,
            Currency::VND,
            &[],
            &reviews,
            &[paid, refunded, other],
            StatsPeriod::Day,
            now,
        );

        assert_eq!(stats.total_reviews, 7);
        let avg = stats.average_rating.unwrap();
        assert!((avg - 32.0 / 7.0).abs() < 1e-9);
        assert_eq!(stats.recent_reviews.len(), RECENT_REVIEWS);
        assert_eq!(stats.recent_reviews[0].created_at, now);
        assert_eq!(stats.total_earnings, 30_000);
    }
}
