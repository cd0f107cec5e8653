//! Review store port.

use chrono::{DateTime, Utc};

use crate::domain::{AccountId, ContractId, Rating, Review};
use crate::error::RepoError;

#[async_trait::async_trait]
pub trait ReviewStore: Send + Sync + 'static {
    /// Persists a review after checking, atomically with the insert, that the
    /// reviewer is the contract's hirer, the contract has ended and no review
    /// exists yet.
    async fn submit_review(
        &self,
        contract_id: ContractId,
        reviewer_id: AccountId,
        rating: Rating,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Review, RepoError>;

    async fn get_review_for_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<Option<Review>, RepoError>;

    /// Reviews of a player, newest first.
    async fn list_reviews_for_player(&self, player_id: AccountId)
    -> Result<Vec<Review>, RepoError>;
}
