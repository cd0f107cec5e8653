//! Review Gate and player statistics.

use hire_types::{
    AccountId, AppError, ContractId, ContractQuery, EntryKind, LedgerQuery, MarketRepository,
    NotificationKind, PlayerStats, Rating, Review, StatsPeriod, SubmitReviewRequest,
};
use serde_json::json;

use super::MarketService;

impl<R: MarketRepository> MarketService<R> {
    /// Reviews a finished contract. Only the hirer may review, once, after
    /// the contract's end time.
    #[tracing::instrument(skip(self, req), fields(rating = req.rating))]
    pub async fn submit_review(
        &self,
        contract_id: ContractId,
        reviewer_id: AccountId,
        req: SubmitReviewRequest,
    ) -> Result<Review, AppError> {
        let rating = Rating::try_from(req.rating)?;
        let review = self
            .repo
            .submit_review(contract_id, reviewer_id, rating, req.comment, self.now())
            .await?;

        tracing::info!(review_id = %review.id, player_id = %review.player_id, "review submitted");
        self.notify(
            review.player_id,
            NotificationKind::ReviewReceived,
            json!({
                "review_id": review.id,
                "contract_id": review.contract_id,
                "rating": review.rating,
                "comment": review.comment,
            }),
        )
        .await;
        Ok(review)
    }

    /// Reviews received by a player, newest first.
    pub async fn list_reviews_for_player(&self, player_id: AccountId) -> Result<Vec<Review>, AppError> {
        self.get_account(player_id).await?;
        Ok(self.repo.list_reviews_for_player(player_id).await?)
    }

    /// Aggregates a player's hires, reviews and earnings as observed now.
    #[tracing::instrument(skip(self))]
    pub async fn get_player_stats(
        &self,
        player_id: AccountId,
        period: StatsPeriod,
    ) -> Result<PlayerStats, AppError> {
        let now = self.now();
        let player = self.get_account(player_id).await?;

        let contracts = self
            .repo
            .list_contracts(ContractQuery {
                player_id: Some(player_id),
                ..Default::default()
            })
            .await?;
        let reviews = self.repo.list_reviews_for_player(player_id).await?;
        let received = self
            .repo
            .list_entries(LedgerQuery {
                counterparty_id: Some(player_id),
                kind: Some(EntryKind::Hire),
                ..Default::default()
            })
            .await?;

        Ok(PlayerStats::compute(
            player_id,
            player.currency(),
            &contracts,
            &reviews,
            &received,
            period,
            now,
        ))
    }
}
