//! Post-contract review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::account::AccountId;
use super::contract::{ContractId, HireContract};
use crate::error::DomainError;

crate::domain::uuid_id! {
    /// Unique identifier for a Review.
    ReviewId
}

/// A 0..=5 star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for Rating {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if !(0..=Self::MAX as i32).contains(&value) {
            return Err(DomainError::InvalidRating(value));
        }
        Ok(Self(value as u8))
    }
}

impl From<Rating> for i32 {
    fn from(r: Rating) -> Self {
        r.0 as i32
    }
}

/// A hirer's review of a completed contract. At most one per contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: ReviewId,
    pub contract_id: ContractId,
    pub player_id: AccountId,
    pub reviewer_id: AccountId,
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Builds a review for `contract`, enforcing who may review and when.
    pub fn for_contract(
        contract: &HireContract,
        reviewer_id: AccountId,
        rating: Rating,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        contract.ensure_reviewable(reviewer_id, now)?;

        Ok(Self {
            id: ReviewId::new(),
            contract_id: contract.id,
            player_id: contract.player_id,
            reviewer_id,
            rating,
            comment: comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert_eq!(Rating::try_from(0).unwrap().value(), 0);
        assert_eq!(Rating::try_from(5).unwrap().value(), 5);
        assert_eq!(Rating::try_from(6), Err(DomainError::InvalidRating(6)));
        assert_eq!(Rating::try_from(-1), Err(DomainError::InvalidRating(-1)));
    }

    #[test]
    fn test_rating_deserialization_is_validated() {
        let ok: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }
}
