use serde::Serialize;

use super::domain::{round_tenth, Rating, RenterId};
use super::gateway::RatingsGateway;
use crate::api::ApiError;

/// What other hosts think of a renter, aggregated over every rating they received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenterReputation {
    pub renter_id: RenterId,
    /// Mean of per-rating averages, one decimal. `None` without ratings.
    pub average: Option<f32>,
    pub total: usize,
    pub ratings: Vec<Rating>,
}

impl RenterReputation {
    pub fn from_ratings(renter_id: RenterId, mut ratings: Vec<Rating>) -> Self {
        let total = ratings.len();
        let average = if total == 0 {
            None
        } else {
            let sum: f32 = ratings.iter().map(|rating| rating.scores().mean()).sum();
            Some(round_tenth(sum / total as f32))
        };

        // newest first; undated ratings last
        ratings.sort_by(|left, right| right.created_at.cmp(&left.created_at));

        Self {
            renter_id,
            average,
            total,
            ratings,
        }
    }

    pub async fn fetch<G>(gateway: &G, renter: &RenterId) -> Result<Self, ApiError>
    where
        G: RatingsGateway + ?Sized,
    {
        let ratings = gateway.ratings_for_renter(renter).await?;
        Ok(Self::from_ratings(renter.clone(), ratings))
    }

    pub fn stars(&self) -> u8 {
        self.average.map(|value| value.round() as u8).unwrap_or(0)
    }
}
