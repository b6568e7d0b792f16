use async_trait::async_trait;

use super::domain::{HostId, Rating, RatingId, RatingPayload, Rental, RenterId};
use crate::api::ApiError;

/// Backend operations the rating workflow depends on.
///
/// Whether a save becomes `create_rating` or `update_rating` is decided by the
/// caller from its locally cached ratings. Two sessions rating the same rental
/// at once can therefore both issue a create; the backend's own constraint is
/// the only guard.
#[async_trait]
pub trait RatingsGateway: Send + Sync {
    async fn completed_rentals(&self, host: &HostId) -> Result<Vec<Rental>, ApiError>;
    async fn ratings_by_rater(&self, host: &HostId) -> Result<Vec<Rating>, ApiError>;
    async fn ratings_for_renter(&self, renter: &RenterId) -> Result<Vec<Rating>, ApiError>;
    async fn create_rating(&self, payload: &RatingPayload) -> Result<Rating, ApiError>;
    async fn update_rating(&self, id: &RatingId, payload: &RatingPayload)
        -> Result<Rating, ApiError>;
    async fn delete_rating(&self, id: &RatingId) -> Result<(), ApiError>;
}
