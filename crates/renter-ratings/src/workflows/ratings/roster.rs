use std::collections::HashSet;

use super::domain::{HostId, Rating, RatingId, Rental, RentalId, RenterId, RosterEntry};
use super::gateway::RatingsGateway;
use crate::api::ApiError;

/// The host's completed rentals joined with the ratings they already wrote.
#[derive(Debug, Clone, Default)]
pub struct RenterRoster {
    host: HostId,
    entries: Vec<RosterEntry>,
    ratings: Vec<Rating>,
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("could not load data, are you authenticated?")]
    Unavailable {
        #[source]
        source: ApiError,
    },
}

impl RenterRoster {
    /// Fetches both collections; either one failing fails the whole load.
    pub async fn load<G>(gateway: &G, host: &HostId) -> Result<Self, RosterError>
    where
        G: RatingsGateway + ?Sized,
    {
        let rentals = gateway
            .completed_rentals(host)
            .await
            .map_err(|source| RosterError::Unavailable { source })?;
        let ratings = gateway
            .ratings_by_rater(host)
            .await
            .map_err(|source| RosterError::Unavailable { source })?;

        let roster = Self::assemble(host.clone(), rentals, ratings);
        tracing::info!(
            host = %host,
            entries = roster.entries.len(),
            ratings = roster.ratings.len(),
            "renter roster loaded"
        );
        Ok(roster)
    }

    /// One entry per distinct (renter, rental) pair, in rental order.
    pub fn assemble(host: HostId, rentals: Vec<Rental>, ratings: Vec<Rating>) -> Self {
        let rated: HashSet<&RentalId> = ratings.iter().map(|rating| &rating.rental_id).collect();
        let mut seen: HashSet<(RenterId, RentalId)> = HashSet::new();
        let mut entries = Vec::with_capacity(rentals.len());

        for rental in rentals {
            let key = (rental.renter.id.clone(), rental.id.clone());
            if !seen.insert(key) {
                continue;
            }
            let is_rated = rated.contains(&rental.id);
            entries.push(RosterEntry {
                renter: rental.renter,
                rental_id: rental.id,
                rental_end: rental.end_date,
                vehicle_image: rental.vehicle_image,
                rated: is_rated,
            });
        }

        Self {
            host,
            entries,
            ratings,
        }
    }

    pub fn host(&self) -> &HostId {
        &self.host
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, rental_id: &RentalId) -> Option<&RosterEntry> {
        self.entries
            .iter()
            .find(|entry| &entry.rental_id == rental_id)
    }

    pub fn rating_for(&self, rental_id: &RentalId) -> Option<&Rating> {
        self.ratings
            .iter()
            .find(|rating| &rating.rental_id == rental_id)
    }

    /// Replaces the cached rating for the same id or rental and marks the entry rated.
    pub(crate) fn record_rating(&mut self, rating: Rating) {
        self.set_rated(&rating.rental_id, true);
        match self
            .ratings
            .iter()
            .position(|cached| cached.id == rating.id || cached.rental_id == rating.rental_id)
        {
            Some(index) => self.ratings[index] = rating,
            None => self.ratings.push(rating),
        }
    }

    pub(crate) fn forget_rating(&mut self, rating_id: &RatingId) -> Option<Rating> {
        let index = self
            .ratings
            .iter()
            .position(|rating| &rating.id == rating_id)?;
        let removed = self.ratings.remove(index);
        self.set_rated(&removed.rental_id, false);
        Some(removed)
    }

    fn set_rated(&mut self, rental_id: &RentalId, rated: bool) {
        for entry in self
            .entries
            .iter_mut()
            .filter(|entry| &entry.rental_id == rental_id)
        {
            entry.rated = rated;
        }
    }
}
