use std::sync::Arc;

use super::domain::{HostId, Rating, RatingId, RentalId, ScoreCategory};
use super::gateway::RatingsGateway;
use super::notify::{Confirmation, Notification, NotificationSink};
use super::roster::{RenterRoster, RosterError};
use super::session::{PendingSave, RatingPanel, RatingSession, SaveBlocker, SessionError};
use crate::api::ApiError;

/// Service composing the roster, the session state and the backend gateway.
pub struct RatingWorkflow<G, N> {
    gateway: Arc<G>,
    notifications: Arc<N>,
    session: RatingSession,
    roster: Option<RenterRoster>,
}

/// A confirmed deletion ready to be sent.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub rental_id: RentalId,
    pub rating_id: RatingId,
    pub renter_name: String,
}

impl PendingDelete {
    pub async fn send<G>(&self, gateway: &G) -> Result<(), ApiError>
    where
        G: RatingsGateway + ?Sized,
    {
        gateway.delete_rating(&self.rating_id).await
    }
}

impl<G, N> RatingWorkflow<G, N>
where
    G: RatingsGateway + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(gateway: Arc<G>, notifications: Arc<N>, session: RatingSession) -> Self {
        Self {
            gateway,
            notifications,
            session,
            roster: None,
        }
    }

    pub fn gateway(&self) -> Arc<G> {
        Arc::clone(&self.gateway)
    }

    pub fn session(&self) -> &RatingSession {
        &self.session
    }

    pub fn roster(&self) -> Option<&RenterRoster> {
        self.roster.as_ref()
    }

    /// Loads the roster for `host`. Only a host change triggers a fetch.
    pub async fn load_host(&mut self, host: &HostId) -> Result<&RenterRoster, WorkflowError> {
        let loaded = matches!(&self.roster, Some(roster) if roster.host() == host);
        if !loaded {
            self.reload(host).await?;
        }
        self.roster.as_ref().ok_or(WorkflowError::NotLoaded)
    }

    pub async fn reload(&mut self, host: &HostId) -> Result<(), WorkflowError> {
        self.session.close();
        match RenterRoster::load(self.gateway.as_ref(), host).await {
            Ok(roster) => {
                self.roster = Some(roster);
                Ok(())
            }
            Err(err) => {
                self.roster = None;
                tracing::error!(host = %host, error = ?err, "unable to load renter roster");
                self.notifications.notify(Notification::error(err.to_string()));
                Err(err.into())
            }
        }
    }

    pub fn select(&mut self, rental_id: &RentalId) -> Result<&RatingPanel, WorkflowError> {
        let roster = self.roster.as_ref().ok_or(WorkflowError::NotLoaded)?;
        let entry = roster
            .entry(rental_id)
            .ok_or_else(|| WorkflowError::UnknownRental(rental_id.clone()))?;
        let existing = roster.rating_for(rental_id);
        Ok(self.session.select(entry, existing)?)
    }

    pub fn update_score(&mut self, category: ScoreCategory, value: u8) -> Result<(), WorkflowError> {
        Ok(self.session.update_score(category, value)?)
    }

    pub fn update_comment(&mut self, text: impl Into<String>) -> Result<bool, WorkflowError> {
        Ok(self.session.update_comment(text)?)
    }

    pub fn close(&mut self) {
        self.session.close();
    }

    pub fn begin_save(&self) -> Result<PendingSave, WorkflowError> {
        let roster = self.roster.as_ref().ok_or(WorkflowError::NotLoaded)?;
        Ok(self.session.prepare_save(roster.host())?)
    }

    /// Applies the backend's answer to a save.
    ///
    /// The roster is reconciled with whatever the server accepted; the panel only
    /// closes if the save's ticket is still current.
    pub fn complete_save(
        &mut self,
        pending: PendingSave,
        outcome: Result<Rating, ApiError>,
    ) -> Result<Rating, WorkflowError> {
        match outcome {
            Ok(rating) => {
                if let Some(roster) = self
                    .roster
                    .as_mut()
                    .filter(|roster| roster.host() == &pending.payload.rater_id)
                {
                    roster.record_rating(rating.clone());
                }
                if !self.session.finish_save(&pending.ticket, &pending.rental_id) {
                    tracing::debug!(rental = %pending.rental_id, "save resolved after the panel moved on");
                }
                tracing::info!(
                    rental = %pending.rental_id,
                    rating = %rating.id,
                    updated = pending.existing.is_some(),
                    "rating saved"
                );
                self.notifications.notify(Notification::success(format!(
                    "Rating saved for {}",
                    pending.renter_name
                )));
                Ok(rating)
            }
            Err(err) => {
                tracing::error!(rental = %pending.rental_id, error = %err, "unable to save rating");
                self.notifications
                    .notify(Notification::error(format!("Error saving the rating: {err}")));
                Err(err.into())
            }
        }
    }

    pub async fn save(&mut self) -> Result<Rating, WorkflowError> {
        let pending = self.begin_save()?;
        let outcome = pending.send(self.gateway.as_ref()).await;
        self.complete_save(pending, outcome)
    }

    /// Checks the delete gates and asks for confirmation.
    pub fn begin_delete(
        &self,
        rental_id: &RentalId,
        confirmation: &dyn Confirmation,
    ) -> Result<PendingDelete, WorkflowError> {
        let roster = self.roster.as_ref().ok_or(WorkflowError::NotLoaded)?;
        let entry = roster
            .entry(rental_id)
            .ok_or_else(|| WorkflowError::UnknownRental(rental_id.clone()))?;
        self.session.check_delete(entry)?;
        let rating = roster
            .rating_for(rental_id)
            .ok_or_else(|| WorkflowError::MissingRating(rental_id.clone()))?;

        let renter_name = entry.renter.full_name();
        let prompt = format!("Are you sure you want to delete the rating for {renter_name}?");
        if !confirmation.confirm(&prompt) {
            return Err(WorkflowError::NotConfirmed);
        }

        Ok(PendingDelete {
            rental_id: rental_id.clone(),
            rating_id: rating.id.clone(),
            renter_name,
        })
    }

    pub fn complete_delete(
        &mut self,
        pending: PendingDelete,
        outcome: Result<(), ApiError>,
    ) -> Result<(), WorkflowError> {
        match outcome {
            Ok(()) => {
                if let Some(roster) = self.roster.as_mut() {
                    roster.forget_rating(&pending.rating_id);
                }
                self.session.close_for(&pending.rental_id);
                tracing::info!(rental = %pending.rental_id, rating = %pending.rating_id, "rating deleted");
                self.notifications.notify(Notification::success(format!(
                    "Rating deleted for {}",
                    pending.renter_name
                )));
                Ok(())
            }
            Err(err) => {
                tracing::error!(rental = %pending.rental_id, error = %err, "unable to delete rating");
                self.notifications
                    .notify(Notification::error(format!("Error deleting the rating: {err}")));
                Err(err.into())
            }
        }
    }

    pub async fn delete(
        &mut self,
        rental_id: &RentalId,
        confirmation: &dyn Confirmation,
    ) -> Result<(), WorkflowError> {
        let pending = self.begin_delete(rental_id, confirmation)?;
        let outcome = pending.send(self.gateway.as_ref()).await;
        self.complete_delete(pending, outcome)
    }
}

/// Error raised by the rating workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("no renter roster is loaded")]
    NotLoaded,
    #[error("rental {0} is not among the host's completed rentals")]
    UnknownRental(RentalId),
    #[error("no rating found for rental {0}")]
    MissingRating(RentalId),
    #[error("deletion was not confirmed")]
    NotConfirmed,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Blocked(#[from] SaveBlocker),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
