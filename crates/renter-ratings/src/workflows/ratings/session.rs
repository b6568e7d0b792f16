use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::clock::Clock;
use super::domain::{
    round_tenth, HostId, InvalidScore, Rating, RatingId, RatingPayload, RatingScores, RentalId,
    RosterEntry, Score, ScoreCategory,
};
use super::gateway::RatingsGateway;
use super::sanitizer::CommentSanitizer;
use super::window::RatingWindow;
use crate::api::ApiError;

pub const COMMENT_MIN_CHARS: usize = 10;
pub const COMMENT_MAX_CHARS: usize = 500;

/// Unsaved scores and comment owned by the open panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftRating {
    behavior: Option<Score>,
    car_care: Option<Score>,
    punctuality: Option<Score>,
    comment: String,
}

impl DraftRating {
    pub fn from_rating(rating: &Rating) -> Self {
        Self {
            behavior: Some(rating.behavior_score),
            car_care: Some(rating.car_care_score),
            punctuality: Some(rating.punctuality_score),
            comment: rating.comment_text().to_string(),
        }
    }

    pub fn score(&self, category: ScoreCategory) -> Option<Score> {
        match category {
            ScoreCategory::Behavior => self.behavior,
            ScoreCategory::CarCare => self.car_care,
            ScoreCategory::Punctuality => self.punctuality,
        }
    }

    /// Star value as displayed, 0 when unset.
    pub fn stars(&self, category: ScoreCategory) -> u8 {
        self.score(category).map(Score::get).unwrap_or(0)
    }

    fn set_score(&mut self, category: ScoreCategory, score: Score) {
        let slot = match category {
            ScoreCategory::Behavior => &mut self.behavior,
            ScoreCategory::CarCare => &mut self.car_care,
            ScoreCategory::Punctuality => &mut self.punctuality,
        };
        *slot = Some(score);
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn scores(&self) -> Option<RatingScores> {
        Some(RatingScores {
            behavior: self.behavior?,
            car_care: self.car_care?,
            punctuality: self.punctuality?,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.scores().is_some()
    }

    /// Average over the categories scored so far, 0.0 when none are.
    pub fn average(&self) -> f32 {
        let scored: Vec<u8> = ScoreCategory::ALL
            .iter()
            .filter_map(|category| self.score(*category).map(Score::get))
            .collect();
        if scored.is_empty() {
            return 0.0;
        }
        let sum: u16 = scored.iter().map(|value| u16::from(*value)).sum();
        round_tenth(f32::from(sum) / scored.len() as f32)
    }
}

/// Why the save action is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SaveBlocker {
    #[error("no renter is selected")]
    NoSelection,
    #[error("this rental has already been rated")]
    AlreadyRated,
    #[error("the rating window for this rental has closed")]
    WindowClosed,
    #[error("all three categories need a score")]
    IncompleteScores,
    #[error("comments need at least 10 characters")]
    CommentTooShort,
    #[error("comments are limited to 500 characters")]
    CommentTooLong,
    #[error("the comment contains offensive language")]
    OffensiveComment,
}

/// A rejected session transition. State is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no renter is selected")]
    NoSelection,
    #[error("the rating window for rental {0} has closed")]
    WindowClosed(RentalId),
    #[error("rental {0} is already rated and read-only")]
    AlreadyRated(RentalId),
    #[error("rental {0} has no rating to delete")]
    NotRated(RentalId),
    #[error(transparent)]
    InvalidScore(#[from] InvalidScore),
}

/// Validates comment length and content.
///
/// Only the empty string counts as "no comment"; whitespace-only text is too short.
pub fn check_comment(text: &str, sanitizer: &CommentSanitizer) -> Result<(), SaveBlocker> {
    if text.chars().count() > COMMENT_MAX_CHARS {
        return Err(SaveBlocker::CommentTooLong);
    }
    if !text.is_empty() && text.trim().chars().count() < COMMENT_MIN_CHARS {
        return Err(SaveBlocker::CommentTooShort);
    }
    if sanitizer.is_offensive(text) {
        return Err(SaveBlocker::OffensiveComment);
    }
    Ok(())
}

/// The renter currently open for viewing or editing.
#[derive(Debug, Clone)]
pub struct RatingPanel {
    entry: RosterEntry,
    existing: Option<Rating>,
    draft: DraftRating,
    offensive: bool,
}

impl RatingPanel {
    pub fn entry(&self) -> &RosterEntry {
        &self.entry
    }

    pub fn existing(&self) -> Option<&Rating> {
        self.existing.as_ref()
    }

    pub fn draft(&self) -> &DraftRating {
        &self.draft
    }

    pub fn is_rated(&self) -> bool {
        self.entry.rated
    }

    pub fn comment_flagged(&self) -> bool {
        self.offensive
    }
}

/// Invalidated whenever the panel is closed or another renter is selected.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    issued: u64,
    current: Arc<AtomicU64>,
}

impl SessionTicket {
    pub fn is_cancelled(&self) -> bool {
        self.current.load(Ordering::Acquire) != self.issued
    }
}

/// A validated save ready to be sent, detached from the session borrow.
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub ticket: SessionTicket,
    pub rental_id: RentalId,
    pub renter_name: String,
    pub existing: Option<RatingId>,
    pub payload: RatingPayload,
}

impl PendingSave {
    /// Updates when a rating was cached for the rental, creates otherwise.
    pub async fn send<G>(&self, gateway: &G) -> Result<Rating, ApiError>
    where
        G: RatingsGateway + ?Sized,
    {
        match &self.existing {
            Some(id) => gateway.update_rating(id, &self.payload).await,
            None => gateway.create_rating(&self.payload).await,
        }
    }
}

/// Selection and draft state for one host session.
///
/// Idle while `panel` is `None`. Every gate consults the rating window against
/// the injected clock at the moment of the call.
pub struct RatingSession {
    window: RatingWindow,
    clock: Arc<dyn Clock>,
    sanitizer: Arc<CommentSanitizer>,
    panel: Option<RatingPanel>,
    epoch: Arc<AtomicU64>,
}

impl RatingSession {
    pub fn new(window: RatingWindow, clock: Arc<dyn Clock>, sanitizer: Arc<CommentSanitizer>) -> Self {
        Self {
            window,
            clock,
            sanitizer,
            panel: None,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn window(&self) -> RatingWindow {
        self.window
    }

    pub fn sanitizer(&self) -> &CommentSanitizer {
        &self.sanitizer
    }

    pub fn panel(&self) -> Option<&RatingPanel> {
        self.panel.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.panel.is_none()
    }

    pub fn is_eligible(&self, entry: &RosterEntry) -> bool {
        self.window.is_open(entry.rental_end, self.clock.now())
    }

    /// Rated entries stay viewable after the window closes.
    pub fn can_select(&self, entry: &RosterEntry) -> bool {
        entry.rated || self.is_eligible(entry)
    }

    pub fn ticket(&self) -> SessionTicket {
        SessionTicket {
            issued: self.epoch.load(Ordering::Acquire),
            current: Arc::clone(&self.epoch),
        }
    }

    fn advance(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }

    pub fn select(
        &mut self,
        entry: &RosterEntry,
        existing: Option<&Rating>,
    ) -> Result<&RatingPanel, SessionError> {
        if !self.can_select(entry) {
            return Err(SessionError::WindowClosed(entry.rental_id.clone()));
        }

        self.advance();
        let draft = existing.map(DraftRating::from_rating).unwrap_or_default();
        let offensive = self.sanitizer.is_offensive(&draft.comment);
        Ok(&*self.panel.insert(RatingPanel {
            entry: entry.clone(),
            existing: existing.cloned(),
            draft,
            offensive,
        }))
    }

    pub fn update_score(&mut self, category: ScoreCategory, value: u8) -> Result<(), SessionError> {
        let now = self.clock.now();
        let panel = self.panel.as_mut().ok_or(SessionError::NoSelection)?;
        if panel.entry.rated {
            return Err(SessionError::AlreadyRated(panel.entry.rental_id.clone()));
        }
        if !self.window.is_open(panel.entry.rental_end, now) {
            return Err(SessionError::WindowClosed(panel.entry.rental_id.clone()));
        }

        let score = Score::new(value)?;
        panel.draft.set_score(category, score);
        Ok(())
    }

    /// Replaces the draft comment and returns whether it is flagged offensive.
    pub fn update_comment(&mut self, text: impl Into<String>) -> Result<bool, SessionError> {
        let now = self.clock.now();
        let panel = self.panel.as_mut().ok_or(SessionError::NoSelection)?;
        if panel.entry.rated && !self.window.is_open(panel.entry.rental_end, now) {
            return Err(SessionError::WindowClosed(panel.entry.rental_id.clone()));
        }

        panel.draft.comment = text.into();
        panel.offensive = self.sanitizer.is_offensive(&panel.draft.comment);
        Ok(panel.offensive)
    }

    pub fn check_save(&self) -> Result<(), SaveBlocker> {
        let panel = self.panel.as_ref().ok_or(SaveBlocker::NoSelection)?;
        if panel.entry.rated {
            return Err(SaveBlocker::AlreadyRated);
        }
        if !self.is_eligible(&panel.entry) {
            return Err(SaveBlocker::WindowClosed);
        }
        if !panel.draft.is_complete() {
            return Err(SaveBlocker::IncompleteScores);
        }
        check_comment(&panel.draft.comment, &self.sanitizer)
    }

    pub fn can_save(&self) -> bool {
        self.check_save().is_ok()
    }

    /// Builds the request for the open panel. The comment is cleaned once more
    /// so the masked variant is what gets persisted.
    pub fn prepare_save(&self, rater: &HostId) -> Result<PendingSave, SaveBlocker> {
        self.check_save()?;
        let panel = self.panel.as_ref().ok_or(SaveBlocker::NoSelection)?;
        let scores = panel.draft.scores().ok_or(SaveBlocker::IncompleteScores)?;

        Ok(PendingSave {
            ticket: self.ticket(),
            rental_id: panel.entry.rental_id.clone(),
            renter_name: panel.entry.renter.full_name(),
            existing: panel.existing.as_ref().map(|rating| rating.id.clone()),
            payload: RatingPayload {
                behavior_score: scores.behavior,
                car_care_score: scores.car_care,
                punctuality_score: scores.punctuality,
                comment: self.sanitizer.clean(panel.draft.comment.trim()),
                reservation_id: panel.entry.rental_id.clone(),
                rater_id: rater.clone(),
                ratee_id: panel.entry.renter.id.clone(),
            },
        })
    }

    /// Closes the panel for a completed save unless the ticket was invalidated meanwhile.
    pub fn finish_save(&mut self, ticket: &SessionTicket, rental_id: &RentalId) -> bool {
        if ticket.is_cancelled() {
            return false;
        }
        self.close_for(rental_id)
    }

    pub fn check_delete(&self, entry: &RosterEntry) -> Result<(), SessionError> {
        if !entry.rated {
            return Err(SessionError::NotRated(entry.rental_id.clone()));
        }
        if !self.is_eligible(entry) {
            return Err(SessionError::WindowClosed(entry.rental_id.clone()));
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.advance();
        self.panel = None;
    }

    pub fn close_for(&mut self, rental_id: &RentalId) -> bool {
        let open_for_rental = self
            .panel
            .as_ref()
            .is_some_and(|panel| &panel.entry.rental_id == rental_id);
        if open_for_rental {
            self.close();
        }
        open_for_rental
    }
}
