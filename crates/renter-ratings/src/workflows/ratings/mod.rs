//! Renter rating workflow: window policy, roster aggregation, draft session and persistence.

pub mod clock;
pub mod domain;
pub mod gateway;
pub mod notify;
pub mod reputation;
pub mod roster;
pub mod sanitizer;
pub mod service;
pub mod session;
pub mod window;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    HostId, InvalidScore, RaterSummary, Rating, RatingId, RatingPayload, RatingScores, Rental,
    RentalId, Renter, RenterId, RosterEntry, Score, ScoreCategory,
};
pub use gateway::RatingsGateway;
pub use notify::{Confirmation, Notification, NotificationLevel, NotificationSink};
pub use reputation::RenterReputation;
pub use roster::{RenterRoster, RosterError};
pub use sanitizer::CommentSanitizer;
pub use service::{PendingDelete, RatingWorkflow, WorkflowError};
pub use session::{
    check_comment, DraftRating, PendingSave, RatingPanel, RatingSession, SaveBlocker,
    SessionError, SessionTicket,
};
pub use window::{DayBoundary, RatingWindow};
