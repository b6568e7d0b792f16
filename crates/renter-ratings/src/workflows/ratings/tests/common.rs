use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::api::ApiError;
use crate::workflows::ratings::{
    CommentSanitizer, Confirmation, DayBoundary, FixedClock, HostId, Notification,
    NotificationSink, Rating, RatingId, RatingPayload, RatingSession, RatingWindow,
    RatingWorkflow, RatingsGateway, Rental, RentalId, Renter, RenterId, Score,
};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0)
        .single()
        .expect("valid instant")
}

/// A rental end instant `days` calendar days before `now()`.
pub(super) fn ended_days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days) + Duration::hours(6)
}

pub(super) fn host() -> HostId {
    HostId("host-1".to_string())
}

pub(super) fn rental_id(id: &str) -> RentalId {
    RentalId(id.to_string())
}

pub(super) fn renter(id: &str, first_name: &str, last_name: &str) -> Renter {
    Renter {
        id: RenterId(id.to_string()),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{id}@example.com"),
        phone: "70000000".to_string(),
        profile_picture: None,
    }
}

pub(super) fn rental(id: &str, renter: Renter, end: DateTime<Utc>) -> Rental {
    Rental {
        id: rental_id(id),
        renter_id: renter.id.clone(),
        start_date: end - Duration::days(4),
        end_date: end,
        status: "completed".to_string(),
        renter,
        vehicle_image: Some(format!("https://cdn.example.com/{id}.jpg")),
    }
}

pub(super) fn rating(id: &str, rental: &str, renter: &str, scores: [u8; 3]) -> Rating {
    Rating {
        id: RatingId(id.to_string()),
        rental_id: rental_id(rental),
        rater_id: host(),
        rated_id: RenterId(renter.to_string()),
        behavior_score: Score::new(scores[0]).expect("valid score"),
        car_care_score: Score::new(scores[1]).expect("valid score"),
        punctuality_score: Score::new(scores[2]).expect("valid score"),
        comment: Some("Todo en orden con el auto".to_string()),
        created_at: Some(now() - Duration::days(1)),
        updated_at: None,
        rater: None,
    }
}

/// Ana's rental ended two days ago, Bruno's three, Carla's ended long ago but was rated.
pub(super) fn seeded_gateway() -> Arc<MemoryGateway> {
    let gateway = MemoryGateway::default();
    gateway.set_rentals(vec![
        rental("res-ana", renter("ana", "Ana", "Rojas"), ended_days_ago(2)),
        rental("res-bruno", renter("bruno", "Bruno", "Díaz"), ended_days_ago(3)),
        rental("res-carla", renter("carla", "Carla", "Vega"), ended_days_ago(20)),
    ]);
    gateway.set_ratings(vec![rating("cal-carla", "res-carla", "carla", [4, 4, 3])]);
    Arc::new(gateway)
}

pub(super) fn session() -> RatingSession {
    RatingSession::new(
        RatingWindow::new(2, DayBoundary::Utc),
        Arc::new(FixedClock(now())),
        Arc::new(CommentSanitizer::default()),
    )
}

pub(super) fn workflow(
    gateway: Arc<MemoryGateway>,
) -> (RatingWorkflow<MemoryGateway, MemoryNotifications>, Arc<MemoryNotifications>) {
    let notifications = Arc::new(MemoryNotifications::default());
    let workflow = RatingWorkflow::new(gateway, notifications.clone(), session());
    (workflow, notifications)
}

pub(super) fn server_error(endpoint: &str) -> ApiError {
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status: 500,
        message: "Internal Server Error".to_string(),
    }
}

#[derive(Debug, Default)]
struct GatewayState {
    rentals: Vec<Rental>,
    ratings: Vec<Rating>,
    fail_rentals: bool,
    fail_ratings: bool,
    fail_writes: bool,
    rental_fetches: usize,
    creates: Vec<RatingPayload>,
    updates: Vec<(RatingId, RatingPayload)>,
    deletes: Vec<RatingId>,
    next_id: usize,
}

/// In-memory stand-in for the marketplace backend.
#[derive(Debug, Default)]
pub(super) struct MemoryGateway {
    state: Mutex<GatewayState>,
}

impl MemoryGateway {
    fn state(&self) -> std::sync::MutexGuard<'_, GatewayState> {
        self.state.lock().expect("gateway mutex poisoned")
    }

    pub(super) fn set_rentals(&self, rentals: Vec<Rental>) {
        self.state().rentals = rentals;
    }

    pub(super) fn set_ratings(&self, ratings: Vec<Rating>) {
        self.state().ratings = ratings;
    }

    pub(super) fn fail_rentals(&self) {
        self.state().fail_rentals = true;
    }

    pub(super) fn fail_ratings(&self) {
        self.state().fail_ratings = true;
    }

    pub(super) fn fail_writes(&self) {
        self.state().fail_writes = true;
    }

    pub(super) fn rental_fetches(&self) -> usize {
        self.state().rental_fetches
    }

    pub(super) fn creates(&self) -> Vec<RatingPayload> {
        self.state().creates.clone()
    }

    pub(super) fn updates(&self) -> Vec<(RatingId, RatingPayload)> {
        self.state().updates.clone()
    }

    pub(super) fn deletes(&self) -> Vec<RatingId> {
        self.state().deletes.clone()
    }

    pub(super) fn stored(&self) -> Vec<Rating> {
        self.state().ratings.clone()
    }
}

fn materialize(id: RatingId, payload: &RatingPayload) -> Rating {
    Rating {
        id,
        rental_id: payload.reservation_id.clone(),
        rater_id: payload.rater_id.clone(),
        rated_id: payload.ratee_id.clone(),
        behavior_score: payload.behavior_score,
        car_care_score: payload.car_care_score,
        punctuality_score: payload.punctuality_score,
        comment: Some(payload.comment.clone()),
        created_at: Some(now()),
        updated_at: None,
        rater: None,
    }
}

#[async_trait]
impl RatingsGateway for MemoryGateway {
    async fn completed_rentals(&self, _host: &HostId) -> Result<Vec<Rental>, ApiError> {
        let mut state = self.state();
        state.rental_fetches += 1;
        if state.fail_rentals {
            return Err(server_error("/api/rentals/completed"));
        }
        Ok(state.rentals.clone())
    }

    async fn ratings_by_rater(&self, host: &HostId) -> Result<Vec<Rating>, ApiError> {
        let state = self.state();
        if state.fail_ratings {
            return Err(server_error("/api/calificaciones"));
        }
        Ok(state
            .ratings
            .iter()
            .filter(|rating| &rating.rater_id == host)
            .cloned()
            .collect())
    }

    async fn ratings_for_renter(&self, renter: &RenterId) -> Result<Vec<Rating>, ApiError> {
        let state = self.state();
        Ok(state
            .ratings
            .iter()
            .filter(|rating| &rating.rated_id == renter)
            .cloned()
            .collect())
    }

    async fn create_rating(&self, payload: &RatingPayload) -> Result<Rating, ApiError> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(server_error("/api/calificaciones"));
        }
        state.next_id += 1;
        let rating = materialize(RatingId(format!("cal-new-{}", state.next_id)), payload);
        state.creates.push(payload.clone());
        state.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn update_rating(
        &self,
        id: &RatingId,
        payload: &RatingPayload,
    ) -> Result<Rating, ApiError> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(server_error("/api/calificaciones"));
        }
        let rating = materialize(id.clone(), payload);
        state.updates.push((id.clone(), payload.clone()));
        state.ratings.retain(|stored| &stored.id != id);
        state.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn delete_rating(&self, id: &RatingId) -> Result<(), ApiError> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(server_error("/api/calificaciones"));
        }
        state.deletes.push(id.clone());
        state.ratings.retain(|stored| &stored.id != id);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(super) struct MemoryNotifications {
    events: Mutex<Vec<Notification>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }

    pub(super) fn last(&self) -> Option<Notification> {
        self.events().pop()
    }
}

impl NotificationSink for MemoryNotifications {
    fn notify(&self, notification: Notification) {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
    }
}

/// Answers every prompt the same way and remembers what was asked.
#[derive(Debug)]
pub(super) struct FixedAnswer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl FixedAnswer {
    pub(super) fn yes() -> Self {
        Self {
            answer: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn no() -> Self {
        Self {
            answer: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt mutex poisoned").clone()
    }
}

impl Confirmation for FixedAnswer {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts
            .lock()
            .expect("prompt mutex poisoned")
            .push(prompt.to_string());
        self.answer
    }
}
