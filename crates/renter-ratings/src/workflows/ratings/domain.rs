use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the host (car owner) using the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(pub String);

/// Identifier of a renter account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenterId(pub String);

/// Identifier of a rental (reservation).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RentalId(pub String);

/// Identifier assigned by the backend to a persisted rating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingId(pub String);

macro_rules! display_inner {
    ($($id:ty),*) => {
        $(impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })*
    };
}

display_inner!(HostId, RenterId, RentalId, RatingId);

/// Renter profile as embedded in rental records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Renter {
    pub id: RenterId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl Renter {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Completed rental as returned by `/api/rentals/completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub id: RentalId,
    #[serde(default)]
    pub renter_id: RenterId,
    #[serde(alias = "fechaInicio")]
    pub start_date: DateTime<Utc>,
    #[serde(alias = "fechaFin")]
    pub end_date: DateTime<Utc>,
    #[serde(alias = "estado")]
    pub status: String,
    pub renter: Renter,
    #[serde(default)]
    pub vehicle_image: Option<String>,
}

/// Star value for one rating category, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, InvalidScore> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidScore(value))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = InvalidScore;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("score must be between 1 and 5, got {0}")]
pub struct InvalidScore(pub u8);

/// The three aspects a host rates a renter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreCategory {
    Behavior,
    CarCare,
    Punctuality,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 3] = [
        ScoreCategory::Behavior,
        ScoreCategory::CarCare,
        ScoreCategory::Punctuality,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ScoreCategory::Behavior => "behavior",
            ScoreCategory::CarCare => "car care",
            ScoreCategory::Punctuality => "punctuality",
        }
    }
}

/// A complete set of category scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingScores {
    pub behavior: Score,
    pub car_care: Score,
    pub punctuality: Score,
}

impl RatingScores {
    pub fn get(&self, category: ScoreCategory) -> Score {
        match category {
            ScoreCategory::Behavior => self.behavior,
            ScoreCategory::CarCare => self.car_care,
            ScoreCategory::Punctuality => self.punctuality,
        }
    }

    pub(crate) fn mean(&self) -> f32 {
        let sum = u16::from(self.behavior.get())
            + u16::from(self.car_care.get())
            + u16::from(self.punctuality.get());
        f32::from(sum) / 3.0
    }

    /// Mean of the three categories rounded to one decimal.
    pub fn average(&self) -> f32 {
        round_tenth(self.mean())
    }

    /// Whole stars shown for the average.
    pub fn stars(&self) -> u8 {
        self.average().round() as u8
    }
}

pub(crate) fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Who wrote a rating, when the backend embeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaterSummary {
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Persisted rating (calificación) of a renter for one rental.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: RatingId,
    #[serde(alias = "reservationId", alias = "reservaId")]
    pub rental_id: RentalId,
    #[serde(default, alias = "calificadorId", alias = "hostId")]
    pub rater_id: HostId,
    #[serde(default, alias = "calificadoId", alias = "renterId")]
    pub rated_id: RenterId,
    #[serde(alias = "comportamiento", alias = "behaviorRating")]
    pub behavior_score: Score,
    #[serde(alias = "cuidadoVehiculo", alias = "carCareRating")]
    pub car_care_score: Score,
    #[serde(alias = "puntualidad", alias = "punctualityRating")]
    pub punctuality_score: Score,
    #[serde(default, alias = "comentario")]
    pub comment: Option<String>,
    #[serde(default, alias = "fechaCreacion")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "calificador")]
    pub rater: Option<RaterSummary>,
}

impl Rating {
    pub fn scores(&self) -> RatingScores {
        RatingScores {
            behavior: self.behavior_score,
            car_care: self.car_care_score,
            punctuality: self.punctuality_score,
        }
    }

    pub fn average(&self) -> f32 {
        self.scores().average()
    }

    pub fn comment_text(&self) -> &str {
        self.comment.as_deref().unwrap_or_default()
    }
}

/// Request body for creating or replacing a rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPayload {
    pub behavior_score: Score,
    pub car_care_score: Score,
    pub punctuality_score: Score,
    pub comment: String,
    pub reservation_id: RentalId,
    pub rater_id: HostId,
    pub ratee_id: RenterId,
}

/// One row of the host's renter list: a renter paired with one completed rental.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub renter: Renter,
    pub rental_id: RentalId,
    pub rental_end: DateTime<Utc>,
    pub vehicle_image: Option<String>,
    pub rated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn score_rejects_values_outside_range() {
        assert_eq!(Score::new(0), Err(InvalidScore(0)));
        assert_eq!(Score::new(6), Err(InvalidScore(6)));
        assert_eq!(Score::new(5).map(Score::get), Ok(5));
    }

    #[test]
    fn rating_accepts_backend_spanish_fields() {
        let rating: Rating = serde_json::from_value(json!({
            "id": "cal-1",
            "reservationId": "res-9",
            "calificadorId": "host-1",
            "calificadoId": "renter-3",
            "comportamiento": 5,
            "cuidadoVehiculo": 4,
            "puntualidad": 5,
            "comentario": "Buen cliente, cuidadoso",
            "fechaCreacion": "2025-05-02T10:00:00Z",
            "calificador": { "nombre": "Ana", "image": null }
        }))
        .expect("rating decodes");

        assert_eq!(rating.rental_id, RentalId("res-9".to_string()));
        assert_eq!(rating.rater_id, HostId("host-1".to_string()));
        assert_eq!(rating.behavior_score.get(), 5);
        assert_eq!(rating.comment_text(), "Buen cliente, cuidadoso");
        assert_eq!(rating.average(), 4.7);
        assert_eq!(rating.scores().stars(), 5);
        assert_eq!(
            rating.rater.and_then(|rater| rater.name).as_deref(),
            Some("Ana")
        );
    }

    #[test]
    fn rating_rejects_out_of_range_scores() {
        let result = serde_json::from_value::<Rating>(json!({
            "id": "cal-1",
            "reservationId": "res-9",
            "comportamiento": 7,
            "cuidadoVehiculo": 4,
            "puntualidad": 5
        }));
        assert!(result.is_err());
    }

    #[test]
    fn payload_serializes_camel_case_body() {
        let payload = RatingPayload {
            behavior_score: Score::new(5).expect("valid"),
            car_care_score: Score::new(4).expect("valid"),
            punctuality_score: Score::new(5).expect("valid"),
            comment: "Buen cliente".to_string(),
            reservation_id: RentalId("res-1".to_string()),
            rater_id: HostId("host-1".to_string()),
            ratee_id: RenterId("renter-1".to_string()),
        };

        let body = serde_json::to_value(&payload).expect("serializes");
        assert_eq!(
            body,
            json!({
                "behaviorScore": 5,
                "carCareScore": 4,
                "punctualityScore": 5,
                "comment": "Buen cliente",
                "reservationId": "res-1",
                "raterId": "host-1",
                "rateeId": "renter-1"
            })
        );
    }
}
