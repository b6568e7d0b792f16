//! Comment history: reviews renters left about a host's cars.
//!
//! The backend returns the full list in one response. Car details are joined
//! per review, then searching, ordering and paging all happen locally.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::workflows::ratings::domain::{HostId, RentalId, RenterId};
use crate::workflows::reservations::SortDirection;
use crate::workflows::vehicles::CarImage;

pub const REVIEWS_PER_PAGE: usize = 4;

/// Car details attached to a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCar {
    #[serde(default, alias = "marca")]
    pub brand: String,
    #[serde(default, alias = "modelo")]
    pub model: String,
    #[serde(default, alias = "año")]
    pub year: Option<i32>,
    #[serde(default, alias = "imagenes")]
    pub images: Vec<CarImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub renter_id: RenterId,
    pub host_id: HostId,
    pub reservation_id: RentalId,
    #[serde(default)]
    pub car_id: Option<String>,
    pub rating: f64,
    #[serde(default)]
    pub behavior_rating: u8,
    #[serde(default)]
    pub car_care_rating: u8,
    #[serde(default)]
    pub punctuality_rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub host_name: String,
    #[serde(default)]
    pub renter_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car: Option<ReviewCar>,
}

impl Review {
    /// `"brand model"` of the joined car, blank parts when the car is unknown.
    pub fn vehicle_name(&self) -> String {
        match &self.car {
            Some(car) => format!("{} {}", car.brand, car.model),
            None => " ".to_string(),
        }
    }

    pub fn comment_text(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }
}

#[async_trait]
pub trait ReviewsGateway: Send + Sync {
    async fn host_reviews(&self, host: &HostId) -> Result<Vec<Review>, ApiError>;

    async fn car(&self, car_id: &str) -> Result<ReviewCar, ApiError>;
}

/// Loads the host's reviews and attaches car details.
///
/// Each distinct car is fetched once. A failed car lookup only drops the car
/// from the affected reviews.
pub async fn fetch_history<G>(gateway: &G, host: &HostId) -> Result<Vec<Review>, ApiError>
where
    G: ReviewsGateway + ?Sized,
{
    let mut reviews = gateway.host_reviews(host).await?;
    let mut cars: HashMap<String, Option<ReviewCar>> = HashMap::new();

    for review in &mut reviews {
        let Some(car_id) = review.car_id.clone() else {
            continue;
        };
        if !cars.contains_key(&car_id) {
            let car = match gateway.car(&car_id).await {
                Ok(car) => Some(car),
                Err(err) => {
                    tracing::warn!(car = %car_id, error = %err, "car details unavailable");
                    None
                }
            };
            cars.insert(car_id.clone(), car);
        }
        review.car = cars.get(&car_id).cloned().flatten();
    }

    tracing::debug!(host = %host, reviews = reviews.len(), cars = cars.len(), "review history loaded");
    Ok(reviews)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSortKey {
    #[default]
    Date,
    Rating,
    Vehicle,
}

impl ReviewSortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date" | "fecha" => Some(Self::Date),
            "rating" | "calificacion" => Some(Self::Rating),
            "vehicle" | "name" | "alfabetico" => Some(Self::Vehicle),
            _ => None,
        }
    }
}

/// Newest first unless asked otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOrder {
    pub key: ReviewSortKey,
    pub direction: SortDirection,
}

impl Default for ReviewOrder {
    fn default() -> Self {
        Self {
            key: ReviewSortKey::Date,
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewFilter {
    /// Matched case-insensitively against the car's brand or model.
    pub search: Option<String>,
    /// Inclusive creation-date range, used only when both ends are set.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub min_rating: Option<f64>,
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        if let Some(term) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        {
            let term = term.to_lowercase();
            let hit = review.car.as_ref().is_some_and(|car| {
                car.brand.to_lowercase().contains(&term) || car.model.to_lowercase().contains(&term)
            });
            if !hit {
                return false;
            }
        }

        if let (Some(from), Some(to)) = (self.from, self.to) {
            let day = review.created_at.date_naive();
            if day < from || day > to {
                return false;
            }
        }

        self.min_rating.map_or(true, |min| review.rating >= min)
    }
}

/// Filters then orders, leaving `reviews` untouched.
pub fn select_reviews(reviews: &[Review], filter: &ReviewFilter, order: ReviewOrder) -> Vec<Review> {
    let mut selected: Vec<Review> = reviews
        .iter()
        .filter(|review| filter.matches(review))
        .cloned()
        .collect();
    selected.sort_by(|left, right| {
        let ordering = compare(left, right, order.key);
        match order.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    selected
}

fn compare(left: &Review, right: &Review, key: ReviewSortKey) -> Ordering {
    match key {
        ReviewSortKey::Date => left.created_at.cmp(&right.created_at),
        ReviewSortKey::Rating => left.rating.total_cmp(&right.rating),
        ReviewSortKey::Vehicle => left
            .vehicle_name()
            .to_lowercase()
            .cmp(&right.vehicle_name().to_lowercase()),
    }
}

/// One page of an already selected list. Pages start at 1; page 0 reads as 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewPage<'a> {
    pub items: &'a [Review],
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

pub fn paginate(reviews: &[Review], page: usize, per_page: usize) -> ReviewPage<'_> {
    let page = page.max(1);
    let total = reviews.len();
    let total_pages = if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };
    let start = (page - 1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);

    ReviewPage {
        items: &reviews[start..end],
        page,
        total_pages,
        total,
    }
}
