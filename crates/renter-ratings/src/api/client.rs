use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::ApiError;
use crate::config::ApiConfig;
use crate::workflows::ratings::domain::{HostId, Rating, RatingId, RatingPayload, Rental, RenterId};
use crate::workflows::ratings::gateway::RatingsGateway;
use crate::workflows::reservations::{ReservationPage, ReservationQuery, ReservationsGateway};
use crate::workflows::reviews::{Review, ReviewCar, ReviewsGateway};
use crate::workflows::vehicles::{HostCars, HostCarsGateway};

const COMPLETED_RENTALS_PATH: &str = "/api/rentals/completed";
const RATINGS_PATH: &str = "/api/calificaciones";
const RESERVATIONS_PATH: &str = "/api/reservations";
const REVIEWS_PATH: &str = "/api/reviews";
const CARS_PATH: &str = "/api/cars";
const HOST_CARS_PATH: &str = "/api/host-cars";

/// reqwest-backed client for the marketplace REST API.
///
/// Session credentials travel as a `Cookie` header on every request. Non-2xx
/// responses are turned into [`ApiError::Status`] carrying the server's
/// `error`/`message` field when one is present; nothing is retried.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie).map_err(|_| ApiError::InvalidCookie)?;
            headers.insert(COOKIE, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url,
            if path.starts_with('/') { "" } else { "/" },
            path
        )
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|source| {
            tracing::error!(%endpoint, error = %source, "backend request failed");
            ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = server_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        tracing::warn!(%endpoint, status = status.as_u16(), %message, "backend rejected request");

        Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, ApiError> {
        response.json::<T>().await.map_err(|source| {
            tracing::error!(%endpoint, error = %source, "unable to decode backend response");
            ApiError::Decode {
                endpoint: endpoint.to_string(),
                source,
            }
        })
    }

    async fn list_ratings(&self, filter: (&str, &str)) -> Result<Vec<Rating>, ApiError> {
        let endpoint = format!("GET {RATINGS_PATH}");
        let request = self.http.get(self.url(RATINGS_PATH)).query(&[filter]);
        let response = self.send(&endpoint, request).await?;
        Self::decode(&endpoint, response).await
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .or(parsed.message)
        .filter(|message| !message.trim().is_empty())
}

#[async_trait]
impl RatingsGateway for BackendClient {
    #[tracing::instrument(skip(self), fields(host = %host))]
    async fn completed_rentals(&self, host: &HostId) -> Result<Vec<Rental>, ApiError> {
        let endpoint = format!("GET {COMPLETED_RENTALS_PATH}");
        let request = self
            .http
            .get(self.url(COMPLETED_RENTALS_PATH))
            .query(&[("hostId", host.0.as_str())]);
        let response = self.send(&endpoint, request).await?;
        Self::decode(&endpoint, response).await
    }

    #[tracing::instrument(skip(self), fields(host = %host))]
    async fn ratings_by_rater(&self, host: &HostId) -> Result<Vec<Rating>, ApiError> {
        self.list_ratings(("calificadorId", host.0.as_str())).await
    }

    #[tracing::instrument(skip(self), fields(renter = %renter))]
    async fn ratings_for_renter(&self, renter: &RenterId) -> Result<Vec<Rating>, ApiError> {
        self.list_ratings(("calificadoId", renter.0.as_str())).await
    }

    #[tracing::instrument(skip(self, payload), fields(rental = %payload.reservation_id))]
    async fn create_rating(&self, payload: &RatingPayload) -> Result<Rating, ApiError> {
        let endpoint = format!("POST {RATINGS_PATH}");
        let request = self.http.post(self.url(RATINGS_PATH)).json(payload);
        let response = self.send(&endpoint, request).await?;
        Self::decode(&endpoint, response).await
    }

    #[tracing::instrument(skip(self, payload), fields(rating = %id))]
    async fn update_rating(&self, id: &RatingId, payload: &RatingPayload) -> Result<Rating, ApiError> {
        let path = format!("{RATINGS_PATH}/{id}");
        let endpoint = format!("PUT {path}");
        let request = self.http.put(self.url(&path)).json(payload);
        let response = self.send(&endpoint, request).await?;
        Self::decode(&endpoint, response).await
    }

    #[tracing::instrument(skip(self), fields(rating = %id))]
    async fn delete_rating(&self, id: &RatingId) -> Result<(), ApiError> {
        let path = format!("{RATINGS_PATH}/{id}");
        let endpoint = format!("DELETE {path}");
        self.send(&endpoint, self.http.delete(self.url(&path)))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl ReservationsGateway for BackendClient {
    #[tracing::instrument(skip(self, query), fields(host = %query.host, page = query.page))]
    async fn reservations(&self, query: &ReservationQuery) -> Result<ReservationPage, ApiError> {
        let endpoint = format!("GET {RESERVATIONS_PATH}");
        let page = query.page.max(1).to_string();
        let limit = query.limit.to_string();
        let (sort_key, sort_direction) = match &query.sort {
            Some(order) => (order.key.wire_name(), order.direction.wire_name()),
            None => ("", ""),
        };

        let request = self.http.get(self.url(RESERVATIONS_PATH)).query(&[
            ("hostId", query.host.0.as_str()),
            ("page", page.as_str()),
            ("limit", limit.as_str()),
            ("sortKey", sort_key),
            ("sortDirection", sort_direction),
        ]);
        let response = self.send(&endpoint, request).await?;
        Self::decode(&endpoint, response).await
    }
}

#[async_trait]
impl ReviewsGateway for BackendClient {
    #[tracing::instrument(skip(self), fields(host = %host))]
    async fn host_reviews(&self, host: &HostId) -> Result<Vec<Review>, ApiError> {
        let endpoint = format!("GET {REVIEWS_PATH}");
        let request = self
            .http
            .get(self.url(REVIEWS_PATH))
            .query(&[("hostId", host.0.as_str())]);
        let response = self.send(&endpoint, request).await?;
        Self::decode(&endpoint, response).await
    }

    #[tracing::instrument(skip(self))]
    async fn car(&self, car_id: &str) -> Result<ReviewCar, ApiError> {
        let path = format!("{CARS_PATH}/{car_id}");
        let endpoint = format!("GET {path}");
        let response = self.send(&endpoint, self.http.get(self.url(&path))).await?;
        Self::decode(&endpoint, response).await
    }
}

#[async_trait]
impl HostCarsGateway for BackendClient {
    #[tracing::instrument(skip(self), fields(host = %host))]
    async fn host_cars(&self, host: &HostId) -> Result<HostCars, ApiError> {
        let path = format!("{HOST_CARS_PATH}/{host}");
        let endpoint = format!("GET {path}");
        let response = self.send(&endpoint, self.http.get(self.url(&path))).await?;
        Self::decode(&endpoint, response).await
    }
}
