//! Host reservation history: server-paginated listing with client-side ordering.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::workflows::ratings::domain::{HostId, RentalId};

pub const DEFAULT_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: RentalId,
    #[serde(default, alias = "marca")]
    pub brand: String,
    #[serde(default, alias = "modelo")]
    pub model: String,
    #[serde(default, alias = "nombreUsuario", alias = "cliente")]
    pub renter_name: String,
    #[serde(alias = "fechaInicio")]
    pub start_date: DateTime<Utc>,
    #[serde(alias = "fechaFin")]
    pub end_date: DateTime<Utc>,
    #[serde(default, alias = "estado")]
    pub status: String,
}

impl Reservation {
    pub fn vehicle(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
}

/// One page of reservations plus the overall count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationPage {
    pub data: Vec<Reservation>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl ReservationPage {
    pub fn total_pages(&self, page_size: u32) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.pagination.total.div_ceil(u64::from(page_size))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Vehicle,
    StartDate,
    EndDate,
    RenterName,
    Status,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vehicle" | "marca_modelo" => Some(Self::Vehicle),
            "start" | "start_date" | "fechainicio" => Some(Self::StartDate),
            "end" | "end_date" | "fechafin" => Some(Self::EndDate),
            "renter" | "renter_name" | "nombreusuario" => Some(Self::RenterName),
            "status" | "estado" => Some(Self::Status),
            _ => None,
        }
    }

    /// Key name understood by the backend's `sortKey` parameter.
    pub const fn wire_name(self) -> &'static str {
        match self {
            SortKey::Vehicle => "marca_modelo",
            SortKey::StartDate => "fechaInicio",
            SortKey::EndDate => "fechaFin",
            SortKey::RenterName => "nombreUsuario",
            SortKey::Status => "estado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub const fn wire_name(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    pub const fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    /// Clicking the same column again flips the direction; a new column starts ascending.
    pub fn toggled(current: Option<SortOrder>, key: SortKey) -> Self {
        match current {
            Some(order) if order.key == key && order.direction == SortDirection::Ascending => {
                Self {
                    key,
                    direction: SortDirection::Descending,
                }
            }
            _ => Self::ascending(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationQuery {
    pub host: HostId,
    pub page: u32,
    pub limit: u32,
    pub sort: Option<SortOrder>,
}

impl ReservationQuery {
    pub fn first_page(host: HostId) -> Self {
        Self {
            host,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

#[async_trait]
pub trait ReservationsGateway: Send + Sync {
    async fn reservations(&self, query: &ReservationQuery) -> Result<ReservationPage, ApiError>;
}

/// Stable in-place sort of a fetched page.
pub fn sort_reservations(reservations: &mut [Reservation], order: SortOrder) {
    reservations.sort_by(|left, right| {
        let ordering = compare(left, right, order.key);
        match order.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare(left: &Reservation, right: &Reservation, key: SortKey) -> Ordering {
    match key {
        SortKey::Vehicle => left
            .vehicle()
            .to_lowercase()
            .cmp(&right.vehicle().to_lowercase()),
        SortKey::StartDate => left.start_date.cmp(&right.start_date),
        SortKey::EndDate => left.end_date.cmp(&right.end_date),
        SortKey::RenterName => left
            .renter_name
            .to_lowercase()
            .cmp(&right.renter_name.to_lowercase()),
        SortKey::Status => left.status.to_lowercase().cmp(&right.status.to_lowercase()),
    }
}
