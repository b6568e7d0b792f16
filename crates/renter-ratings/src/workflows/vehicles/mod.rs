//! Cars a host has listed on the marketplace.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::workflows::ratings::domain::HostId;

const UNKNOWN_CITY: &str = "Ciudad no especificada";
const UNKNOWN_FUEL: &str = "No especificado";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct City {
    #[serde(alias = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fuel {
    #[serde(alias = "tipoDeCombustible")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(alias = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarImage {
    pub url: String,
}

/// Badge shown next to a car, derived from its backend `estado`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Reserved,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: u64,
    #[serde(default)]
    pub vin: String,
    #[serde(default, alias = "año")]
    pub year: Option<i32>,
    #[serde(default, alias = "marca")]
    pub brand: String,
    #[serde(default, alias = "modelo")]
    pub model: String,
    #[serde(default, alias = "placa")]
    pub plate: String,
    #[serde(default, alias = "asientos")]
    pub seats: u32,
    #[serde(default, alias = "puertas")]
    pub doors: u32,
    #[serde(default)]
    pub soat: bool,
    #[serde(default, alias = "precio_por_dia")]
    pub daily_price: f64,
    #[serde(default, alias = "num_mantenimientos")]
    pub maintenance_count: u32,
    #[serde(default, alias = "transmision")]
    pub transmission: String,
    #[serde(default, alias = "estado")]
    pub status: String,
    #[serde(default, alias = "direccion")]
    pub address: String,
    #[serde(default, alias = "num_casa")]
    pub house_number: Option<String>,
    #[serde(default, alias = "ciudad")]
    pub city: Option<City>,
    #[serde(default, alias = "combustibles")]
    pub fuels: Vec<Fuel>,
    #[serde(default, alias = "caracteristicas")]
    pub features: Vec<Feature>,
    #[serde(default, alias = "imagenes")]
    pub images: Vec<CarImage>,
}

impl Car {
    pub fn name(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }

    pub fn city_name(&self) -> &str {
        self.city
            .as_ref()
            .map(|city| city.name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_CITY)
    }

    /// First listed fuel type.
    pub fn fuel(&self) -> &str {
        self.fuels
            .first()
            .map(|fuel| fuel.kind.as_str())
            .unwrap_or(UNKNOWN_FUEL)
    }

    pub fn availability(&self) -> Availability {
        match self.status.trim().to_lowercase().as_str() {
            "disponible" | "available" => Availability::Available,
            "reservado" | "reserved" => Availability::Reserved,
            _ => Availability::Unavailable,
        }
    }

    pub fn has_plate(&self) -> bool {
        !self.plate.trim().is_empty()
    }
}

/// The host's fleet plus the backend's summary counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HostCars {
    #[serde(default, alias = "autos")]
    pub cars: Vec<Car>,
    #[serde(default)]
    pub total: u64,
    #[serde(default, alias = "autos_con_placa")]
    pub with_plate: u64,
}

impl HostCars {
    pub fn find(&self, id: u64) -> Option<&Car> {
        self.cars.iter().find(|car| car.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }
}

#[async_trait]
pub trait HostCarsGateway: Send + Sync {
    async fn host_cars(&self, host: &HostId) -> Result<HostCars, ApiError>;
}
