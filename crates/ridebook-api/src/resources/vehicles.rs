// ── Fleet vehicles ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::coerce;
use crate::resource::{Resource, ResourceSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VehicleStatus {
    Active,
    Maintenance,
    Retired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    /// Vehicle class (`sedan`, `van`, `luxury`, ...).
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default, deserialize_with = "coerce::count")]
    pub capacity: u64,
    #[serde(default, deserialize_with = "coerce::number")]
    pub base_fare: f64,
    #[serde(default, deserialize_with = "coerce::number")]
    pub per_km_rate: f64,
    pub status: VehicleStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    pub capacity: u32,
    pub base_fare: f64,
    pub per_km_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_fare: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_km_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VehicleStatus>,
}

pub struct Vehicles;

impl Resource for Vehicles {
    type Item = Vehicle;
    type Create = CreateVehicleRequest;
    type Update = UpdateVehicleRequest;

    const SPEC: ResourceSpec = ResourceSpec::crud("vehicles", "/vehicles");

    fn id(item: &Vehicle) -> &str {
        &item.id
    }
}
