// ── Fixed-price routes ──

use serde::{Deserialize, Serialize};

use crate::coerce;
use crate::resource::{Resource, ResourceSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub origin: String,
    pub destination: String,
    #[serde(default, deserialize_with = "coerce::opt_number")]
    pub distance_km: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_count")]
    pub duration_minutes: Option<u64>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub base_price: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteRequest {
    pub origin: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    pub base_price: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

pub struct Routes;

impl Resource for Routes {
    type Item = Route;
    type Create = CreateRouteRequest;
    type Update = UpdateRouteRequest;

    const SPEC: ResourceSpec = ResourceSpec::crud("routes", "/routes");

    fn id(item: &Route) -> &str {
        &item.id
    }
}
