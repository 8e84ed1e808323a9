// ── Ride requests (quotes not yet booked) ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::coerce;
use crate::export::ExportKind;
use crate::query::keys;
use crate::resource::{LifecycleAction, Resource, ResourceSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RideRequestStatus {
    Pending,
    Quoted,
    Converted,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRequest {
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub pickup_location: String,
    pub dropoff_location: String,
    #[serde(default, deserialize_with = "coerce::opt_datetime")]
    pub pickup_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "coerce::count")]
    pub passengers: u64,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    pub status: RideRequestStatus,
    #[serde(default, deserialize_with = "coerce::opt_number")]
    pub estimated_price: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub pickup_location: String,
    pub dropoff_location: String,
    /// RFC 3339 timestamp.
    pub pickup_time: String,
    pub passengers: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRideRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropoff_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passengers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_price: Option<f64>,
}

pub struct RideRequests;

impl Resource for RideRequests {
    type Item = RideRequest;
    type Create = CreateRideRequest;
    type Update = UpdateRideRequest;

    const SPEC: ResourceSpec = ResourceSpec {
        name: "requests",
        path: "/requests",
        page_size_param: keys::LIMIT,
        crud: true,
        actions: &[LifecycleAction::ConvertToBooking, LifecycleAction::Cancel],
        bulk_actions: &[],
        export: Some(ExportKind::InlineCsv),
        stats: true,
    };

    fn id(item: &RideRequest) -> &str {
        &item.id
    }
}
