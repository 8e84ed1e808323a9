// ── Commissions ──

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
pub enum CommissionStatus {
    Pending,
    Approved,
    Paid,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// Commission earned by an affiliate on a single booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: String,
    pub affiliate_id: String,
    #[serde(default)]
    pub affiliate_name: Option<String>,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub amount: f64,
    #[serde(default, deserialize_with = "coerce::opt_number")]
    pub rate: Option<f64>,
    pub status: CommissionStatus,
    #[serde(default, deserialize_with = "coerce::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommissionRequest {
    pub affiliate_id: String,
    pub booking_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommissionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

pub struct Commissions;

impl Resource for Commissions {
    type Item = Commission;
    type Create = CreateCommissionRequest;
    type Update = UpdateCommissionRequest;

    const SPEC: ResourceSpec = ResourceSpec {
        name: "commissions",
        path: "/commissions",
        page_size_param: keys::LIMIT,
        crud: true,
        actions: &[LifecycleAction::Approve, LifecycleAction::Reject],
        bulk_actions: &[LifecycleAction::Approve],
        export: Some(ExportKind::Blob),
        stats: true,
    };

    fn id(item: &Commission) -> &str {
        &item.id
    }
}
