// ── Affiliate payouts ──

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
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: String,
    pub affiliate_id: String,
    #[serde(default)]
    pub affiliate_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub amount: f64,
    pub status: PayoutStatus,
    /// Payment rail, e.g. `bank_transfer` or `paypal`.
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "coerce::opt_datetime")]
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayoutRequest {
    pub affiliate_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

pub struct Payouts;

impl Resource for Payouts {
    type Item = Payout;
    type Create = CreatePayoutRequest;
    type Update = UpdatePayoutRequest;

    const SPEC: ResourceSpec = ResourceSpec {
        name: "payouts",
        path: "/payouts",
        page_size_param: keys::LIMIT,
        crud: true,
        actions: &[
            LifecycleAction::ProcessPayment,
            LifecycleAction::Retry,
            LifecycleAction::Cancel,
        ],
        bulk_actions: &[],
        export: Some(ExportKind::Blob),
        stats: true,
    };

    fn id(item: &Payout) -> &str {
        &item.id
    }
}
