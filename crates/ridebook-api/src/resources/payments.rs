// ── Customer payments ──

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
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::number")]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub status: PaymentStatus,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub booking_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

pub struct Payments;

impl Resource for Payments {
    type Item = Payment;
    type Create = CreatePaymentRequest;
    type Update = UpdatePaymentRequest;

    const SPEC: ResourceSpec = ResourceSpec {
        name: "payments",
        path: "/payments",
        page_size_param: keys::LIMIT,
        crud: true,
        actions: &[LifecycleAction::Retry, LifecycleAction::Cancel],
        bulk_actions: &[],
        export: Some(ExportKind::Blob),
        stats: true,
    };

    fn id(item: &Payment) -> &str {
        &item.id
    }
}
