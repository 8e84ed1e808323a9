// ── Affiliates ──
//
// Referral partners who earn commission on bookings they bring in.

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
pub enum AffiliateStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affiliate {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    pub status: AffiliateStatus,
    /// Percentage of each booking paid out as commission.
    #[serde(default, deserialize_with = "coerce::number")]
    pub commission_rate: f64,
    #[serde(default, deserialize_with = "coerce::number")]
    pub total_earnings: f64,
    #[serde(default, deserialize_with = "coerce::count")]
    pub total_bookings: u64,
    #[serde(default, deserialize_with = "coerce::opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAffiliateRequest {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAffiliateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<f64>,
}

pub struct Affiliates;

impl Resource for Affiliates {
    type Item = Affiliate;
    type Create = CreateAffiliateRequest;
    type Update = UpdateAffiliateRequest;

    const SPEC: ResourceSpec = ResourceSpec {
        name: "affiliates",
        path: "/affiliates",
        page_size_param: keys::LIMIT,
        crud: true,
        actions: &[
            LifecycleAction::Approve,
            LifecycleAction::Reject,
            LifecycleAction::Suspend,
        ],
        bulk_actions: &[LifecycleAction::Approve],
        export: Some(ExportKind::InlineCsv),
        stats: true,
    };

    fn id(item: &Affiliate) -> &str {
        &item.id
    }
}
