// ── B2B partners ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::coerce;
use crate::query::keys;
use crate::resource::{LifecycleAction, Resource, ResourceSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PartnerStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: String,
    pub company_name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub status: PartnerStatus,
    #[serde(default, deserialize_with = "coerce::opt_number")]
    pub discount_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartnerRequest {
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartnerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<f64>,
}

pub struct Partners;

impl Resource for Partners {
    type Item = Partner;
    type Create = CreatePartnerRequest;
    type Update = UpdatePartnerRequest;

    const SPEC: ResourceSpec = ResourceSpec {
        name: "partners",
        path: "/b2b-partners",
        page_size_param: keys::LIMIT,
        crud: true,
        actions: &[LifecycleAction::Approve, LifecycleAction::Reject],
        bulk_actions: &[],
        export: None,
        stats: false,
    };

    fn id(item: &Partner) -> &str {
        &item.id
    }
}
