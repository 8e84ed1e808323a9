// ── Corporate accounts ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::coerce;
use crate::export::ExportKind;
use crate::query::keys;
use crate::resource::{LifecycleAction, Resource, ResourceSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CompanyStatus {
    Pending,
    Active,
    Rejected,
    Suspended,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub status: CompanyStatus,
    #[serde(default, deserialize_with = "coerce::number")]
    pub credit_limit: f64,
    /// Outstanding invoiced amount.
    #[serde(default, deserialize_with = "coerce::number")]
    pub balance: f64,
    #[serde(default, deserialize_with = "coerce::count")]
    pub total_bookings: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
}

pub struct Companies;

impl Resource for Companies {
    type Item = Company;
    type Create = CreateCompanyRequest;
    type Update = UpdateCompanyRequest;

    const SPEC: ResourceSpec = ResourceSpec {
        name: "companies",
        path: "/companies",
        page_size_param: keys::LIMIT,
        crud: true,
        actions: &[LifecycleAction::Approve, LifecycleAction::Reject],
        bulk_actions: &[],
        export: Some(ExportKind::Blob),
        stats: false,
    };

    fn id(item: &Company) -> &str {
        &item.id
    }
}
