// ── CMS pages ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coerce;
use crate::query::keys;
use crate::resource::{LifecycleAction, Resource, ResourceSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsPage {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, deserialize_with = "coerce::opt_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

pub struct Pages;

impl Resource for Pages {
    type Item = CmsPage;
    type Create = CreatePageRequest;
    type Update = UpdatePageRequest;

    const SPEC: ResourceSpec = ResourceSpec {
        name: "pages",
        path: "/cms/pages",
        page_size_param: keys::PAGE_SIZE,
        crud: true,
        actions: &[LifecycleAction::Publish, LifecycleAction::Unpublish],
        bulk_actions: &[],
        export: None,
        stats: false,
    };

    fn id(item: &CmsPage) -> &str {
        &item.id
    }
}
