// ── Dashboard ──
//
// Statistics only; there is no list behind it.

use crate::client::ApiClient;
use crate::resource::StatsEndpoint;

pub const DASHBOARD_STATS_PATH: &str = "/dashboard/stats";

/// Headline counters for the landing page.
pub fn dashboard_stats(client: ApiClient) -> StatsEndpoint {
    StatsEndpoint::new(client, "dashboard", DASHBOARD_STATS_PATH)
}
