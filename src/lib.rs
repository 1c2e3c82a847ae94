pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod query;
pub mod render;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_APP_STATE: &str = "app_state";

/// Maximum number of event identifiers sent in one drill-down request.
pub const MAX_DRILLDOWN_IDS: usize = 200;
