//! Type definitions for the query module.

/// Query parameters accepted by the group endpoints.
///
/// Every field is optional. `radius`, `latitude` and `longitude` are accepted by
/// the API but not produced by the filter form. Wire key names and ordering
/// live in [`search_pairs`](super::params::search_pairs).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub actor: Option<Vec<String>>,
    pub event_type: Option<Vec<String>>,
    pub tone_max: Option<f64>,
    pub tone_min: Option<f64>,
    pub goldstein_scale_high: Option<f64>,
    pub goldstein_scale_low: Option<f64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub radius: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
