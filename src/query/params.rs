//! Query string serialization.
//!
//! Scalars are emitted once in a fixed key order and skipped when absent or
//! falsy (`0`, NaN, empty string). A default-equal value such as
//! `GoldsteinScaleLow=-10` is still sent. List filters follow as repeated keys.

use url::form_urlencoded;

use super::types::QueryParams;

/// Returns the canonical ordered key/value pairs for `params`.
pub fn search_pairs(params: &QueryParams) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();

    push_number(&mut pairs, "GoldsteinScaleHigh", params.goldstein_scale_high);
    push_number(&mut pairs, "GoldsteinScaleLow", params.goldstein_scale_low);
    push_number(&mut pairs, "ToneMax", params.tone_max);
    push_number(&mut pairs, "ToneMin", params.tone_min);
    push_text(&mut pairs, "startTime", params.start_time.as_deref());
    push_text(&mut pairs, "endTime", params.end_time.as_deref());
    push_number(&mut pairs, "radius", params.radius);
    push_number(&mut pairs, "latitude", params.latitude);
    push_number(&mut pairs, "longitude", params.longitude);

    if let Some(actors) = &params.actor {
        pairs.extend(actors.iter().map(|actor| ("actor", actor.clone())));
    }
    if let Some(types) = &params.event_type {
        pairs.extend(types.iter().map(|t| ("type", t.clone())));
    }

    pairs
}

/// Form-urlencodes `pairs` into a query string without the leading `?`.
pub fn to_query_string<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
        .finish()
}

pub fn encode_query(params: &QueryParams) -> String {
    to_query_string(&search_pairs(params))
}

/// Builds `id=<a>&id=<b>...` for the multiple-events endpoint.
pub fn encode_ids<S: AsRef<str>>(ids: &[S]) -> String {
    let pairs: Vec<(&str, &str)> = ids.iter().map(|id| ("id", id.as_ref())).collect();
    to_query_string(&pairs)
}

fn push_number(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<f64>) {
    if let Some(v) = value.filter(|v| is_truthy(*v)) {
        pairs.push((key, format_number(v)));
    }
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        pairs.push((key, v.to_string()));
    }
}

fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Integral values print without a fractional part (`5`, not `5.0`).
fn format_number(value: f64) -> String {
    format!("{}", value)
}
