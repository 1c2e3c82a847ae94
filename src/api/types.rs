//! Response entities returned by the news API.
//!
//! Field names follow the API's JSON keys. Identifier and counter fields that
//! the server emits either as strings or as numbers decode into `String`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Envelope shared by every endpoint: `{"results": [...]}`.
#[derive(Debug, Deserialize)]
pub struct ResultsEnvelope<T> {
    pub results: Vec<T>,
}

/// GeoJSON point. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl GeoPoint {
    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.first().copied()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.get(1).copied()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.latitude(), self.longitude()) {
            (Some(lat), Some(lon)) => write!(f, "{:.4}, {:.4}", lat, lon),
            _ => write!(f, "-"),
        }
    }
}

/// Geographic level at which the group endpoints aggregate events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupBy {
    Country,
    Region,
    City,
}

impl GroupBy {
    pub const ALL: [GroupBy; 3] = [GroupBy::Country, GroupBy::Region, GroupBy::City];

    /// Path segment under `/news/groups/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            GroupBy::Country => "country",
            GroupBy::Region => "region",
            GroupBy::City => "city",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GroupBy::Country => "Country",
            GroupBy::Region => "Region",
            GroupBy::City => "City",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(rename = "Actor", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub category: Option<String>,
    #[serde(rename = "Count", default)]
    pub count: u64,
    #[serde(rename = "Location", default)]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventType {
    #[serde(rename = "Type")]
    pub code: String,
    #[serde(rename = "Type_Name", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "BaseType", default, deserialize_with = "lenient_string")]
    pub base_code: String,
    #[serde(rename = "BaseType_Name", default, deserialize_with = "lenient_string")]
    pub base_name: String,
    #[serde(rename = "Count", default)]
    pub count: u64,
}

/// Reference to a member event of a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRef {
    #[serde(rename = "GLOBALEVENTID", deserialize_with = "string_or_number")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationGroup {
    #[serde(rename = "Group_ID")]
    pub group_id: i64,
    #[serde(rename = "Count", default)]
    pub count: u64,
    #[serde(rename = "City", default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(rename = "Region", default, deserialize_with = "lenient_string")]
    pub region: String,
    #[serde(rename = "Country", default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(rename = "Country_Code", default, deserialize_with = "lenient_string")]
    pub country_code: String,
    #[serde(rename = "Location", default)]
    pub location: Option<GeoPoint>,
    #[serde(rename = "Events", default)]
    pub events: Vec<EventRef>,
}

impl AggregationGroup {
    /// Identifiers of the first `limit` member events, in list order.
    pub fn event_ids(&self, limit: usize) -> Vec<String> {
        self.events
            .iter()
            .take(limit)
            .map(|event| event.id.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventActor {
    #[serde(rename = "Name", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub category: Option<String>,
    #[serde(rename = "Location", default)]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "GLOBALEVENTID", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "Location_Name", default, deserialize_with = "lenient_string")]
    pub location_name: String,
    #[serde(rename = "Country_Code", default, deserialize_with = "lenient_string")]
    pub country_code: String,
    #[serde(rename = "Location", default)]
    pub location: Option<GeoPoint>,
    #[serde(rename = "Actors", default)]
    pub actors: Vec<EventActor>,
    #[serde(rename = "Source", default, deserialize_with = "lenient_string")]
    pub source: String,
    #[serde(rename = "IsRootEvent", default, deserialize_with = "lenient_string")]
    pub is_root_event: String,
    #[serde(rename = "GoldsteinScale", default)]
    pub goldstein_scale: Option<f64>,
    #[serde(rename = "AvgTone", default)]
    pub avg_tone: Option<f64>,
    #[serde(rename = "NumMentions", default, deserialize_with = "lenient_string")]
    pub num_mentions: String,
    #[serde(rename = "Date", default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "Type", default, deserialize_with = "lenient_string")]
    pub event_type: String,
    #[serde(rename = "Counts", default, deserialize_with = "lenient_string")]
    pub counts: String,
    #[serde(rename = "Media", default)]
    pub media: Option<Media>,
    #[serde(rename = "Title", default, deserialize_with = "lenient_string")]
    pub title: String,
}

impl Event {
    pub fn is_root(&self) -> bool {
        matches!(self.is_root_event.trim(), "1" | "true" | "True")
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number identifier, got {}",
            other
        ))),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let shown = value.to_string();
    value_to_string(value).ok_or_else(|| {
        serde::de::Error::custom(format!("expected scalar value, got {}", shown))
    })
}
