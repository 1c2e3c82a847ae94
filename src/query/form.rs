use chrono::NaiveDate;

use super::types::QueryParams;
use super::DATE_FORMAT;
use crate::api::{Actor, EventType};

/// Closed score interval selected by a range slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub low: f64,
    pub high: f64,
}

impl ScoreRange {
    /// Full slider extent, used as the initial tone and Goldstein selection.
    pub const FULL: ScoreRange = ScoreRange {
        low: -10.0,
        high: 10.0,
    };

    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Builds a range from the two slider handles. Inverted ranges are kept
    /// as given.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        match values {
            [low, high] => Some(Self::new(*low, *high)),
            _ => None,
        }
    }
}

/// Values collected by the filter form before submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterForm {
    pub actors: Vec<String>,
    pub types: Vec<String>,
    pub tone: Option<ScoreRange>,
    pub goldstein_scale: Option<ScoreRange>,
    pub start_time: Option<NaiveDate>,
    pub end_time: Option<NaiveDate>,
}

impl Default for FilterForm {
    fn default() -> Self {
        Self {
            actors: Vec::new(),
            types: Vec::new(),
            tone: Some(ScoreRange::FULL),
            goldstein_scale: Some(ScoreRange::FULL),
            start_time: None,
            end_time: None,
        }
    }
}

impl FilterForm {
    /// Maps the form values onto API query parameters. Unset values stay
    /// `None`; the serializer decides what is omitted from the wire.
    pub fn to_query_params(&self) -> QueryParams {
        QueryParams {
            actor: non_empty(&self.actors),
            event_type: non_empty(&self.types),
            tone_max: self.tone.map(|r| r.high),
            tone_min: self.tone.map(|r| r.low),
            goldstein_scale_high: self.goldstein_scale.map(|r| r.high),
            goldstein_scale_low: self.goldstein_scale.map(|r| r.low),
            start_time: self.start_time.map(|d| d.format(DATE_FORMAT).to_string()),
            end_time: self.end_time.map(|d| d.format(DATE_FORMAT).to_string()),
            radius: None,
            latitude: None,
            longitude: None,
        }
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

/// Sorts actors by name and groups them under the upper-cased first letter.
pub fn group_actor_options(actors: &[Actor]) -> Vec<(String, Vec<&Actor>)> {
    let mut sorted: Vec<&Actor> = actors.iter().collect();
    sorted.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    group_consecutive(sorted, |actor| {
        actor
            .name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    })
}

/// Sorts event types by parent category name and groups them under it.
pub fn group_type_options(types: &[EventType]) -> Vec<(String, Vec<&EventType>)> {
    let mut sorted: Vec<&EventType> = types.iter().collect();
    sorted.sort_by(|a, b| a.base_name.to_lowercase().cmp(&b.base_name.to_lowercase()));
    group_consecutive(sorted, |t| t.base_name.clone())
}

fn group_consecutive<T, F>(items: Vec<T>, key: F) -> Vec<(String, Vec<T>)>
where
    F: Fn(&T) -> String,
{
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();
    for item in items {
        let k = key(&item);
        match groups.last_mut() {
            Some((last, members)) if *last == k => members.push(item),
            _ => groups.push((k, vec![item])),
        }
    }
    groups
}
