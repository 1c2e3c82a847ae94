//! Filter handling for news queries.
//!
//! This module turns filter form values into `QueryParams` and serializes
//! them into the query strings the news API expects.

pub mod form;
pub mod params;
mod types;

pub use self::form::{group_actor_options, group_type_options, FilterForm, ScoreRange};
pub use self::params::{encode_query, search_pairs};
pub use self::types::*;

/// Date format used for every `startTime`/`endTime` value sent to the API.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
