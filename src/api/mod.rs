//! Client for the news HTTP API.
//!
//! All endpoints are read-only GETs that answer with a `{"results": [...]}`
//! envelope.

mod client;
pub mod error;
mod types;

pub use self::client::{create_http_client, NewsApi, NewsClient};
pub use self::error::{ApiError, Result};
pub use self::types::*;
