//! HTTP client creation and request handling for the news API.

use async_trait::async_trait;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};
use url::Url;

use super::error::{ApiError, Result};
use super::types::{Actor, AggregationGroup, Event, EventType, GroupBy, ResultsEnvelope};
use crate::config::{Config, DateWindow};
use crate::query::params::{encode_ids, to_query_string};
use crate::query::{encode_query, QueryParams};
use crate::TARGET_WEB_REQUEST;

/// Read operations the explorer needs from the news API.
#[async_trait]
pub trait NewsApi: Send + Sync {
    async fn actors(&self, window: &DateWindow) -> Result<Vec<Actor>>;

    async fn types(&self, window: &DateWindow) -> Result<Vec<EventType>>;

    async fn groups(&self, group_by: GroupBy, params: &QueryParams)
        -> Result<Vec<AggregationGroup>>;

    /// Fetches full records for `ids`. The caller is responsible for capping
    /// the list.
    async fn events(&self, ids: &[String]) -> Result<Vec<Event>>;

    async fn event(&self, id: &str) -> Result<Option<Event>>;
}

pub fn create_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .gzip(true)
        .build()
        .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))
}

#[derive(Clone, Debug)]
pub struct NewsClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl NewsClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }
        Ok(Self {
            client: create_http_client()?,
            base_url,
            timeout: request_timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, config.timeout)
    }

    /// Appends `segments` to the base URL path and attaches `query` verbatim.
    fn endpoint(&self, segments: &[&str], query: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(query));
        }
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        debug!(target: TARGET_WEB_REQUEST, "GET {}", url);

        let request = async {
            let response = self
                .client
                .get(url.clone())
                .header(header::ACCEPT, "application/json")
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, ApiError>((status, body))
        };

        let (status, body) = match timeout(self.timeout, request).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(target: TARGET_WEB_REQUEST, "Request to {} timed out", url);
                return Err(ApiError::Timeout(self.timeout));
            }
        };

        if !status.is_success() {
            warn!(target: TARGET_WEB_REQUEST, "Non-success status {} from {}", status, url);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!(
            target: TARGET_WEB_REQUEST,
            "First 200 characters of response body: {}",
            body.chars().take(200).collect::<String>()
        );

        Ok(serde_json::from_str(&body)?)
    }

    async fn get_results<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        let value = self.get_json(url).await?;
        let envelope: ResultsEnvelope<T> = serde_json::from_value(value)?;
        Ok(envelope.results)
    }

    pub async fn get_countries(&self, params: &QueryParams) -> Result<Vec<AggregationGroup>> {
        self.groups(GroupBy::Country, params).await
    }

    pub async fn get_regions(&self, params: &QueryParams) -> Result<Vec<AggregationGroup>> {
        self.groups(GroupBy::Region, params).await
    }

    pub async fn get_cities(&self, params: &QueryParams) -> Result<Vec<AggregationGroup>> {
        self.groups(GroupBy::City, params).await
    }
}

fn window_query(window: &DateWindow) -> String {
    to_query_string(&[
        ("startTime", window.start_string()),
        ("endTime", window.end_string()),
    ])
}

#[async_trait]
impl NewsApi for NewsClient {
    async fn actors(&self, window: &DateWindow) -> Result<Vec<Actor>> {
        let url = self.endpoint(&["news", "extra", "actors"], &window_query(window))?;
        let actors: Vec<Actor> = self.get_results(url).await?;
        info!(target: TARGET_WEB_REQUEST, "Loaded {} actors", actors.len());
        Ok(actors)
    }

    async fn types(&self, window: &DateWindow) -> Result<Vec<EventType>> {
        let url = self.endpoint(&["news", "extra", "types"], &window_query(window))?;
        let types: Vec<EventType> = self.get_results(url).await?;
        info!(target: TARGET_WEB_REQUEST, "Loaded {} event types", types.len());
        Ok(types)
    }

    async fn groups(
        &self,
        group_by: GroupBy,
        params: &QueryParams,
    ) -> Result<Vec<AggregationGroup>> {
        let url = self.endpoint(
            &["news", "groups", group_by.path_segment(), "ids"],
            &encode_query(params),
        )?;
        let groups: Vec<AggregationGroup> = self.get_results(url).await?;
        info!(target: TARGET_WEB_REQUEST, "Loaded {} {} groups", groups.len(), group_by);
        Ok(groups)
    }

    async fn events(&self, ids: &[String]) -> Result<Vec<Event>> {
        if ids.is_empty() {
            debug!(target: TARGET_WEB_REQUEST, "No event ids given, skipping request");
            return Ok(Vec::new());
        }
        let url = self.endpoint(&["news", "events", "multiple"], &encode_ids(ids))?;
        let events: Vec<Event> = self.get_results(url).await?;
        info!(target: TARGET_WEB_REQUEST, "Loaded {} of {} requested events", events.len(), ids.len());
        Ok(events)
    }

    async fn event(&self, id: &str) -> Result<Option<Event>> {
        let url = self.endpoint(&["news", "events", "event", id], "")?;
        let value = self.get_json(url).await?;
        // Accept both the results envelope and a bare event object.
        if value.get("results").is_some() {
            let envelope: ResultsEnvelope<Event> = serde_json::from_value(value)?;
            Ok(envelope.results.into_iter().next())
        } else if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(serde_json::from_value(value)?))
        }
    }
}
