//! USGS FDSN event feed client.
//!
//! One GET per fetch, no retry and no pagination. A request timeout is always
//! set so a stalled connection cannot hold a refresh tick forever.

use crate::traits::EventSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use quake_common::{QuakeError, RawEvent, RawEventBatch, Result, DATE_FORMAT};
use quake_config::FeedConfig;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Envelope tag every valid response carries.
pub const FEATURE_COLLECTION: &str = "FeatureCollection";

/// Fixed query window sent to the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    /// Query endpoint without parameters.
    pub endpoint: String,
    /// Sent as `starttime`.
    pub start_date: NaiveDate,
    /// Sent as `endtime` when present.
    pub end_date: Option<NaiveDate>,
    /// Time of day joined to `start_date` for `updatedafter`.
    pub updated_after_time: String,
}

impl FeedQuery {
    /// Builds the query from the feed section of the configuration.
    pub fn from_config(config: &FeedConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            start_date: config.start_date,
            end_date: config.end_date,
            updated_after_time: config.updated_after_time.clone(),
        }
    }

    /// Full request URL including the GeoJSON query parameters.
    pub fn url(&self) -> Result<Url> {
        let start = self.start_date.format(DATE_FORMAT).to_string();
        let updated_after = format!("{start}T{}", self.updated_after_time);

        let mut params = vec![
            ("format", "geojson".to_string()),
            ("starttime", start),
            ("updatedafter", updated_after),
        ];
        if let Some(end) = self.end_date {
            params.push(("endtime", end.format(DATE_FORMAT).to_string()));
        }

        Url::parse_with_params(&self.endpoint, &params).map_err(|e| {
            QuakeError::config_with_source(format!("Invalid feed endpoint '{}'", self.endpoint), e)
        })
    }
}

/// HTTP client for the USGS event feed.
#[derive(Debug, Clone)]
pub struct UsgsClient {
    client: Client,
    url: Url,
}

impl UsgsClient {
    /// Creates a client for `query` with the given timeout and user agent.
    pub fn new(query: &FeedQuery, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| QuakeError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            url: query.url()?,
        })
    }

    /// Creates a client from the feed section of the configuration.
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        Self::new(
            &FeedQuery::from_config(config),
            Duration::from_secs(config.timeout_seconds),
            &config.user_agent,
        )
    }

    /// The request URL this client queries.
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_body(&self) -> Result<String> {
        debug!("Requesting event feed");

        let response = self.client.get(self.url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("Feed request timed out: {}", e);
                QuakeError::network_with_source("Request timeout", e)
            } else if e.is_connect() {
                warn!("Could not connect to feed: {}", e);
                QuakeError::network_with_source("Connection error", e)
            } else {
                warn!("Feed request failed: {}", e);
                QuakeError::network_with_source("Request failed", e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Feed returned an error status");
            return Err(QuakeError::network_with_status(
                format!("Feed returned status {status}"),
                status.as_u16(),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| QuakeError::network_with_source("Failed to read response body", e))
    }
}

#[async_trait]
impl EventSource for UsgsClient {
    async fn fetch(&self) -> Result<RawEventBatch> {
        let body = self.fetch_body().await?;
        let batch = parse_batch(&body)?;
        info!(events = batch.len(), "Fetched event batch");
        Ok(batch)
    }

    fn name(&self) -> &'static str {
        "usgs"
    }
}

// Wire format. Fields not listed here are ignored by serde.

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: String,
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    time: i64,
    #[serde(rename = "type")]
    event_type: String,
    title: String,
}

impl From<Feature> for RawEvent {
    fn from(feature: Feature) -> Self {
        let p = feature.properties;
        Self {
            magnitude: p.mag,
            place: p.place,
            occurred_at_millis: p.time,
            event_type: p.event_type,
            title: p.title,
        }
    }
}

/// Parses a GeoJSON response body into a batch.
///
/// Unknown fields are ignored. A body that is not JSON, misses a required
/// field or carries a top-level tag other than `FeatureCollection` is a
/// format error.
pub fn parse_batch(body: &str) -> Result<RawEventBatch> {
    let collection: FeatureCollection = serde_json::from_str(body)?;

    if collection.kind != FEATURE_COLLECTION {
        return Err(QuakeError::format(format!(
            "Expected top-level type '{FEATURE_COLLECTION}', got '{}'",
            collection.kind
        )));
    }

    let events = collection.features.into_iter().map(RawEvent::from).collect();
    Ok(RawEventBatch::new(collection.kind, events))
}
