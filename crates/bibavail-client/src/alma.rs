//! Reqwest-backed Alma availability client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{AvailabilityService, FetchError};

/// The expand flag requesting physical, electronic, and digital inventory.
const EXPAND_AVAILABILITY: &str = "p_avail,e_avail,d_avail";

/// Client for the Alma `GET /almaws/v1/bibs` availability endpoint.
///
/// Builds the comma-joined id query, injects the API key, and classifies
/// transport failures. One client is shared across all batches of a
/// resolution run; reqwest pools connections internally.
#[derive(Debug)]
pub struct AlmaClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl AlmaClient {
    /// Create a client against `base_url` (the Alma API gateway, e.g.
    /// `https://api-na.hosted.exlibrisgroup.com`).
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::Config(format!("invalid base url {base_url:?}: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Client reusing an externally configured `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Request URL for a batch of ids, excluding the API key.
    ///
    /// Ids are trimmed and comma-joined; blank entries are dropped.
    fn availability_url(&self, ids: &[String]) -> Result<Url, FetchError> {
        let id_list = ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        if id_list.is_empty() {
            return Err(FetchError::EmptyRequest);
        }

        let mut url = self
            .base_url
            .join("almaws/v1/bibs")
            .map_err(|e| FetchError::Config(format!("invalid availability path: {e}")))?;
        url.query_pairs_mut()
            .append_pair("mms_id", &id_list)
            .append_pair("expand", EXPAND_AVAILABILITY)
            .append_pair("format", "json");
        Ok(url)
    }

    fn classify(err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl AvailabilityService for AlmaClient {
    async fn fetch_availability(&self, ids: &[String]) -> Result<Value, FetchError> {
        let url = self.availability_url(ids)?;
        // log the query before the key is attached so it never leaks
        debug!(query = %url.query().unwrap_or_default(), "availability request");

        let mut url = url;
        if !self.api_key.is_empty() {
            url.query_pairs_mut().append_pair("apikey", &self.api_key);
        }

        let started = Instant::now();
        let response = self.http.get(url).send().await.map_err(Self::classify)?;
        let status = response.status();
        debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "availability response"
        );

        if !status.is_success() {
            // Alma also reports errors inside a 200 envelope; a non-2xx
            // here is the gateway itself failing.
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::InvalidBody(e.to_string()))
    }
}
