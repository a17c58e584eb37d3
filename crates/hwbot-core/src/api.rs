//! Homework API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{PollerError, Result};

/// Query parameter carrying the lower bound of the time window.
pub const FROM_DATE_PARAM: &str = "from_date";

/// Source of homework statuses.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetches every homework updated since `since` (Unix seconds).
    ///
    /// Makes exactly one request and never retries.
    async fn fetch(&self, since: i64) -> Result<Value>;
}

/// Client for the Practicum homework statuses endpoint.
pub struct PracticumClient {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl PracticumClient {
    /// Creates a client for `endpoint` authorizing with `token`.
    ///
    /// # Errors
    ///
    /// Returns `PollerError::Transport` if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        })
    }

    /// The endpoint this client queries.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, since: i64) -> Result<Value> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[(FROM_DATE_PARAM, since)])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(PollerError::unexpected_status(
                response.status().as_u16(),
                &self.endpoint,
            ));
        }

        Ok(response.json().await?)
    }
}
