//! HTTP transport to a SPARQL endpoint: one GET per attempt with
//! `query` and `format=json` parameters, driven by a [`RetryPolicy`].

use crate::core::query::WIKIDATA_ENDPOINT;
use crate::core::retry::RetryPolicy;
use crate::domain::model::{Binding, SparqlResponse};
use crate::utils::error::{Result, WikidataError};
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("wikidata-people/", env!("CARGO_PKG_VERSION"));

/// Wikidata enforces a one-minute query deadline; leave headroom for
/// transfer of large result sets.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

pub struct SparqlClient {
    client: Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl SparqlClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_retry(endpoint, RetryPolicy::default())
    }

    pub fn with_retry(endpoint: impl Into<String>, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            retry,
        })
    }

    /// Client against Wikidata's public endpoint with the default policy.
    pub fn wikidata() -> Result<Self> {
        Self::new(WIKIDATA_ENDPOINT)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run a SPARQL query and return the result rows.
    ///
    /// Retryable statuses are reattempted after the policy's delay, with a
    /// 429 `Retry-After` header taking precedence. Terminal statuses fail
    /// immediately; a dropped connection maps to
    /// [`WikidataError::ConnectionAborted`], which for this endpoint
    /// usually means the query was too large and should be chunked.
    pub async fn query(&self, query: &str) -> Result<Vec<Binding>> {
        debug!(endpoint = %self.endpoint, "SPARQL query:\n{}", query);

        let mut last_status = 0u16;
        for attempt in 0..self.retry.max_attempts {
            let response = match self
                .client
                .get(&self.endpoint)
                .header(ACCEPT, "application/sparql-results+json")
                .query(&[("query", query), ("format", "json")])
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) if e.is_connect() || e.is_request() || e.is_body() => {
                    warn!(error = %e, "connection aborted mid-request");
                    return Err(WikidataError::ConnectionAborted);
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();
            if status == StatusCode::OK {
                let bindings = response.json::<SparqlResponse>().await?.into_bindings();
                debug!(rows = bindings.len(), attempt = attempt + 1, "SPARQL response parsed");
                return Ok(bindings);
            }

            last_status = status.as_u16();
            if !self.retry.is_retryable(last_status) {
                warn!(status = last_status, "terminal status, not retrying");
                return Err(WikidataError::StatusError {
                    status: last_status,
                });
            }

            let retry_after = if last_status == 429 {
                parse_retry_after(&response)
            } else {
                None
            };
            let delay = self.retry.delay_for(attempt, retry_after);
            warn!(
                status = last_status,
                attempt = attempt + 1,
                max_attempts = self.retry.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "retryable status from endpoint"
            );
            if attempt + 1 < self.retry.max_attempts {
                tokio::time::sleep(delay).await;
            }
        }

        Err(WikidataError::RetriesExhausted {
            attempts: self.retry.max_attempts,
            last_status,
        })
    }

    /// Run a query assembled from SELECT variables and WHERE clause parts.
    pub async fn query_select(
        &self,
        variables: &[&str],
        where_clauses: &[(&str, &str)],
        values: Option<(&str, &[String])>,
        language: crate::core::query::Language,
    ) -> Result<Vec<Binding>> {
        let query = crate::core::query::select_query(variables, where_clauses, values, language);
        self.query(&query).await
    }
}

fn parse_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
