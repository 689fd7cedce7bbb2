use crate::adapters::retry::{log_retry, status_error, RetryPolicy};
use crate::domain::ports::{SearchClient, SearchHit};
use crate::utils::error::{Result, VenueError};
use async_trait::async_trait;
use backon::Retryable;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

/// Web search through the Serper API.
pub struct SerperClient {
    client: Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: u32,
}

#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    places: Vec<SerperPlace>,
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Deserialize)]
struct SerperPlace {
    title: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default, rename = "phoneNumber")]
    phone_number: Option<String>,
}

#[derive(Deserialize)]
struct SerperOrganic {
    title: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl SerperClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            retry,
        })
    }

    async fn search_once(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&SerperRequest {
                q: query,
                num: num_results,
            })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Serper response status: {}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("Serper", status, body));
        }

        let parsed: SerperResponse = response.json().await?;
        Ok(into_hits(parsed))
    }
}

/// Places first (they carry addresses and phones), then organic results.
fn into_hits(response: SerperResponse) -> Vec<SearchHit> {
    let places = response.places.into_iter().map(|p| SearchHit {
        title: p.title,
        link: p.website,
        snippet: None,
        address: p.address,
        phone: p.phone_number,
    });
    let organic = response.organic.into_iter().map(|o| SearchHit {
        title: o.title,
        link: o.link,
        snippet: o.snippet,
        address: None,
        phone: None,
    });
    places.chain(organic).collect()
}

#[async_trait]
impl SearchClient for SerperClient {
    async fn search(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>> {
        (move || self.search_once(query, num_results))
            .retry(self.retry.backoff())
            .when(VenueError::is_retryable)
            .notify(log_retry("Serper"))
            .await
    }
}
