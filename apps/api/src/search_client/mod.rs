//! Search client — wraps the web-search provider (SerpApi-style GET endpoint).
//!
//! The query text is the full SOP body. Relevance ranking is left to the provider.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

const SEARCH_ENGINE: &str = "google";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("search failed: {reason}")]
pub struct SearchFailure {
    pub reason: String,
}

impl SearchFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Locale and size knobs for a search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub result_count: u32,
    pub location: String,
    /// `hl`: interface language.
    pub language: String,
    /// `gl`: country code.
    pub country: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            result_count: 5,
            location: "United States".to_string(),
            language: "en".to_string(),
            country: "us".to_string(),
        }
    }
}

/// A single provider record. Every field is optional on the wire; the parser
/// decides what is usable.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct OrganicResult {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

/// Provider response envelope: either `error` or `organic_results`.
#[derive(Debug, Deserialize)]
pub struct SearchEnvelope {
    pub error: Option<String>,
    pub organic_results: Option<Vec<OrganicResult>>,
}

impl SearchEnvelope {
    /// Applies the envelope rules: an `error` field or a missing result list is a failure,
    /// an empty list is not.
    pub fn into_results(self) -> Result<Vec<OrganicResult>, SearchFailure> {
        if let Some(error) = self.error {
            return Err(SearchFailure::new(format!("provider error: {error}")));
        }
        self.organic_results
            .ok_or_else(|| SearchFailure::new("provider response has no organic_results"))
    }
}

/// Seam between the enricher and the search provider.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Returns provider records in provider ranking order.
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<OrganicResult>, SearchFailure>;
}

/// Builds the outbound query string parameters, in the order the provider documents them.
pub fn build_query_params(
    query: &str,
    options: &SearchOptions,
    api_key: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("q", query.to_string()),
        ("location", options.location.clone()),
        ("hl", options.language.clone()),
        ("gl", options.country.clone()),
        ("num", options.result_count.to_string()),
        ("engine", SEARCH_ENGINE.to_string()),
        ("api_key", api_key.to_string()),
    ]
}

/// HTTP search client. Built once at startup and shared.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl SearchClient {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build search HTTP client")?;

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl SearchService for SearchClient {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<OrganicResult>, SearchFailure> {
        let params = build_query_params(query, options, &self.api_key);

        let response = self
            .client
            .get(&self.api_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("Search request failed in transport: {e}");
                SearchFailure::new(transport_reason(&e))
            })?;

        let status = response.status();
        let envelope: SearchEnvelope = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SearchFailure::new(transport_reason(&e))
            } else {
                SearchFailure::new(format!("malformed search response (status {status}): {e}"))
            }
        })?;

        // The provider reports most failures through the envelope, even on non-2xx.
        let results = envelope.into_results().map_err(|failure| {
            warn!("Search provider returned {status}: {}", failure.reason);
            failure
        })?;

        if !status.is_success() {
            return Err(SearchFailure::new(format!(
                "search provider returned status {status}"
            )));
        }

        debug!("Search succeeded: {} results", results.len());
        Ok(results)
    }
}

fn transport_reason(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("search request timed out: {err}")
    } else {
        format!("search request failed: {err}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;

    const SEARCH_PATH: &str = "/search";

    /// Serves `router` on an ephemeral local port and returns the search endpoint URL.
    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}{SEARCH_PATH}")
    }

    async fn search_against(
        status: StatusCode,
        body: &'static str,
    ) -> Result<Vec<OrganicResult>, SearchFailure> {
        let router = Router::new().route(SEARCH_PATH, get(move || async move { (status, body) }));
        let url = serve(router).await;
        SearchClient::new(url, "k".to_string(), Duration::from_secs(5))
            .unwrap()
            .search("Count the drawer.", &SearchOptions::default())
            .await
    }

    #[tokio::test]
    async fn test_search_sends_params_and_returns_results() {
        let router = Router::new().route(
            SEARCH_PATH,
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let param = |key: &str| params.get(key).cloned().unwrap_or_default();
                Json(json!({
                    "organic_results": [{
                        "title": param("q"),
                        "link": format!("http://x/{}", param("api_key")),
                        "snippet": format!("{}-{}", param("engine"), param("num")),
                    }]
                }))
            }),
        );
        let url = serve(router).await;

        let results = SearchClient::new(url, "secret".to_string(), Duration::from_secs(5))
            .unwrap()
            .search("Open the vault.\nLog it.", &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title.as_deref(), Some("Open the vault.\nLog it."));
        assert_eq!(results[0].link.as_deref(), Some("http://x/secret"));
        assert_eq!(results[0].snippet.as_deref(), Some("google-5"));
    }

    #[tokio::test]
    async fn test_search_empty_results_is_ok() {
        let results = search_against(StatusCode::OK, r#"{"organic_results": []}"#)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_non_success_status_fails_even_with_results() {
        let failure = search_against(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"organic_results": []}"#,
        )
        .await
        .unwrap_err();
        assert_eq!(failure.reason, "search provider returned status 500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_search_missing_results_fails() {
        let failure = search_against(StatusCode::OK, "{}").await.unwrap_err();
        assert!(failure.reason.contains("no organic_results"));
    }

    #[tokio::test]
    async fn test_search_provider_error_field_fails() {
        let failure = search_against(StatusCode::UNAUTHORIZED, r#"{"error": "Invalid API key."}"#)
            .await
            .unwrap_err();
        assert_eq!(failure.reason, "provider error: Invalid API key.");
    }

    #[tokio::test]
    async fn test_search_undecodable_body_fails() {
        let failure = search_against(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
            .await
            .unwrap_err();
        assert!(failure.reason.contains("malformed search response"));
    }

    #[tokio::test]
    async fn test_search_connection_refused_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let failure = SearchClient::new(
            format!("http://{addr}{SEARCH_PATH}"),
            "k".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
        .search("q", &SearchOptions::default())
        .await
        .unwrap_err();

        assert!(failure.reason.starts_with("search request failed"));
    }

    #[test]
    fn test_query_params_carry_full_query_and_locale() {
        let options = SearchOptions::default();
        let params = build_query_params("Step 1: open the vault.\nStep 2: count.", &options, "k");

        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["q", "location", "hl", "gl", "num", "engine", "api_key"]
        );
        assert_eq!(params[0].1, "Step 1: open the vault.\nStep 2: count.");
        assert_eq!(params[1].1, "United States");
        assert_eq!(params[2].1, "en");
        assert_eq!(params[3].1, "us");
        assert_eq!(params[4].1, "5");
        assert_eq!(params[5].1, "google");
        assert_eq!(params[6].1, "k");
    }

    #[test]
    fn test_query_params_respect_custom_options() {
        let options = SearchOptions {
            result_count: 10,
            location: "Germany".to_string(),
            language: "de".to_string(),
            country: "de".to_string(),
        };
        let params = build_query_params("q", &options, "k");
        assert_eq!(params[1].1, "Germany");
        assert_eq!(params[4].1, "10");
    }

    #[test]
    fn test_envelope_error_field_is_failure() {
        let envelope: SearchEnvelope =
            serde_json::from_str(r#"{"error": "Invalid API key."}"#).unwrap();
        let failure = envelope.into_results().unwrap_err();
        assert!(failure.reason.contains("Invalid API key."));
    }

    #[test]
    fn test_envelope_error_wins_over_results() {
        let envelope: SearchEnvelope = serde_json::from_str(
            r#"{"error": "quota", "organic_results": [{"title": "A", "link": "http://a"}]}"#,
        )
        .unwrap();
        assert!(envelope.into_results().is_err());
    }

    #[test]
    fn test_envelope_missing_results_is_failure() {
        let envelope: SearchEnvelope =
            serde_json::from_str(r#"{"search_metadata": {"status": "Success"}}"#).unwrap();
        let failure = envelope.into_results().unwrap_err();
        assert!(failure.reason.contains("organic_results"));
    }

    #[test]
    fn test_envelope_empty_results_is_not_failure() {
        let envelope: SearchEnvelope =
            serde_json::from_str(r#"{"organic_results": []}"#).unwrap();
        assert!(envelope.into_results().unwrap().is_empty());
    }

    #[test]
    fn test_envelope_keeps_partial_records_and_order() {
        let envelope: SearchEnvelope = serde_json::from_str(
            r#"{"organic_results": [
                {"position": 1, "title": "B", "link": "http://b", "snippet": "sb"},
                {"position": 2, "title": "A"}
            ]}"#,
        )
        .unwrap();
        let results = envelope.into_results().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title.as_deref(), Some("B"));
        assert!(results[1].link.is_none());
    }
}
