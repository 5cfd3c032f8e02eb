//! `TmdbClient` - TMDB discovery client implementation.

use anyhow::Context;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::instrument;
use url::Url;

use super::params::DiscoverParams;
use crate::error::ApiError;
use crate::types::{MovieSummary, Page};

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// TMDB API client.
///
/// Holds its own bearer token; the backend session token is never sent here.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Bearer API token.
    api_token: String,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    api_token: Option<String>,
    user_agent: Option<String>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_token: None,
            user_agent: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API bearer token (required).
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the User-Agent (default: `moviereco/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_token` is not set or blank.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> anyhow::Result<TmdbClient> {
        let api_token = self
            .api_token
            .filter(|t| !t.trim().is_empty())
            .context("api_token is required")?;
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("moviereco/{}", env!("CARGO_PKG_VERSION")));

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TmdbClient {
            http_client,
            base_url,
            api_token,
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Base URL requests are joined onto.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Lists movies matching `params` from `discover/movie`.
    ///
    /// Zero `page`/`total_pages` in the response are replaced with 1.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` ("HTTP error! status: N") on a non-success
    /// status, or a transport/decode error.
    #[instrument(skip_all)]
    pub async fn discover_movies(
        &self,
        params: &DiscoverParams,
    ) -> Result<Page<MovieSummary>, ApiError> {
        let page: Page<MovieSummary> = self.get_json("discover/movie", &params.to_query()).await?;
        Ok(page.with_fallbacks())
    }

    /// Sends a GET request with Bearer auth and query params.
    #[instrument(skip_all)]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Shape(format!("failed to join URL path {path}: {e}")))?;

        let request = self
            .http_client
            .get(url)
            .bearer_auth(&self.api_token)
            .header(ACCEPT, "application/json")
            .query(query)
            .build()?;

        tracing::debug!(url = %request.url(), "TMDB API request");

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let status = status.as_u16();
            return Err(ApiError::Http {
                status,
                message: format!("HTTP error! status: {status}"),
                data: serde_json::from_str(&body).ok(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn client_for(server: &wiremock::MockServer, token: &str) -> TmdbClient {
        let base_url = format!("{}/3/", server.uri());
        TmdbClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_token(token)
            .user_agent("test/0.0.0")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_api_token() {
        // Arrange & Act
        let result = TmdbClient::builder().user_agent("test/0.0.0").build();

        // Assert
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("api_token is required")
        );
    }

    #[test]
    fn test_builder_rejects_blank_token() {
        // Arrange & Act
        let result = TmdbClient::builder().api_token("  ").build();

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_defaults_to_public_endpoint() {
        // Arrange & Act
        let client = TmdbClient::builder().api_token("t").build().unwrap();

        // Assert
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_discover_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = r#"{
            "page": 2,
            "results": [
                {"id": 603, "title": "The Matrix", "vote_average": 8.2, "genre_ids": [28, 878]}
            ],
            "total_pages": 9,
            "total_results": 170
        }"#;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/3/discover/movie"))
            .and(wiremock::matchers::query_param("page", "2"))
            .and(wiremock::matchers::query_param("with_genres", "28"))
            .and(wiremock::matchers::query_param("include_video", "false"))
            .and(wiremock::matchers::header("Accept", "application/json"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, "test-token");
        let params = DiscoverParams::new().page(2).with_genres("28");

        // Act
        let page = client.discover_movies(&params).await.unwrap();

        // Assert
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 9);
        assert_eq!(page.results[0].id, 603);
        assert_eq!(page.results[0].genre_ids, vec![28, 878]);
    }

    #[tokio::test]
    async fn test_discover_applies_page_fallbacks() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string(r#"{"results": []}"#),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, "test-token");

        // Act
        let page = client
            .discover_movies(&DiscoverParams::new())
            .await
            .unwrap();

        // Assert
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_results, 0);
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::header(
                "Authorization",
                "Bearer my-secret-token",
            ))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, "my-secret-token");

        // Act & Assert (mock expect(1) verifies Authorization header)
        client
            .discover_movies(&DiscoverParams::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_http_error_reports_status() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let error_body = r#"{"status_code":7,"status_message":"Invalid API key: You must be granted a valid key.","success":false}"#;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(401).set_body_string(error_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, "invalid-token");

        // Act
        let err = client
            .discover_movies(&DiscoverParams::new())
            .await
            .unwrap_err();

        // Assert
        assert_eq!(err.to_string(), "HTTP error! status: 401");
        assert_eq!(err.status(), Some(401));
    }
}
