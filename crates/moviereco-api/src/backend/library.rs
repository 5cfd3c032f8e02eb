//! Library operations: watch list, watch history, ratings.

use tracing::instrument;

use super::api::LocalLibraryApi;
use super::client::{MovieClient, RequestOptions};
use crate::error::ApiError;
use crate::types::{
    ActionResponse, MovieRef, MovieSummary, RatingList, RatingRequest, RatingResponse,
    WatchHistoryResponse, WatchlistItem, WatchlistResponse, WatchlistToggle,
};

/// Reads the integer at the start of `raw`, ignoring leading whitespace and
/// anything after the digits (`"42abc"` is 42).
fn leading_movie_id(raw: &str) -> Result<u64, ApiError> {
    let trimmed = raw.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed
        .get(..end)
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| ApiError::Shape(format!("invalid movie id: {raw:?}")))
}

/// JSON body naming one movie.
fn movie_body(movie_id: u64) -> Result<serde_json::Value, ApiError> {
    Ok(serde_json::to_value(MovieRef { movie_id })?)
}

impl LocalLibraryApi for MovieClient {
    #[instrument(skip_all)]
    async fn toggle_watchlist(&self, movie_id: u64) -> Result<WatchlistToggle, ApiError> {
        self.fetch(
            "/users/watch-list/toggle",
            RequestOptions::post().json(movie_body(movie_id)?),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn watchlist(&self) -> Vec<WatchlistItem> {
        let result: Result<WatchlistResponse, ApiError> =
            self.fetch("/users/watch-list", RequestOptions::get()).await;
        result.map(|r| r.watchlist).unwrap_or_default()
    }

    #[instrument(skip_all)]
    async fn add_to_watch_history(&self, movie_id: &str) -> Result<ActionResponse, ApiError> {
        let movie_id = leading_movie_id(movie_id)?;
        self.fetch(
            "/users/watch-history",
            RequestOptions::post().json(movie_body(movie_id)?),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn watch_history(&self, limit: u32) -> Vec<MovieSummary> {
        let result: Result<WatchHistoryResponse, ApiError> = self
            .fetch(
                "/users/watch-history",
                RequestOptions::get().query("limit", limit),
            )
            .await;
        result.map(|r| r.history).unwrap_or_default()
    }

    #[instrument(skip_all)]
    async fn remove_from_watch_history(&self, movie_id: u64) -> Result<ActionResponse, ApiError> {
        let response = self
            .api_call(
                &format!("/users/watch-history/{movie_id}"),
                RequestOptions::delete(),
            )
            .await?;
        if response.is_null() {
            return Ok(ActionResponse {
                success: true,
                ..ActionResponse::default()
            });
        }
        Ok(serde_json::from_value(response)?)
    }

    #[instrument(skip_all)]
    async fn rate_movie(&self, movie_id: u64, rating: f64) -> Result<ActionResponse, ApiError> {
        let body = serde_json::to_value(RatingRequest { movie_id, rating })?;
        self.fetch("/users/ratings", RequestOptions::post().json(body))
            .await
    }

    #[instrument(skip_all)]
    async fn movie_rating(&self, movie_id: u64) -> Option<f64> {
        let result: Result<RatingResponse, ApiError> = self
            .fetch(&format!("/users/ratings/{movie_id}"), RequestOptions::get())
            .await;
        result.ok().and_then(|r| r.rating)
    }

    #[instrument(skip_all)]
    async fn user_ratings(&self) -> Result<RatingList, ApiError> {
        self.fetch("/users/ratings", RequestOptions::get()).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]

    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::client::testing::signed_in_client;
    use super::*;

    #[test]
    fn test_leading_movie_id() {
        // Arrange & Act & Assert
        assert_eq!(leading_movie_id("603").unwrap(), 603);
        assert_eq!(leading_movie_id(" 42abc").unwrap(), 42);
        assert_eq!(leading_movie_id("+7").unwrap(), 7);
        assert!(leading_movie_id("abc").is_err());
        assert!(leading_movie_id("").is_err());
        assert!(leading_movie_id("-5").is_err());
    }

    #[tokio::test]
    async fn test_add_to_history_coerces_id() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/watch-history"))
            .and(body_json(serde_json::json!({"movie_id": 603})))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"status": "success", "message": "Added to watch history"}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = signed_in_client(&mock_server, "t1");

        // Act
        let response = client.add_to_watch_history("603-the-matrix").await.unwrap();

        // Assert
        assert_eq!(response.status.as_deref(), Some("success"));
    }

    #[tokio::test]
    async fn test_add_to_history_rejects_non_numeric_id() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
        let client = signed_in_client(&mock_server, "t1");

        // Act
        let err = client.add_to_watch_history("matrix").await.unwrap_err();

        // Assert
        assert!(matches!(err, ApiError::Shape(_)));
    }

    #[tokio::test]
    async fn test_toggle_watchlist_posts_movie_id() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/watch-list/toggle"))
            .and(body_json(serde_json::json!({"movie_id": 11})))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"success": true, "in_watchlist": true, "message": "Added"}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = signed_in_client(&mock_server, "t1");

        // Act
        let toggled = client.toggle_watchlist(11).await.unwrap();

        // Assert
        assert!(toggled.in_watchlist);
    }

    #[tokio::test]
    async fn test_lists_fall_back_to_empty() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"detail": "nope"}"#))
            .mount(&mock_server)
            .await;
        let client = signed_in_client(&mock_server, "t1");

        // Act
        let watchlist = client.watchlist().await;
        let history = client.watch_history(12).await;
        let rating = client.movie_rating(1).await;

        // Assert
        assert!(watchlist.is_empty());
        assert!(history.is_empty());
        assert!(rating.is_none());
    }

    #[tokio::test]
    async fn test_watch_history_is_unwrapped() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/watch-history"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"history": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]}"#,
            ))
            .mount(&mock_server)
            .await;
        let client = signed_in_client(&mock_server, "t1");

        // Act
        let history = client.watch_history(5).await;

        // Assert
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_from_history_accepts_empty_body() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/users/watch-history/603"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = signed_in_client(&mock_server, "t1");

        // Act
        let response = client.remove_from_watch_history(603).await.unwrap();

        // Assert
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_rating_round_trip() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/ratings"))
            .and(body_json(serde_json::json!({"movie_id": 603, "rating": 4.5})))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success": true}"#))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/ratings/603"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rating": 4.5}"#))
            .mount(&mock_server)
            .await;
        let client = signed_in_client(&mock_server, "t1");

        // Act
        let saved = client.rate_movie(603, 4.5).await.unwrap();
        let rating = client.movie_rating(603).await;

        // Assert
        assert!(saved.success);
        assert_eq!(rating, Some(4.5));
    }
}
