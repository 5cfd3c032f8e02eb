//! Catalog operations.

use tracing::instrument;

use super::api::LocalCatalogApi;
use super::client::{MovieClient, RequestOptions};
use crate::error::ApiError;
use crate::tmdb::DiscoverParams;
use crate::types::{
    GenreList, MovieDetails, MovieSummary, PAGE_SIZE, Page, PopularMovies, PopularMoviesResponse,
    Review, SimilarMovies, Video, VideoList,
};

/// How many similar movies to ask for.
const SIMILAR_LIMIT: u32 = 25;

impl LocalCatalogApi for MovieClient {
    #[instrument(skip_all)]
    async fn popular_movies(&self, page: u32) -> PopularMovies {
        let result: Result<PopularMoviesResponse, ApiError> = self
            .fetch("/movies/popular", RequestOptions::get().query("page", page))
            .await;
        result.map_or_else(
            |_| PopularMovies::fallback(),
            |raw| PopularMovies {
                movies: raw.movies,
                current_page: page,
                total_pages: raw.total_results.div_ceil(PAGE_SIZE),
            },
        )
    }

    #[instrument(skip_all)]
    async fn genres(&self) -> Result<GenreList, ApiError> {
        self.fetch("/movies/genres", RequestOptions::get()).await
    }

    #[instrument(skip_all)]
    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails, ApiError> {
        self.fetch(&format!("/movies/{movie_id}"), RequestOptions::get())
            .await
    }

    #[instrument(skip_all)]
    async fn similar_movies(&self, movie_id: u64) -> SimilarMovies {
        self.fetch(
            &format!("/movies/{movie_id}/similar"),
            RequestOptions::get().query("limit", SIMILAR_LIMIT),
        )
        .await
        .unwrap_or_default()
    }

    #[instrument(skip_all)]
    async fn search_movies(&self, query: &str, page: u32) -> Page<MovieSummary> {
        let query = query.trim();
        if query.is_empty() {
            return Page::no_results();
        }
        self.fetch(
            "/movies/search",
            RequestOptions::get().query("query", query).query("page", page),
        )
        .await
        .unwrap_or_else(|_| Page::no_results())
    }

    #[instrument(skip_all)]
    async fn movies_by_genre(&self, genre_id: u32, page: u32) -> Page<MovieSummary> {
        self.fetch(
            &format!("/movies/genre/{genre_id}"),
            RequestOptions::get().query("page", page),
        )
        .await
        .map_or_else(|_| Page::empty(), Page::with_fallbacks)
    }

    #[instrument(skip_all)]
    async fn movie_reviews(&self, movie_id: u64, page: u32) -> Page<Review> {
        self.fetch(
            &format!("/movies/{movie_id}/reviews"),
            RequestOptions::get().query("page", page),
        )
        .await
        .unwrap_or_else(|_| Page::empty())
    }

    #[instrument(skip_all)]
    async fn movie_videos(&self, movie_id: u64) -> Vec<Video> {
        let result: Result<VideoList, ApiError> = self
            .fetch(&format!("/movies/{movie_id}/videos"), RequestOptions::get())
            .await;
        result.map(|list| list.videos).unwrap_or_default()
    }

    #[instrument(skip_all)]
    async fn personalized_recommendations(&self, limit: u32) -> Vec<MovieSummary> {
        self.fetch(
            "/recommendations/personalized",
            RequestOptions::get().query("limit", limit),
        )
        .await
        .unwrap_or_default()
    }

    #[instrument(skip_all)]
    async fn recommendations_by_genre(
        &self,
        genre_id: u32,
        limit: u32,
    ) -> Result<Vec<MovieSummary>, ApiError> {
        self.fetch(
            &format!("/recommendations/by-genre/{genre_id}"),
            RequestOptions::get().query("limit", limit),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn discover_movies(
        &self,
        params: &DiscoverParams,
    ) -> Result<Page<MovieSummary>, ApiError> {
        let tmdb = self.tmdb().ok_or(ApiError::TmdbNotConfigured)?;
        tmdb.discover_movies(params).await.inspect_err(|e| {
            tracing::error!(error = %e, "TMDB discovery failed");
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::client::testing::client_for;
    use super::*;

    #[tokio::test]
    async fn test_popular_movies_derives_page_count() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/popular"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"movies": [{"id": 1, "title": "A"}], "total_results": 45}"#,
            ))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let popular = client.popular_movies(2).await;

        // Assert
        assert_eq!(popular.total_pages, 3);
        assert_eq!(popular.current_page, 2);
        assert_eq!(popular.movies.len(), 1);
    }

    #[tokio::test]
    async fn test_popular_movies_falls_back_on_error() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let popular = client.popular_movies(7).await;

        // Assert
        assert_eq!(popular, PopularMovies::fallback());
    }

    #[tokio::test]
    async fn test_blank_search_sends_nothing() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let empty = client.search_movies("", 1).await;
        let whitespace = client.search_movies("   \t", 3).await;

        // Assert
        assert_eq!(empty, Page::no_results());
        assert_eq!(whitespace, Page::no_results());
        assert_eq!(empty.total_pages, 0);
    }

    #[tokio::test]
    async fn test_search_sends_trimmed_query() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/search"))
            .and(query_param("query", "blade runner"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"page": 1, "results": [{"id": 78, "title": "Blade Runner"}], "total_pages": 1, "total_results": 1}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let page = client.search_movies("  blade runner ", 1).await;

        // Assert
        assert_eq!(page.results[0].title, "Blade Runner");
        assert_eq!(page.total_results, 1);
    }

    #[tokio::test]
    async fn test_movies_by_genre_fills_missing_numbers() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/genre/28"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"results": [{"id": 5}], "page": null}"#,
            ))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let page = client.movies_by_genre(28, 1).await;

        // Assert
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_results, 0);
        assert_eq!(page.results.len(), 1);
    }

    #[tokio::test]
    async fn test_similar_movies_requests_limit() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/603/similar"))
            .and(query_param("limit", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"movies": [{"id": 604}], "total_results": 1}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let similar = client.similar_movies(603).await;

        // Assert
        assert_eq!(similar.total_results, 1);
        assert_eq!(similar.movies[0].id, 604);
    }

    #[tokio::test]
    async fn test_movie_details_defaults_runtime() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/603"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id": 603, "title": "The Matrix", "runtime": null}"#,
            ))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let details = client.movie_details(603).await.unwrap();

        // Assert
        assert_eq!(details.runtime, 0);
        assert_eq!(details.title, "The Matrix");
    }

    #[tokio::test]
    async fn test_genres_propagates_errors() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(503).set_body_string(r#"{"detail": "Maintenance"}"#),
            )
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let err = client.genres().await.unwrap_err();

        // Assert
        assert_eq!(err.to_string(), "Maintenance");
    }

    #[tokio::test]
    async fn test_listings_fall_back_on_error() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let reviews = client.movie_reviews(1, 2).await;
        let videos = client.movie_videos(1).await;
        let personalized = client.personalized_recommendations(12).await;
        let similar = client.similar_movies(1).await;

        // Assert
        assert_eq!(reviews, Page::empty());
        assert!(videos.is_empty());
        assert!(personalized.is_empty());
        assert_eq!(similar, SimilarMovies::default());
    }

    #[tokio::test]
    async fn test_videos_are_unwrapped() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/603/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"videos": [{"key": "abc", "site": "YouTube", "type": "Trailer"}]}"#,
            ))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        // Act
        let videos = client.movie_videos(603).await;

        // Assert
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].kind, "Trailer");
    }

    #[tokio::test]
    async fn test_discover_without_token_is_unconfigured() {
        // Arrange
        let mock_server = MockServer::start().await;
        let client = client_for(&mock_server);

        // Act
        let err = client
            .discover_movies(&DiscoverParams::new())
            .await
            .unwrap_err();

        // Assert
        assert!(matches!(err, ApiError::TmdbNotConfigured));
    }

    #[tokio::test]
    async fn test_discover_uses_tmdb_token_not_session_token() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/discover/movie"))
            .and(wiremock::matchers::header("Authorization", "Bearer tmdb-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results": []}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let session = crate::session::Session::in_memory();
        session.set_token("session-token").unwrap();
        let client = MovieClient::builder()
            .base_url(mock_server.uri().parse().unwrap())
            .session(session)
            .tmdb_token("tmdb-token")
            .tmdb_base_url(format!("{}/3/", mock_server.uri()).parse().unwrap())
            .build()
            .unwrap();

        // Act
        let page = client
            .discover_movies(&DiscoverParams::new())
            .await
            .unwrap();

        // Assert
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
    }
}
