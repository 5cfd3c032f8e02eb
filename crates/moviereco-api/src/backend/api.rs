//! Capability traits implemented by `MovieClient`.
#![allow(clippy::future_not_send)]

use serde_json::Value;

use crate::error::ApiError;
use crate::tmdb::DiscoverParams;
use crate::types::{
    ActionResponse, AvatarList, AvatarUpload, GenreList, LoginResponse, MovieDetails,
    MovieSummary, Page, PopularMovies, ProfileUpdate, RatingList, Registration, Review,
    SimilarMovies, UploadedAvatar, UserProfile, Video, WatchlistItem, WatchlistToggle,
};

/// Default number of personalized recommendations.
pub const PERSONALIZED_LIMIT: u32 = 12;

/// Default number of recommendations per genre.
pub const GENRE_RECOMMENDATION_LIMIT: u32 = 8;

/// Default number of watch-history entries.
pub const WATCH_HISTORY_LIMIT: u32 = 12;

/// Movie catalog: listings, search, details, discovery, recommendations.
///
/// Operations that return a bare value (not a `Result`) never fail: their
/// errors are logged and replaced by an empty listing.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Popular movies for `page`. Falls back to an empty page 1 of 1.
    async fn popular_movies(&self, page: u32) -> PopularMovies;

    /// All genres.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON parsing fails.
    async fn genres(&self) -> Result<GenreList, ApiError>;

    /// Details for one movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON parsing fails.
    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails, ApiError>;

    /// Up to 25 movies similar to `movie_id`. Falls back to an empty list.
    async fn similar_movies(&self, movie_id: u64) -> SimilarMovies;

    /// Title search. A blank query returns an empty result without a
    /// request, as does any failure.
    async fn search_movies(&self, query: &str, page: u32) -> Page<MovieSummary>;

    /// Movies in one genre. Falls back to an empty page 1 of 1.
    async fn movies_by_genre(&self, genre_id: u32, page: u32) -> Page<MovieSummary>;

    /// User reviews for a movie. Falls back to an empty page 1 of 1.
    async fn movie_reviews(&self, movie_id: u64, page: u32) -> Page<Review>;

    /// Trailers and clips for a movie. Falls back to an empty list.
    async fn movie_videos(&self, movie_id: u64) -> Vec<Video>;

    /// Recommendations for the signed-in user. Falls back to an empty list.
    async fn personalized_recommendations(&self, limit: u32) -> Vec<MovieSummary>;

    /// Top recommendations within a genre.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON parsing fails.
    async fn recommendations_by_genre(
        &self,
        genre_id: u32,
        limit: u32,
    ) -> Result<Vec<MovieSummary>, ApiError>;

    /// Filtered discovery against TMDB.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::TmdbNotConfigured` without a TMDB token, otherwise
    /// any request or JSON parsing error.
    async fn discover_movies(&self, params: &DiscoverParams)
    -> Result<Page<MovieSummary>, ApiError>;
}

/// Account: sign-in, registration, profile and avatars.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(AccountApi: Send)]
pub trait LocalAccountApi {
    /// Signs in and stores the returned credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session cannot be saved.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn register(&self, registration: &Registration) -> Result<Value, ApiError>;

    /// The signed-in user, or `None` when no token is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn current_user(&self) -> Result<Option<Value>, ApiError>;

    /// The signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ProfileLoad` on any failure, including a missing
    /// token.
    async fn user_profile(&self) -> Result<UserProfile, ApiError>;

    /// Updates the profile fields that are set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server sends no body.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Value, ApiError>;

    /// Uploads an image as the avatar.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn upload_profile_picture(&self, upload: AvatarUpload)
    -> Result<UploadedAvatar, ApiError>;

    /// Stock avatars to choose from.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn avatars(&self) -> Result<AvatarList, ApiError>;

    /// Forgets the stored credentials and user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    async fn logout(&self) -> Result<(), ApiError>;
}

/// Personal library: watch list, watch history and ratings.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(LibraryApi: Send)]
pub trait LocalLibraryApi {
    /// Adds or removes a movie from the watch list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn toggle_watchlist(&self, movie_id: u64) -> Result<WatchlistToggle, ApiError>;

    /// The watch list. Falls back to an empty list.
    async fn watchlist(&self) -> Vec<WatchlistItem>;

    /// Records a movie as watched. `movie_id` is read as a leading integer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Shape` when `movie_id` has no leading digits, or
    /// any request error.
    async fn add_to_watch_history(&self, movie_id: &str) -> Result<ActionResponse, ApiError>;

    /// Recently watched movies. Falls back to an empty list.
    async fn watch_history(&self, limit: u32) -> Vec<MovieSummary>;

    /// Removes a movie from the watch history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn remove_from_watch_history(&self, movie_id: u64) -> Result<ActionResponse, ApiError>;

    /// Rates a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn rate_movie(&self, movie_id: u64, rating: f64) -> Result<ActionResponse, ApiError>;

    /// The user's rating for a movie, `None` when unrated or on failure.
    async fn movie_rating(&self, movie_id: u64) -> Option<f64>;

    /// Every movie the user rated.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn user_ratings(&self) -> Result<RatingList, ApiError>;
}
