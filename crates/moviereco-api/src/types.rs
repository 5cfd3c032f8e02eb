//! Response records and request payloads.
//!
//! Backend responses are loosely shaped: fields go missing or come back as
//! `null`. Every field that may be absent is either an `Option` or falls back
//! to its `Default` through `nullable`, so deserialization only fails when
//! a field the caller truly needs (a movie `id`, a details `title`) is gone.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Backend page size used to derive page counts.
pub const PAGE_SIZE: u32 = 20;

/// Deserializes `null` as `T::default()`. Pair with `#[serde(default)]` for
/// missing fields.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// --- Movies ---

/// A movie as it appears in listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Movie ID (TMDB ID for catalog results).
    pub id: u64,
    /// TMDB ID when the backend stores its own row ID in `id`.
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    /// Title.
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Poster path fragment.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop path fragment.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Release date (YYYY-MM-DD).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Vote average.
    #[serde(default, deserialize_with = "nullable")]
    pub vote_average: f64,
    /// Vote count.
    #[serde(default, deserialize_with = "nullable")]
    pub vote_count: u32,
    /// Genre IDs.
    #[serde(default, deserialize_with = "nullable")]
    pub genre_ids: Vec<u32>,
}

/// A genre.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

/// Response from `/movies/genres`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreList {
    /// Genres.
    #[serde(default, deserialize_with = "nullable")]
    pub genres: Vec<Genre>,
}

/// Response from `/movies/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    /// Movie ID.
    pub id: u64,
    /// Title. Required: a details view cannot render without it.
    pub title: String,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Poster path fragment.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop path fragment.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Release date.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Runtime in minutes, 0 when unknown.
    #[serde(default, deserialize_with = "nullable")]
    pub runtime: u32,
    /// Vote average.
    #[serde(default, deserialize_with = "nullable")]
    pub vote_average: f64,
    /// Genres.
    #[serde(default, deserialize_with = "nullable")]
    pub genres: Vec<Genre>,
}

/// Popular movies, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularMovies {
    /// Movies on this page.
    pub movies: Vec<MovieSummary>,
    /// The page that was requested.
    pub current_page: u32,
    /// `ceil(total_results / PAGE_SIZE)`.
    pub total_pages: u32,
}

impl PopularMovies {
    /// Shape returned when the request fails.
    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            movies: Vec::new(),
            current_page: 1,
            total_pages: 1,
        }
    }
}

/// Raw `/movies/popular` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PopularMoviesResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub movies: Vec<MovieSummary>,
    #[serde(default, deserialize_with = "nullable")]
    pub total_results: u32,
}

/// Similar movies, normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarMovies {
    /// Similar movies.
    #[serde(default, deserialize_with = "nullable")]
    pub movies: Vec<MovieSummary>,
    /// Number of results.
    #[serde(default, deserialize_with = "nullable")]
    pub total_results: u32,
}

/// A paginated listing.
///
/// Missing numbers deserialize as 0; [`Page::with_fallbacks`] then applies
/// the listing defaults (page 1, one page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Current page.
    #[serde(default, deserialize_with = "nullable")]
    pub page: u32,
    /// Items on this page.
    #[serde(default = "Vec::new", deserialize_with = "nullable")]
    pub results: Vec<T>,
    /// Total number of pages.
    #[serde(default, deserialize_with = "nullable")]
    pub total_pages: u32,
    /// Total number of items.
    #[serde(default, deserialize_with = "nullable")]
    pub total_results: u32,
}

impl<T> Page<T> {
    /// Empty listing: page 1 of 1.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 1,
            total_results: 0,
        }
    }

    /// Empty search result: page 1 of 0.
    #[must_use]
    pub const fn no_results() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }

    /// Replaces a zero `page` or `total_pages` with 1.
    #[must_use]
    pub fn with_fallbacks(mut self) -> Self {
        if self.page == 0 {
            self.page = 1;
        }
        if self.total_pages == 0 {
            self.total_pages = 1;
        }
        self
    }
}

/// A user review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Review ID.
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    /// Author name.
    #[serde(default, deserialize_with = "nullable")]
    pub author: String,
    /// Review text.
    #[serde(default, deserialize_with = "nullable")]
    pub content: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Link to the full review.
    #[serde(default)]
    pub url: Option<String>,
    /// Author rating and avatar.
    #[serde(default)]
    pub author_details: Option<ReviewAuthor>,
}

/// Reviewer metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    /// Rating out of 10.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Avatar path fragment.
    #[serde(default)]
    pub avatar_path: Option<String>,
}

/// A trailer or clip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Site-specific key (YouTube video ID).
    #[serde(default, deserialize_with = "nullable")]
    pub key: String,
    /// Display name.
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    /// Hosting site.
    #[serde(default, deserialize_with = "nullable")]
    pub site: String,
    /// Video type (Trailer, Teaser, ...).
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct VideoList {
    #[serde(default, deserialize_with = "nullable")]
    pub videos: Vec<Video>,
}

// --- Account ---

/// Response from `/auth/login`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Refresh token, when the backend issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token type (`bearer`).
    #[serde(default)]
    pub token_type: Option<String>,
    /// Signed-in user record.
    #[serde(default)]
    pub user: Option<Value>,
}

/// Payload for `/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RefreshResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Raw `/users/profile` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProfileResponse {
    pub id: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// The signed-in user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    pub id: u64,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Account creation timestamp.
    pub created_at: Option<String>,
    /// Avatar URL.
    pub avatar: Option<String>,
}

impl From<ProfileResponse> for UserProfile {
    fn from(raw: ProfileResponse) -> Self {
        Self {
            id: raw.id,
            username: raw.username,
            email: raw.email,
            created_at: raw.created_at,
            avatar: raw.avatar_url.filter(|url| !url.is_empty()),
        }
    }
}

/// Fields for `PUT /users/profile`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New avatar URL.
    pub avatar: Option<String>,
    /// New username.
    pub username: Option<String>,
    /// New email address.
    pub email: Option<String>,
}

/// An image file to upload as the avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    /// File name sent with the part.
    pub file_name: String,
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Response from `POST /users/avatar`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAvatar {
    /// Public URL of the stored image.
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
}

/// A selectable stock avatar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    /// File name.
    #[serde(default, deserialize_with = "nullable")]
    pub filename: String,
    /// Public URL.
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
}

/// Response from `/users/avatars`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarList {
    /// Avatars.
    #[serde(default, deserialize_with = "nullable")]
    pub avatars: Vec<Avatar>,
}

// --- Library ---

/// Generic acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Success flag.
    #[serde(default, deserialize_with = "nullable")]
    pub success: bool,
    /// Status string (`success`).
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from `/users/watch-list/toggle`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistToggle {
    /// Success flag.
    #[serde(default, deserialize_with = "nullable")]
    pub success: bool,
    /// Whether the movie is now on the watch list.
    #[serde(default, deserialize_with = "nullable")]
    pub in_watchlist: bool,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

/// A watch-list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistItem {
    /// Movie ID.
    pub id: u64,
    /// TMDB ID.
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    /// Title.
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    /// Poster path fragment.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// When the movie was added.
    #[serde(default)]
    pub added_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WatchlistResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub watchlist: Vec<WatchlistItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WatchHistoryResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub history: Vec<MovieSummary>,
}

/// Payload naming a movie.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct MovieRef {
    pub movie_id: u64,
}

/// Payload for `POST /users/ratings`.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct RatingRequest {
    pub movie_id: u64,
    pub rating: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RatingResponse {
    #[serde(default)]
    pub rating: Option<f64>,
}

/// A movie the user rated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatedMovie {
    /// Movie ID.
    pub id: u64,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// Poster path fragment.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Rating (0-5).
    #[serde(default, deserialize_with = "nullable")]
    pub rating: f64,
    /// When the rating was last changed.
    #[serde(default)]
    pub rated_at: Option<String>,
}

/// Response from `GET /users/ratings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingList {
    /// Rated movies.
    #[serde(default, deserialize_with = "nullable")]
    pub ratings: Vec<RatedMovie>,
}
