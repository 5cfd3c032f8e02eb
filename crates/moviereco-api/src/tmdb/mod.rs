//! TMDB discovery client module.
//!
//! Issues `discover/movie` requests directly against TMDB with a bearer
//! token that is separate from the backend session.

mod client;
mod params;

#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use params::DiscoverParams;
