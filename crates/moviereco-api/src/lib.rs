//! Client library for moviereco.
//!
//! Provides the `MovieClient` context object used by every front end: it
//! talks to the first-party backend and to the TMDB discovery endpoint, and
//! owns the session, response cache, loading flags and request queue.

/// First-party backend client and its capability traits.
pub mod backend;

/// Short-lived response cache and loading-state flags.
pub mod cache;

/// Error type shared by every client operation.
pub mod error;

/// Host environment: base URL selection, connectivity, observers.
pub mod host;

/// TMDB image URLs.
pub mod media;

/// Page-number window for paginated listings.
pub mod pagination;

/// Bounded-concurrency request queue.
pub mod queue;

/// Session credential storage.
pub mod session;

/// TMDB discovery client.
pub mod tmdb;

/// Response records and request payloads.
pub mod types;

pub use error::ApiError;
