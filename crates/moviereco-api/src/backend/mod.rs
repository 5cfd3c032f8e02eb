//! First-party backend client module.

mod account;
mod api;
mod catalog;
mod client;
mod library;

pub use api::{
    AccountApi, CatalogApi, GENRE_RECOMMENDATION_LIMIT, LibraryApi, LocalAccountApi,
    LocalCatalogApi, LocalLibraryApi, PERSONALIZED_LIMIT, WATCH_HISTORY_LIMIT,
};
pub use client::{MovieClient, MovieClientBuilder, RequestBody, RequestOptions};
