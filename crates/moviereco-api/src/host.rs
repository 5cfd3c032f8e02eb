//! Host environment seams.
//!
//! The client does not talk to a browser directly. Connectivity, navigation
//! and loading notifications go through the traits here so a front end can
//! plug in whatever its platform offers.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};

/// Backend used when running against a local development host.
pub const LOCAL_BASE_URL: &str = "http://localhost:8000";

/// Backend used everywhere else.
pub const DEPLOYED_BASE_URL: &str = "https://moviereco-hh5q.onrender.com";

/// Page the user is sent to when the session cannot be refreshed.
pub const LANDING_PAGE: &str = "/landing.html";

/// Picks the backend base URL for the given hostname.
#[must_use]
pub fn base_url_for_host(hostname: &str) -> &'static str {
    match hostname {
        "localhost" | "127.0.0.1" => LOCAL_BASE_URL,
        _ => DEPLOYED_BASE_URL,
    }
}

/// Reports whether the host currently has network access.
pub trait Connectivity: Debug + Send + Sync {
    /// `false` when the host knows it is offline.
    fn is_online(&self) -> bool;
}

/// Probe for hosts without an offline signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Probe driven by an explicit flag.
#[derive(Debug)]
pub struct ConnectivityFlag {
    online: AtomicBool,
}

impl ConnectivityFlag {
    /// Creates a flag with the given initial state.
    #[must_use]
    pub const fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    /// Updates the state.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Connectivity for ConnectivityFlag {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Receives client notifications meant for the UI layer.
pub trait ClientObserver: Debug + Send + Sync {
    /// A request failed because the host is offline.
    fn offline(&self) {}

    /// The client wants the front end to show `path`.
    fn navigate(&self, path: &str) {
        let _ = path;
    }

    /// A loading flag changed.
    fn loading_changed(&self, key: &str, loading: bool) {
        let _ = (key, loading);
    }
}

/// Observer that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ClientObserver for TracingObserver {
    fn offline(&self) {
        tracing::warn!("Network is offline");
    }

    fn navigate(&self, path: &str) {
        tracing::info!(path, "Navigation requested");
    }

    fn loading_changed(&self, key: &str, loading: bool) {
        tracing::debug!(key, loading, "Loading state changed");
    }
}
