//! `MovieClient` - backend client implementation.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tracing::instrument;
use url::Url;

use crate::cache::{LoadingStates, ResponseCache};
use crate::error::ApiError;
use crate::host::{
    AlwaysOnline, ClientObserver, Connectivity, LANDING_PAGE, TracingObserver, base_url_for_host,
};
use crate::queue::{MAX_CONCURRENT_REQUESTS, RequestQueue};
use crate::session::Session;
use crate::tmdb::TmdbClient;
use crate::types::RefreshResponse;

/// Hostname assumed when none is configured.
const DEFAULT_HOSTNAME: &str = "localhost";

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request body variants accepted by [`MovieClient::api_call`].
#[derive(Debug, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    None,
    /// JSON document.
    Json(Value),
    /// URL-encoded form fields.
    Form(Vec<(String, String)>),
    /// Multipart form; the transport picks the boundary.
    Multipart(reqwest::multipart::Form),
}

/// Method, query, extra headers and body for one backend call.
#[derive(Debug, Default)]
pub struct RequestOptions {
    method: Method,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: RequestBody,
}

impl RequestOptions {
    /// A GET request.
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// A request with the given method.
    #[must_use]
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// A POST request.
    #[must_use]
    pub fn post() -> Self {
        Self::method(Method::POST)
    }

    /// A PUT request.
    #[must_use]
    pub fn put() -> Self {
        Self::method(Method::PUT)
    }

    /// A DELETE request.
    #[must_use]
    pub fn delete() -> Self {
        Self::method(Method::DELETE)
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((String::from(key), value.to_string()));
        self
    }

    /// Sets a header, replacing the client default of the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sends `value` as JSON.
    #[must_use]
    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Sends URL-encoded form fields.
    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    /// Sends a multipart form.
    #[must_use]
    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }
}

/// In-flight token refresh and the callers waiting on it.
/// Error text handed to waiters whose refresh never reported back.
const REFRESH_ABANDONED: &str = "token refresh was abandoned";

#[derive(Debug, Default)]
struct RefreshState {
    /// Bumped by `destroy`; a leader from an older generation no longer
    /// owns the state.
    generation: u64,
    in_flight: bool,
    waiters: Vec<oneshot::Sender<Result<String, String>>>,
}

/// The leading caller's claim on the in-flight refresh.
///
/// Dropping it releases the claim and answers every waiter, with the
/// recorded outcome or, when the leader was cancelled first, an
/// "abandoned" error.
struct RefreshLeader<'a> {
    state: &'a Mutex<RefreshState>,
    generation: u64,
    outcome: Option<Result<String, String>>,
}

impl RefreshLeader<'_> {
    /// Records the outcome and releases the claim.
    fn finish(mut self, outcome: Result<String, String>) {
        self.outcome = Some(outcome);
    }
}

impl Drop for RefreshLeader<'_> {
    fn drop(&mut self) {
        let waiters = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.generation != self.generation {
                return;
            }
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };
        if self.outcome.is_none() && !waiters.is_empty() {
            tracing::warn!(waiters = waiters.len(), "Token refresh cancelled before completing");
        }
        let outcome = self
            .outcome
            .take()
            .unwrap_or_else(|| Err(String::from(REFRESH_ABANDONED)));
        for tx in waiters {
            // A waiter that gave up is fine to skip.
            let _ = tx.send(outcome.clone());
        }
    }
}

/// Client for the moviereco backend.
///
/// Built once and shared by reference. Holds the session, a short-lived
/// response cache, loading flags, the request queue and, when a token is
/// configured, the TMDB discovery client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct MovieClient {
    http_client: Client,
    base_url: String,
    session: Session,
    connectivity: Arc<dyn Connectivity>,
    observer: Arc<dyn ClientObserver>,
    cache: ResponseCache,
    loading: LoadingStates,
    queue: RequestQueue,
    tmdb: Option<TmdbClient>,
    refresh: Mutex<RefreshState>,
}

/// Builder for `MovieClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct MovieClientBuilder {
    hostname: Option<String>,
    base_url: Option<Url>,
    session: Option<Session>,
    connectivity: Option<Arc<dyn Connectivity>>,
    observer: Option<Arc<dyn ClientObserver>>,
    user_agent: Option<String>,
    tmdb_token: Option<String>,
    tmdb_base_url: Option<Url>,
    max_concurrent: Option<usize>,
}

impl MovieClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            hostname: None,
            base_url: None,
            session: None,
            connectivity: None,
            observer: None,
            user_agent: None,
            tmdb_token: None,
            tmdb_base_url: None,
            max_concurrent: None,
        }
    }

    /// Host the front end runs on; selects the backend (default: `localhost`).
    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Overrides the backend base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Session storage (default: in memory).
    #[must_use]
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Connectivity probe (default: always online).
    #[must_use]
    pub fn connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// UI observer (default: logs only).
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn ClientObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Sets the User-Agent (default: `moviereco/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// TMDB bearer token; discovery is unavailable without one.
    #[must_use]
    pub fn tmdb_token(mut self, token: impl Into<String>) -> Self {
        self.tmdb_token = Some(token.into());
        self
    }

    /// Overrides the TMDB base URL (for wiremock in tests).
    #[must_use]
    pub fn tmdb_base_url(mut self, url: Url) -> Self {
        self.tmdb_base_url = Some(url);
        self
    }

    /// Worker count of the request queue (default: 4).
    #[must_use]
    pub const fn max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = Some(max);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - the base URL derived from the hostname is invalid.
    /// - the TMDB client cannot be built.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> anyhow::Result<MovieClient> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("moviereco/{}", env!("CARGO_PKG_VERSION")));

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let hostname = self.hostname.as_deref().unwrap_or(DEFAULT_HOSTNAME);
            let result = Url::parse(base_url_for_host(hostname));
            result.context("invalid backend base URL")?
        };
        let base_url = String::from(base_url.as_str().trim_end_matches('/'));

        let tmdb = match self.tmdb_token.filter(|t| !t.trim().is_empty()) {
            Some(token) => {
                let mut builder = TmdbClient::builder()
                    .api_token(token)
                    .user_agent(user_agent.clone());
                if let Some(url) = self.tmdb_base_url {
                    builder = builder.base_url(url);
                }
                Some(builder.build().context("failed to build TMDB client")?)
            }
            None => None,
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        let observer = self
            .observer
            .unwrap_or_else(|| Arc::new(TracingObserver) as Arc<dyn ClientObserver>);

        Ok(MovieClient {
            http_client,
            base_url,
            session: self.session.unwrap_or_else(Session::in_memory),
            connectivity: self
                .connectivity
                .unwrap_or_else(|| Arc::new(AlwaysOnline) as Arc<dyn Connectivity>),
            loading: LoadingStates::new(Arc::clone(&observer)),
            observer,
            cache: ResponseCache::default(),
            queue: RequestQueue::new(self.max_concurrent.unwrap_or(MAX_CONCURRENT_REQUESTS)),
            tmdb,
            refresh: Mutex::new(RefreshState::default()),
        })
    }
}

impl MovieClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> MovieClientBuilder {
        MovieClientBuilder::new()
    }

    /// Backend base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session credentials.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) const fn tmdb(&self) -> Option<&TmdbClient> {
        self.tmdb.as_ref()
    }

    /// Sends one request to `<base_url><endpoint>` and returns the JSON body.
    ///
    /// Sends nothing when the connectivity probe reports offline. A
    /// successful empty body is `Value::Null`. Every failure is logged with
    /// the endpoint before it is returned.
    ///
    /// # Errors
    ///
    /// - `ApiError::Offline` when offline.
    /// - `ApiError::Http` on a non-success status.
    /// - `ApiError::Transport` / `ApiError::Decode` otherwise.
    #[instrument(skip_all)]
    pub async fn api_call(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        if !self.connectivity.is_online() {
            self.observer.offline();
            let err = ApiError::Offline;
            log_failure(endpoint, &err);
            return Err(err);
        }

        let result = self.send(endpoint, options).await;
        if let Err(ref err) = result {
            log_failure(endpoint, err);
            if matches!(err, ApiError::Transport(_)) && !self.connectivity.is_online() {
                self.observer.offline();
            }
        }
        result
    }

    /// [`Self::api_call`] followed by decoding into `T`.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let value = self.api_call(endpoint, options).await?;
        serde_json::from_value(value).map_err(|e| {
            let err = ApiError::from(e);
            log_failure(endpoint, &err);
            err
        })
    }

    async fn send(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let raw_url = format!("{}{endpoint}", self.base_url);
        let url = Url::parse(&raw_url)
            .map_err(|e| ApiError::Shape(format!("invalid request URL {raw_url}: {e}")))?;

        let RequestOptions {
            method,
            query,
            headers: extra_headers,
            body,
        } = options;

        let mut headers = self.default_headers()?;
        let mut request = self.http_client.request(method, url);
        if !query.is_empty() {
            request = request.query(&query);
        }
        request = match body {
            RequestBody::None => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Form(fields) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
                request.form(&fields)
            }
            RequestBody::Multipart(form) => {
                headers.remove(CONTENT_TYPE);
                request.multipart(form)
            }
        };
        for (name, value) in &extra_headers {
            headers.insert(name.clone(), value.clone());
        }
        let request = request.headers(headers).build()?;

        tracing::debug!(method = %request.method(), url = %request.url(), "API request");

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::from_error_body(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// JSON content type and accept headers, plus the bearer token if stored.
    fn default_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if let Some(token) = self.session.token() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Shape(format!("stored token is not a valid header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    // --- Cache, loading flags, queue ---

    /// Cached value for `key`, `None` when absent or expired.
    #[must_use]
    pub fn get_cached(&self, key: &str) -> Option<Value> {
        self.cache.get(key)
    }

    /// Caches `value` under `key`, replacing any previous entry.
    pub fn set_cache(&self, key: &str, value: Value) {
        self.cache.set(key, value);
    }

    /// Sets a loading flag and notifies the observer.
    pub fn set_loading(&self, key: &str, loading: bool) {
        self.loading.set(key, loading);
    }

    /// Current loading flag for `key`.
    #[must_use]
    pub fn is_loading(&self, key: &str) -> bool {
        self.loading.get(key)
    }

    /// Runs `unit` on the bounded request queue and returns its result.
    ///
    /// # Errors
    ///
    /// Returns the unit's own error, or `ApiError::QueueClosed` if it never
    /// reported back.
    pub async fn queue_request<F, T>(&self, unit: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
    {
        self.queue.queue_request(unit).await
    }

    /// Number of queued units currently running.
    #[must_use]
    pub fn active_requests(&self) -> usize {
        self.queue.active_requests()
    }

    /// Clears the cache and loading flags and abandons pending refresh waiters.
    pub fn destroy(&self) {
        self.cache.clear();
        self.loading.clear();
        let mut state = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
        state.waiters.clear();
        state.in_flight = false;
        state.generation = state.generation.wrapping_add(1);
        tracing::debug!("Client state cleared");
    }

    // --- Session ---

    /// Exchanges the stored refresh token for a new bearer token.
    ///
    /// Concurrent callers share one request. On failure both tokens are
    /// removed and the observer is sent to the landing page. If the caller
    /// that issued the request is dropped first, the callers waiting on it
    /// get `SessionExpired` and the next call starts a fresh request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionExpired` wrapping the cause.
    #[instrument(skip_all)]
    pub async fn refresh_token(&self) -> Result<String, ApiError> {
        let leader = {
            let mut state = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Err(rx)
            } else {
                state.in_flight = true;
                Ok(RefreshLeader {
                    state: &self.refresh,
                    generation: state.generation,
                    outcome: None,
                })
            }
        };

        let leader = match leader {
            Ok(leader) => leader,
            Err(rx) => {
                tracing::debug!("Waiting for in-flight token refresh");
                let message = match rx.await {
                    Ok(Ok(token)) => return Ok(token),
                    Ok(Err(message)) => message,
                    Err(_) => String::from(REFRESH_ABANDONED),
                };
                return Err(ApiError::SessionExpired(Box::new(ApiError::Shape(message))));
            }
        };

        let result = self.request_new_token().await;
        leader.finish(result.as_ref().cloned().map_err(ToString::to_string));

        match result {
            Ok(token) => {
                tracing::info!("Session token refreshed");
                Ok(token)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Token refresh failed, clearing session");
                if let Err(e) = self.session.clear_tokens() {
                    tracing::error!(error = %e, "Failed to clear session tokens");
                }
                self.observer.navigate(LANDING_PAGE);
                Err(ApiError::SessionExpired(Box::new(err)))
            }
        }
    }

    async fn request_new_token(&self) -> Result<String, ApiError> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or(ApiError::NotAuthenticated)?;
        let response: RefreshResponse = self
            .fetch(
                "/auth/refresh",
                RequestOptions::post().json(json!({ "refresh_token": refresh_token })),
            )
            .await?;
        let token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Shape(String::from("No access token in refresh response")))?;
        self.session.set_token(&token)?;
        Ok(token)
    }
}

/// Logs a failed backend call.
fn log_failure(endpoint: &str, err: &ApiError) {
    tracing::error!(endpoint, error = %err, "API call failed");
}

#[cfg(test)]
pub(crate) mod testing {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::MovieClient;
    use crate::host::ClientObserver;
    use crate::session::Session;

    /// Observer that remembers what it was told.
    #[derive(Debug, Default)]
    pub struct RecordingObserver {
        pub offline: AtomicUsize,
        pub paths: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        pub fn offline_count(&self) -> usize {
            self.offline.load(Ordering::SeqCst)
        }

        pub fn paths(&self) -> Vec<String> {
            self.paths.lock().unwrap().clone()
        }
    }

    impl ClientObserver for RecordingObserver {
        fn offline(&self) {
            self.offline.fetch_add(1, Ordering::SeqCst);
        }

        fn navigate(&self, path: &str) {
            self.paths.lock().unwrap().push(String::from(path));
        }
    }

    /// Client pointed at `server` with an empty in-memory session.
    pub fn client_for(server: &wiremock::MockServer) -> MovieClient {
        MovieClient::builder()
            .base_url(server.uri().parse().unwrap())
            .user_agent("test/0.0.0")
            .build()
            .unwrap()
    }

    /// Client pointed at `server` with `token` already stored.
    pub fn signed_in_client(server: &wiremock::MockServer, token: &str) -> MovieClient {
        let session = Session::in_memory();
        session.set_token(token).unwrap();
        MovieClient::builder()
            .base_url(server.uri().parse().unwrap())
            .session(session)
            .user_agent("test/0.0.0")
            .build()
            .unwrap()
    }

    /// Client whose observer is `observer`.
    pub fn observed_client(
        server: &wiremock::MockServer,
        session: Session,
        observer: Arc<RecordingObserver>,
    ) -> MovieClient {
        MovieClient::builder()
            .base_url(server.uri().parse().unwrap())
            .session(session)
            .observer(observer)
            .user_agent("test/0.0.0")
            .build()
            .unwrap()
    }
}
