//! moviereco - command-line front end for the movie recommendation backend.

/// Application configuration (TOML).
mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, TMDB_TOKEN_ENV, resolve_config_path, resolve_session_path};
use moviereco_api::backend::{
    GENRE_RECOMMENDATION_LIMIT, LocalAccountApi, LocalCatalogApi, LocalLibraryApi, MovieClient,
    PERSONALIZED_LIMIT, WATCH_HISTORY_LIMIT,
};
use moviereco_api::media::{backdrop_url, poster_url};
use moviereco_api::pagination::PageWindow;
use moviereco_api::session::{FileSessionStore, Session};
use moviereco_api::tmdb::DiscoverParams;
use moviereco_api::types::{AvatarUpload, MovieSummary, Page, ProfileUpdate, Registration};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/session directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse the movie catalog.
    Movies(MoviesCommand),
    /// Recommendations.
    Recommend(RecommendCommand),
    /// Sign-in, registration and profile.
    Account(AccountCommand),
    /// Watch list, watch history and ratings.
    Library(LibraryCommand),
    /// Manage the config file.
    Config(ConfigCommand),
}

/// Arguments for the `movies` subcommand.
#[derive(clap::Args)]
struct MoviesCommand {
    /// Movies subcommand to run.
    #[command(subcommand)]
    command: MoviesSubcommands,
}

/// Available movies subcommands.
#[derive(Subcommand)]
enum MoviesSubcommands {
    /// Popular movies.
    Popular(PageArgs),
    /// List genres.
    Genres,
    /// Movie details.
    Details(IdArgs),
    /// Movies similar to one movie.
    Similar(IdArgs),
    /// Search by title.
    Search(SearchArgs),
    /// Movies in one genre.
    ByGenre(ByGenreArgs),
    /// User reviews for a movie.
    Reviews(ReviewsArgs),
    /// Trailers and clips for a movie.
    Videos(IdArgs),
    /// Filtered discovery via TMDB (needs a TMDB token).
    Discover(DiscoverArgs),
}

/// Page selector.
#[derive(clap::Args)]
struct PageArgs {
    /// Page number.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

/// Movie ID selector.
#[derive(clap::Args)]
struct IdArgs {
    /// Movie ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `movies search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query. A blank query returns no results.
    #[arg(long, required = true, allow_hyphen_values = true)]
    query: String,
    /// Page number.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

/// Arguments for the `movies by-genre` subcommand.
#[derive(clap::Args)]
struct ByGenreArgs {
    /// Genre ID.
    #[arg(long, required = true)]
    genre: u32,
    /// Page number.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

/// Arguments for the `movies reviews` subcommand.
#[derive(clap::Args)]
struct ReviewsArgs {
    /// Movie ID.
    #[arg(long, required = true)]
    id: u64,
    /// Page number.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

/// Arguments for the `movies discover` subcommand.
#[derive(clap::Args)]
struct DiscoverArgs {
    /// Comma-separated genre IDs (e.g. "28,12").
    #[arg(long)]
    genres: Option<String>,
    /// Primary release year.
    #[arg(long)]
    year: Option<u32>,
    /// Minimum vote average.
    #[arg(long)]
    min_rating: Option<f64>,
    /// Minimum vote count.
    #[arg(long)]
    min_votes: Option<u32>,
    /// Minimum runtime in minutes.
    #[arg(long)]
    min_runtime: Option<u32>,
    /// Maximum runtime in minutes.
    #[arg(long)]
    max_runtime: Option<u32>,
    /// Sort order (default: "popularity.desc").
    #[arg(long)]
    sort_by: Option<String>,
    /// Response language (default: config or "en-US").
    #[arg(long)]
    language: Option<String>,
    /// Include adult titles.
    #[arg(long)]
    include_adult: bool,
    /// Page number.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

/// Arguments for the `recommend` subcommand.
#[derive(clap::Args)]
struct RecommendCommand {
    /// Recommend subcommand to run.
    #[command(subcommand)]
    command: RecommendSubcommands,
}

/// Available recommend subcommands.
#[derive(Subcommand)]
enum RecommendSubcommands {
    /// Recommendations for the signed-in user.
    Personalized(PersonalizedArgs),
    /// Top recommendations in a genre.
    ByGenre(GenreLimitArgs),
}

/// Arguments for the `recommend personalized` subcommand.
#[derive(clap::Args)]
struct PersonalizedArgs {
    /// Maximum number of results.
    #[arg(long, default_value_t = PERSONALIZED_LIMIT)]
    limit: u32,
}

/// Arguments for the `recommend by-genre` subcommand.
#[derive(clap::Args)]
struct GenreLimitArgs {
    /// Genre ID.
    #[arg(long, required = true)]
    genre: u32,
    /// Maximum number of results.
    #[arg(long, default_value_t = GENRE_RECOMMENDATION_LIMIT)]
    limit: u32,
}

/// Arguments for the `account` subcommand.
#[derive(clap::Args)]
struct AccountCommand {
    /// Account subcommand to run.
    #[command(subcommand)]
    command: AccountSubcommands,
}

/// Available account subcommands.
#[derive(Subcommand)]
enum AccountSubcommands {
    /// Sign in and store the session.
    Login(LoginArgs),
    /// Create an account.
    Register(RegisterArgs),
    /// Forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Show the profile.
    Profile,
    /// Update profile fields.
    UpdateProfile(UpdateProfileArgs),
    /// Upload an image as the avatar.
    UploadAvatar(UploadAvatarArgs),
    /// List stock avatars.
    Avatars,
    /// Exchange the refresh token for a new session token.
    Refresh,
}

/// Arguments for the `account login` subcommand.
#[derive(clap::Args)]
struct LoginArgs {
    /// Email address.
    #[arg(long, required = true)]
    email: String,
    /// Password.
    #[arg(long, required = true)]
    password: String,
}

/// Arguments for the `account register` subcommand.
#[derive(clap::Args)]
struct RegisterArgs {
    /// Username.
    #[arg(long, required = true)]
    username: String,
    /// Email address.
    #[arg(long, required = true)]
    email: String,
    /// Password.
    #[arg(long, required = true)]
    password: String,
}

/// Arguments for the `account update-profile` subcommand.
#[derive(clap::Args)]
struct UpdateProfileArgs {
    /// New username.
    #[arg(long)]
    username: Option<String>,
    /// New email address.
    #[arg(long)]
    email: Option<String>,
    /// New avatar URL.
    #[arg(long)]
    avatar: Option<String>,
}

/// Arguments for the `account upload-avatar` subcommand.
#[derive(clap::Args)]
struct UploadAvatarArgs {
    /// Image file to upload.
    #[arg(long, required = true)]
    file: PathBuf,
}

/// Arguments for the `library` subcommand.
#[derive(clap::Args)]
struct LibraryCommand {
    /// Library subcommand to run.
    #[command(subcommand)]
    command: LibrarySubcommands,
}

/// Available library subcommands.
#[derive(Subcommand)]
enum LibrarySubcommands {
    /// Show the watch list.
    Watchlist,
    /// Add or remove a movie from the watch list.
    ToggleWatchlist(IdArgs),
    /// Show recently watched movies.
    History(HistoryArgs),
    /// Record a movie as watched.
    AddHistory(AddHistoryArgs),
    /// Remove a movie from the watch history.
    RemoveHistory(IdArgs),
    /// Rate a movie.
    Rate(RateArgs),
    /// Show your rating for a movie.
    Rating(IdArgs),
    /// List every rated movie.
    Ratings,
}

/// Arguments for the `library history` subcommand.
#[derive(clap::Args)]
struct HistoryArgs {
    /// Maximum number of movies.
    #[arg(long, default_value_t = WATCH_HISTORY_LIMIT)]
    limit: u32,
}

/// Arguments for the `library add-history` subcommand.
#[derive(clap::Args)]
struct AddHistoryArgs {
    /// Movie ID; only its leading digits are used.
    #[arg(long, required = true)]
    id: String,
}

/// Arguments for the `library rate` subcommand.
#[derive(clap::Args)]
struct RateArgs {
    /// Movie ID.
    #[arg(long, required = true)]
    id: u64,
    /// Rating (0-5).
    #[arg(long, required = true)]
    rating: f64,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write a config file with default values if none exists.
    Init,
    /// Show the effective configuration.
    Show,
}

/// Client plus the config it was built from.
struct ClientContext {
    client: MovieClient,
    config: AppConfig,
}

/// Builds the client from `config.toml` and `session.toml` under `dir`.
///
/// # Errors
///
/// Returns an error if the config or session file cannot be read, the
/// configured base URL is invalid, or the client fails to build.
fn build_context(dir: Option<&PathBuf>) -> Result<ClientContext> {
    let config_path = resolve_config_path(dir)?;
    let config = AppConfig::load(&config_path)?;

    let session_path = resolve_session_path(dir)?;
    let store = FileSessionStore::open(&session_path).context("failed to open session file")?;

    let mut builder = MovieClient::builder()
        .hostname(config.api.hostname.clone())
        .session(Session::new(Arc::new(store)))
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
    if let Some(ref raw) = config.api.base_url {
        let url = Url::parse(raw).with_context(|| format!("invalid api.base_url: {raw}"))?;
        builder = builder.base_url(url);
    }
    if let Some(token) = config.tmdb_token(std::env::var(TMDB_TOKEN_ENV).ok()) {
        builder = builder.tmdb_token(token);
    }
    let client = builder.build().context("failed to build API client")?;

    Ok(ClientContext { client, config })
}

/// Logs a movie listing as a table.
fn log_movies(movies: &[MovieSummary]) {
    tracing::info!("ID\tRating\tRelease\t\tTitle\tPoster");
    for movie in movies {
        tracing::info!(
            "{}\t{:.1}\t{}\t{}\t{}",
            movie.id,
            movie.vote_average,
            movie.release_date.as_deref().unwrap_or("-"),
            movie.title,
            poster_url(movie.poster_path.as_deref()),
        );
    }
}

/// Logs a paginated listing followed by its page window.
fn log_page(page: &Page<MovieSummary>) {
    log_movies(&page.results);
    tracing::info!("Total: {} movies", page.total_results);
    if page.total_pages > 0 {
        tracing::info!("Pages: {}", PageWindow::new(page.page, page.total_pages).render());
    }
}

/// Runs a `movies` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or a propagating request fails.
#[allow(clippy::too_many_lines)]
#[instrument(skip_all)]
async fn run_movies(command: MoviesSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let ClientContext { client, config } = build_context(dir)?;

    match command {
        MoviesSubcommands::Popular(args) => {
            let popular = client.popular_movies(args.page).await;
            log_movies(&popular.movies);
            tracing::info!(
                "Pages: {}",
                PageWindow::new(popular.current_page, popular.total_pages).render()
            );
        }
        MoviesSubcommands::Genres => {
            let list = client.genres().await.context("failed to fetch genres")?;
            tracing::info!("ID\tName");
            for genre in &list.genres {
                tracing::info!("{}\t{}", genre.id, genre.name);
            }
            tracing::info!("Total: {} genres", list.genres.len());
        }
        MoviesSubcommands::Details(args) => {
            let details = client
                .movie_details(args.id)
                .await
                .context("failed to fetch movie details")?;
            tracing::info!("ID: {}", details.id);
            tracing::info!("Title: {}", details.title);
            tracing::info!(
                "Release Date: {}",
                details.release_date.as_deref().unwrap_or("-")
            );
            tracing::info!("Runtime: {} min", details.runtime);
            tracing::info!("Rating: {:.1}", details.vote_average);
            let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
            tracing::info!("Genres: {}", genres.join(", "));
            tracing::info!("Poster: {}", poster_url(details.poster_path.as_deref()));
            tracing::info!(
                "Backdrop: {}",
                backdrop_url(details.backdrop_path.as_deref())
            );
            tracing::info!("Overview: {}", details.overview.as_deref().unwrap_or("-"));
        }
        MoviesSubcommands::Similar(args) => {
            let similar = client.similar_movies(args.id).await;
            log_movies(&similar.movies);
            tracing::info!("Total: {} movies", similar.total_results);
        }
        MoviesSubcommands::Search(args) => {
            let page = client.search_movies(&args.query, args.page).await;
            log_page(&page);
        }
        MoviesSubcommands::ByGenre(args) => {
            let page = client.movies_by_genre(args.genre, args.page).await;
            log_page(&page);
        }
        MoviesSubcommands::Reviews(args) => {
            let page = client.movie_reviews(args.id, args.page).await;
            tracing::info!("Author\tRating\tCreated");
            for review in &page.results {
                let rating = review
                    .author_details
                    .as_ref()
                    .and_then(|d| d.rating)
                    .map_or_else(|| String::from("-"), |r| r.to_string());
                tracing::info!(
                    "{}\t{}\t{}",
                    review.author,
                    rating,
                    review.created_at.as_deref().unwrap_or("-"),
                );
            }
            tracing::info!("Total: {} reviews", page.total_results);
        }
        MoviesSubcommands::Videos(args) => {
            let videos = client.movie_videos(args.id).await;
            tracing::info!("Type\tSite\tKey\tName");
            for video in &videos {
                tracing::info!(
                    "{}\t{}\t{}\t{}",
                    video.kind,
                    video.site,
                    video.key,
                    video.name
                );
            }
            tracing::info!("Total: {} videos", videos.len());
        }
        MoviesSubcommands::Discover(args) => {
            let params = discover_params(&args, &config);
            let page = client
                .discover_movies(&params)
                .await
                .context("TMDB discover/movie request failed")?;
            log_page(&page);
        }
    }

    Ok(())
}

/// Maps `movies discover` arguments onto TMDB filters.
fn discover_params(args: &DiscoverArgs, config: &AppConfig) -> DiscoverParams {
    let mut params = DiscoverParams::new()
        .page(args.page)
        .include_adult(args.include_adult)
        .runtime_between(args.min_runtime, args.max_runtime);
    if let Some(ref sort_by) = args.sort_by {
        params = params.sort_by(sort_by.clone());
    }
    if let Some(language) = args.language.as_ref().or(config.tmdb.language.as_ref()) {
        params = params.language(language.clone());
    }
    if let Some(ref genres) = args.genres {
        params = params.with_genres(genres.clone());
    }
    if let Some(year) = args.year {
        params = params.primary_release_year(year);
    }
    if let Some(rating) = args.min_rating {
        params = params.vote_average_gte(rating);
    }
    if let Some(votes) = args.min_votes {
        params = params.vote_count_gte(votes);
    }
    params
}

/// Runs a `recommend` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the genre request fails.
#[instrument(skip_all)]
async fn run_recommend(command: RecommendSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let ClientContext { client, .. } = build_context(dir)?;

    let movies = match command {
        RecommendSubcommands::Personalized(args) => {
            client.personalized_recommendations(args.limit).await
        }
        RecommendSubcommands::ByGenre(args) => client
            .recommendations_by_genre(args.genre, args.limit)
            .await
            .context("failed to fetch genre recommendations")?,
    };
    log_movies(&movies);
    tracing::info!("Total: {} movies", movies.len());

    Ok(())
}

/// Guesses an image MIME type from the file extension.
fn image_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Runs an `account` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the request fails.
#[allow(clippy::too_many_lines)]
#[instrument(skip_all)]
async fn run_account(command: AccountSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let ClientContext { client, .. } = build_context(dir)?;

    match command {
        AccountSubcommands::Login(args) => {
            client
                .login(&args.email, &args.password)
                .await
                .context("login failed")?;
            tracing::info!("Logged in as {}", args.email);
        }
        AccountSubcommands::Register(args) => {
            let registration = Registration {
                username: args.username,
                email: args.email,
                password: args.password,
            };
            let created = client
                .register(&registration)
                .await
                .context("registration failed")?;
            tracing::info!("Registered: {created}");
        }
        AccountSubcommands::Logout => {
            client.logout().await.context("failed to clear session")?;
            tracing::info!("Logged out");
        }
        AccountSubcommands::Whoami => {
            match client
                .current_user()
                .await
                .context("failed to fetch current user")?
            {
                Some(user) => tracing::info!("{user}"),
                None => tracing::info!("Not logged in"),
            }
        }
        AccountSubcommands::Profile => {
            let profile = client.user_profile().await?;
            tracing::info!("ID: {}", profile.id);
            tracing::info!("Username: {}", profile.username);
            tracing::info!("Email: {}", profile.email);
            tracing::info!("Joined: {}", profile.created_at.as_deref().unwrap_or("-"));
            tracing::info!("Avatar: {}", profile.avatar.as_deref().unwrap_or("-"));
        }
        AccountSubcommands::UpdateProfile(args) => {
            let update = ProfileUpdate {
                avatar: args.avatar,
                username: args.username,
                email: args.email,
            };
            let updated = client
                .update_profile(&update)
                .await
                .context("failed to update profile")?;
            tracing::info!("Updated: {updated}");
        }
        AccountSubcommands::UploadAvatar(args) => {
            let bytes = std::fs::read(&args.file)
                .with_context(|| format!("failed to read {}", args.file.display()))?;
            let file_name = args
                .file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("avatar")
                .to_owned();
            let upload = AvatarUpload {
                file_name,
                mime_type: String::from(image_mime_type(&args.file)),
                bytes,
            };
            let uploaded = client
                .upload_profile_picture(upload)
                .await
                .context("failed to upload avatar")?;
            tracing::info!("Avatar URL: {}", uploaded.url);
        }
        AccountSubcommands::Avatars => {
            let list = client.avatars().await.context("failed to fetch avatars")?;
            for avatar in &list.avatars {
                tracing::info!("{}\t{}", avatar.filename, avatar.url);
            }
            tracing::info!("Total: {} avatars", list.avatars.len());
        }
        AccountSubcommands::Refresh => {
            client.refresh_token().await?;
            tracing::info!("Session refreshed");
        }
    }

    Ok(())
}

/// Runs a `library` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or a propagating request fails.
#[instrument(skip_all)]
async fn run_library(command: LibrarySubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let ClientContext { client, .. } = build_context(dir)?;

    match command {
        LibrarySubcommands::Watchlist => {
            let items = client.watchlist().await;
            tracing::info!("ID\tAdded\t\tTitle");
            for item in &items {
                tracing::info!(
                    "{}\t{}\t{}",
                    item.id,
                    item.added_at.as_deref().unwrap_or("-"),
                    item.title
                );
            }
            tracing::info!("Total: {} movies", items.len());
        }
        LibrarySubcommands::ToggleWatchlist(args) => {
            let toggled = client
                .toggle_watchlist(args.id)
                .await
                .context("failed to toggle watch list")?;
            if toggled.in_watchlist {
                tracing::info!("Added {} to watch list", args.id);
            } else {
                tracing::info!("Removed {} from watch list", args.id);
            }
        }
        LibrarySubcommands::History(args) => {
            let history = client.watch_history(args.limit).await;
            log_movies(&history);
            tracing::info!("Total: {} movies", history.len());
        }
        LibrarySubcommands::AddHistory(args) => {
            let response = client
                .add_to_watch_history(&args.id)
                .await
                .context("failed to add to watch history")?;
            tracing::info!(
                "{}",
                response.message.as_deref().unwrap_or("Added to watch history")
            );
        }
        LibrarySubcommands::RemoveHistory(args) => {
            client
                .remove_from_watch_history(args.id)
                .await
                .context("failed to remove from watch history")?;
            tracing::info!("Removed {} from watch history", args.id);
        }
        LibrarySubcommands::Rate(args) => {
            client
                .rate_movie(args.id, args.rating)
                .await
                .context("failed to rate movie")?;
            tracing::info!("Rated {} with {}", args.id, args.rating);
        }
        LibrarySubcommands::Rating(args) => match client.movie_rating(args.id).await {
            Some(rating) => tracing::info!("Rating: {rating}"),
            None => tracing::info!("Not rated"),
        },
        LibrarySubcommands::Ratings => {
            let list = client
                .user_ratings()
                .await
                .context("failed to fetch ratings")?;
            tracing::info!("ID\tRating\tTitle");
            for rated in &list.ratings {
                tracing::info!(
                    "{}\t{}\t{}",
                    rated.id,
                    rated.rating,
                    rated.title.as_deref().unwrap_or("-")
                );
            }
            tracing::info!("Total: {} ratings", list.ratings.len());
        }
    }

    Ok(())
}

/// Runs a `config` subcommand.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or written.
fn run_config(command: &ConfigSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_config_path(dir)?;

    match command {
        ConfigSubcommands::Init => {
            if path.exists() {
                tracing::info!("Config already exists: {}", path.display());
                return Ok(());
            }
            AppConfig::default().save(&path)?;
            tracing::info!("Wrote {}", path.display());
        }
        ConfigSubcommands::Show => {
            let config = AppConfig::load(&path)?;
            tracing::info!("Config: {}", path.display());
            tracing::info!("Hostname: {}", config.api.hostname);
            tracing::info!(
                "Base URL: {}",
                config.api.base_url.as_deref().unwrap_or("-")
            );
            let token_state = if config
                .tmdb_token(std::env::var(TMDB_TOKEN_ENV).ok())
                .is_some()
            {
                "set"
            } else {
                "not set"
            };
            tracing::info!("TMDB token: {token_state}");
            tracing::info!(
                "TMDB language: {}",
                config.tmdb.language.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Movies(cmd) => run_movies(cmd.command, cli.dir.as_ref()).await,
        Commands::Recommend(cmd) => run_recommend(cmd.command, cli.dir.as_ref()).await,
        Commands::Account(cmd) => run_account(cmd.command, cli.dir.as_ref()).await,
        Commands::Library(cmd) => run_library(cmd.command, cli.dir.as_ref()).await,
        Commands::Config(cmd) => run_config(&cmd.command, cli.dir.as_ref()),
    }
}
