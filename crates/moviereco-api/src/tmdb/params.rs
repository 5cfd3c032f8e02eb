//! `discover/movie` filter parameters.

/// Default sort order.
const DEFAULT_SORT_BY: &str = "popularity.desc";

/// Default response language.
const DEFAULT_LANGUAGE: &str = "en-US";

/// Filters for TMDB `discover/movie`.
///
/// Unset optional filters are left out of the query string entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverParams {
    /// Sort order (default: `popularity.desc`).
    pub sort_by: Option<String>,
    /// Result page (0 or unset means 1).
    pub page: Option<u32>,
    /// Response language (default: `en-US`).
    pub language: Option<String>,
    /// Include adult titles.
    pub include_adult: bool,
    /// Comma-separated genre IDs.
    pub with_genres: Option<String>,
    /// Primary release year.
    pub primary_release_year: Option<u32>,
    /// Minimum vote average.
    pub vote_average_gte: Option<f64>,
    /// Minimum vote count.
    pub vote_count_gte: Option<u32>,
    /// Minimum runtime in minutes.
    pub with_runtime_gte: Option<u32>,
    /// Maximum runtime in minutes.
    pub with_runtime_lte: Option<u32>,
}

impl DiscoverParams {
    /// Creates params with every filter unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sort order.
    #[must_use]
    pub fn sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    /// Sets the page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Includes adult titles.
    #[must_use]
    pub const fn include_adult(mut self, include: bool) -> Self {
        self.include_adult = include;
        self
    }

    /// Restricts to the given genres.
    #[must_use]
    pub fn with_genres(mut self, genres: impl Into<String>) -> Self {
        self.with_genres = Some(genres.into());
        self
    }

    /// Restricts to a release year.
    #[must_use]
    pub const fn primary_release_year(mut self, year: u32) -> Self {
        self.primary_release_year = Some(year);
        self
    }

    /// Sets the minimum vote average.
    #[must_use]
    pub const fn vote_average_gte(mut self, average: f64) -> Self {
        self.vote_average_gte = Some(average);
        self
    }

    /// Sets the minimum vote count.
    #[must_use]
    pub const fn vote_count_gte(mut self, count: u32) -> Self {
        self.vote_count_gte = Some(count);
        self
    }

    /// Sets the runtime bounds in minutes.
    #[must_use]
    pub const fn runtime_between(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.with_runtime_gte = min;
        self.with_runtime_lte = max;
        self
    }

    /// Effective page number.
    #[must_use]
    pub fn effective_page(&self) -> u32 {
        self.page.filter(|&p| p > 0).unwrap_or(1)
    }

    /// Builds the query pairs, defaults first, then the set filters.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query: Vec<(&'static str, String)> = vec![
            (
                "sort_by",
                self.sort_by
                    .clone()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| String::from(DEFAULT_SORT_BY)),
            ),
            ("page", self.effective_page().to_string()),
            (
                "language",
                self.language
                    .clone()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE)),
            ),
            ("include_adult", self.include_adult.to_string()),
            ("include_video", String::from("false")),
        ];
        if let Some(ref genres) = self.with_genres {
            query.push(("with_genres", genres.clone()));
        }
        if let Some(year) = self.primary_release_year {
            query.push(("primary_release_year", year.to_string()));
        }
        if let Some(average) = self.vote_average_gte {
            query.push(("vote_average.gte", average.to_string()));
        }
        if let Some(count) = self.vote_count_gte {
            query.push(("vote_count.gte", count.to_string()));
        }
        if let Some(min) = self.with_runtime_gte {
            query.push(("with_runtime.gte", min.to_string()));
        }
        if let Some(max) = self.with_runtime_lte {
            query.push(("with_runtime.lte", max.to_string()));
        }
        query
    }
}
