//! TMDB image CDN URLs.

/// Poster size prefix.
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Backdrop size prefix.
pub const BACKDROP_BASE_URL: &str = "https://image.tmdb.org/t/p/original";

/// Local image shown when a movie has no poster.
pub const POSTER_PLACEHOLDER: &str = "../assets/images/placeholder.jpg";

/// Local image shown when a movie has no backdrop.
pub const BACKDROP_PLACEHOLDER: &str = "assets/images/placeholder-backdrop.jpg";

/// Poster URL for a TMDB path fragment such as `/abc.jpg`.
#[must_use]
pub fn poster_url(path: Option<&str>) -> String {
    compose(POSTER_BASE_URL, POSTER_PLACEHOLDER, path)
}

/// Backdrop URL for a TMDB path fragment.
#[must_use]
pub fn backdrop_url(path: Option<&str>) -> String {
    compose(BACKDROP_BASE_URL, BACKDROP_PLACEHOLDER, path)
}

fn compose(base: &str, placeholder: &str, path: Option<&str>) -> String {
    match path {
        Some(p) if !p.is_empty() => format!("{base}{p}"),
        _ => String::from(placeholder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_url_with_path() {
        // Arrange & Act
        let url = poster_url(Some("/kqjL17yufvn9OVLyXYpvtyrFfak.jpg"));

        // Assert
        assert_eq!(
            url,
            "https://image.tmdb.org/t/p/w500/kqjL17yufvn9OVLyXYpvtyrFfak.jpg"
        );
    }

    #[test]
    fn test_missing_or_empty_path_uses_placeholder() {
        // Arrange & Act & Assert
        assert_eq!(poster_url(None), POSTER_PLACEHOLDER);
        assert_eq!(poster_url(Some("")), POSTER_PLACEHOLDER);
        assert_eq!(backdrop_url(None), BACKDROP_PLACEHOLDER);
    }

    #[test]
    fn test_backdrop_uses_original_size() {
        // Arrange & Act
        let url = backdrop_url(Some("/bg.jpg"));

        // Assert
        assert_eq!(url, "https://image.tmdb.org/t/p/original/bg.jpg");
    }
}
