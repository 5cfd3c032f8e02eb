//! Page-number window shown under paginated listings.

use std::ops::RangeInclusive;

/// Number of page links shown around the current page.
pub const MAX_VISIBLE_PAGES: u32 = 5;

/// Which page links to render for a listing.
///
/// The window is centred on the current page and shifted so it stays full
/// near either end. Pages outside the window are reached through links to
/// the first and last page, with an ellipsis where a gap remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Current page (1-based).
    pub current: u32,
    /// Total number of pages.
    pub total: u32,
    /// First page in the window.
    pub start: u32,
    /// Last page in the window.
    pub end: u32,
}

impl PageWindow {
    /// Computes the window with [`MAX_VISIBLE_PAGES`] links.
    #[must_use]
    pub fn new(current: u32, total: u32) -> Self {
        Self::with_size(current, total, MAX_VISIBLE_PAGES)
    }

    /// Computes the window with `visible` links.
    #[must_use]
    pub fn with_size(current: u32, total: u32, visible: u32) -> Self {
        let visible = visible.max(1);
        let total = total.max(1);
        let current = current.clamp(1, total);

        let span = visible.saturating_sub(1);

        let mut start = current.saturating_sub(visible / 2).max(1);
        let end = total.min(start.saturating_add(span));
        if end.saturating_sub(start) < span {
            start = end.saturating_sub(span).max(1);
        }

        Self {
            current,
            total,
            start,
            end,
        }
    }

    /// Pages inside the window.
    #[must_use]
    pub const fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// Whether a separate link to page 1 is needed.
    #[must_use]
    pub const fn show_first(&self) -> bool {
        self.start > 1
    }

    /// Whether an ellipsis sits between page 1 and the window.
    #[must_use]
    pub const fn leading_gap(&self) -> bool {
        self.start > 2
    }

    /// Whether a separate link to the last page is needed.
    #[must_use]
    pub const fn show_last(&self) -> bool {
        self.end < self.total
    }

    /// Whether an ellipsis sits between the window and the last page.
    #[must_use]
    pub const fn trailing_gap(&self) -> bool {
        self.end.saturating_add(1) < self.total
    }

    /// Whether there is a previous page.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current > 1
    }

    /// Whether there is a next page.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current < self.total
    }

    /// Renders the window as text, e.g. `1 … 4 5 [6] 7 8 … 20`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.show_first() {
            parts.push(String::from("1"));
            if self.leading_gap() {
                parts.push(String::from("…"));
            }
        }
        for page in self.pages() {
            if page == self.current {
                parts.push(format!("[{page}]"));
            } else {
                parts.push(page.to_string());
            }
        }
        if self.show_last() {
            if self.trailing_gap() {
                parts.push(String::from("…"));
            }
            parts.push(self.total.to_string());
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_centres_on_current_page() {
        // Arrange & Act
        let window = PageWindow::new(10, 20);

        // Assert
        assert_eq!(window.pages(), 8..=12);
        assert!(window.show_first());
        assert!(window.leading_gap());
        assert!(window.show_last());
        assert!(window.trailing_gap());
    }

    #[test]
    fn test_window_is_anchored_at_the_start() {
        // Arrange & Act
        let window = PageWindow::new(1, 20);

        // Assert
        assert_eq!(window.pages(), 1..=5);
        assert!(!window.show_first());
        assert!(!window.has_previous());
    }

    #[test]
    fn test_window_shifts_back_near_the_end() {
        // Arrange & Act
        let window = PageWindow::new(20, 20);

        // Assert
        assert_eq!(window.pages(), 16..=20);
        assert!(!window.show_last());
        assert!(!window.has_next());
    }

    #[test]
    fn test_window_smaller_than_visible_count() {
        // Arrange & Act
        let window = PageWindow::new(2, 3);

        // Assert
        assert_eq!(window.pages(), 1..=3);
        assert_eq!(window.render(), "1 [2] 3");
    }

    #[test]
    fn test_no_ellipsis_when_adjacent() {
        // Arrange & Act
        let window = PageWindow::new(4, 7);

        // Assert
        assert_eq!(window.pages(), 2..=6);
        assert!(window.show_first());
        assert!(!window.leading_gap());
        assert!(!window.trailing_gap());
        assert_eq!(window.render(), "1 2 3 [4] 5 6 7");
    }

    #[test]
    fn test_render_with_gaps() {
        // Arrange & Act
        let window = PageWindow::new(6, 20);

        // Assert
        assert_eq!(window.render(), "1 … 4 5 [6] 7 8 … 20");
    }

    #[test]
    fn test_out_of_range_current_is_clamped() {
        // Arrange & Act
        let window = PageWindow::new(0, 0);

        // Assert
        assert_eq!(window.current, 1);
        assert_eq!(window.pages(), 1..=1);
    }
}
