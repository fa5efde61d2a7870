//! Context window over a rendered transcript.
//!
//! The backend only considers the last `window_size` prompt/response pairs
//! when answering. Each pair renders as two entries, so the window covers
//! the last `window_size * 2` entries; everything before it is historical.

use serde::Serialize;

/// Number of message pairs kept in context by default.
pub const DEFAULT_WINDOW_PAIRS: usize = 7;

/// Result of a window computation over `entry_count` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextWindow {
    pub entry_count: usize,
    /// Entries with a lower index are historical
    pub start_gray_index: usize,
    pub has_separator: bool,
}

impl ContextWindow {
    pub fn is_historical(&self, index: usize) -> bool {
        index < self.start_gray_index
    }

    /// Index of the entry the separator follows.
    pub fn separator_after(&self) -> Option<usize> {
        self.has_separator.then(|| self.start_gray_index - 1)
    }

    pub fn historical_count(&self) -> usize {
        self.start_gray_index
    }
}

/// Computes which entries of a transcript are in context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindowManager {
    window_size: usize,
}

impl ContextWindowManager {
    /// `window_size` counts message pairs, not entries.
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn compute_window(&self, entry_count: usize) -> ContextWindow {
        compute_window(entry_count, self.window_size)
    }
}

impl Default for ContextWindowManager {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_PAIRS)
    }
}

/// Window over `entry_count` entries keeping the last `window_size` pairs.
///
/// The separator goes after the last historical entry, unless that entry is
/// also the last one of the transcript.
pub fn compute_window(entry_count: usize, window_size: usize) -> ContextWindow {
    let effective_limit = window_size.saturating_mul(2);

    if entry_count <= effective_limit {
        return ContextWindow {
            entry_count,
            start_gray_index: 0,
            has_separator: false,
        };
    }

    let start_gray_index = entry_count - effective_limit;
    let last_historical = start_gray_index - 1;

    ContextWindow {
        entry_count,
        start_gray_index,
        has_separator: last_historical < entry_count - 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_transcript_is_fully_active() {
        let window = compute_window(10, 7);
        assert_eq!(window.start_gray_index, 0);
        assert!(!window.has_separator);
        assert!((0..10).all(|i| !window.is_historical(i)));
    }

    #[test]
    fn test_exact_limit_is_fully_active() {
        let window = compute_window(14, 7);
        assert_eq!(window.historical_count(), 0);
        assert_eq!(window.separator_after(), None);
    }

    #[test]
    fn test_long_transcript_grays_leading_entries() {
        let window = compute_window(20, 7);
        assert_eq!(window.start_gray_index, 6);
        assert!(window.has_separator);
        assert_eq!(window.separator_after(), Some(5));
        assert!((0..6).all(|i| window.is_historical(i)));
        assert!((6..20).all(|i| !window.is_historical(i)));
    }

    #[test]
    fn test_empty_transcript() {
        let window = compute_window(0, 7);
        assert_eq!(window.start_gray_index, 0);
        assert!(!window.has_separator);
    }

    #[test]
    fn test_zero_window_never_places_trailing_separator() {
        let window = compute_window(4, 0);
        assert_eq!(window.start_gray_index, 4);
        assert!(!window.has_separator);
    }

    #[test]
    fn test_manager_uses_configured_size() {
        let manager = ContextWindowManager::new(2);
        assert_eq!(manager.compute_window(6).start_gray_index, 2);
        assert_eq!(ContextWindowManager::default().window_size(), DEFAULT_WINDOW_PAIRS);
    }

    #[test]
    fn test_compute_is_deterministic() {
        assert_eq!(compute_window(31, 7), compute_window(31, 7));
    }
}
