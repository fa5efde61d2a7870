//! The rendered message list of the chat panel.
//!
//! Each exchange renders as a prompt entry followed by a response entry.
//! Notices and inline errors are entries too. After every mutation the host
//! calls [`Transcript::apply_window`], which drops the old scope separator,
//! recomputes the window from the current entry count, marks historical
//! entries and re-inserts the separator. Applying it twice without a mutation
//! in between changes nothing.

use super::model::ConversationMessage;
use super::window::{ContextWindow, compute_window};
use serde::Serialize;

/// Text of the scope boundary marker.
pub const SEPARATOR_TEXT: &str =
    "The previous messages are considered out of scope to the current conversation but will be retained.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// User-authored text; always displayed as plain text
    Prompt,
    /// Assistant reply; markdown
    Response,
    /// Informational message from the client itself
    Notice,
    /// Inline error message
    Error,
    /// Boundary between historical and in-context entries
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub text: String,
    /// Outside the active context window
    pub historical: bool,
}

impl TranscriptEntry {
    fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            historical: false,
        }
    }

    pub fn is_separator(&self) -> bool {
        self.kind == EntryKind::Separator
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries, separator excluded.
    pub fn message_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_separator()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn push_prompt(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::new(EntryKind::Prompt, text));
    }

    pub fn push_response(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::new(EntryKind::Response, text));
    }

    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::new(EntryKind::Notice, text));
    }

    pub fn push_error(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::new(EntryKind::Error, text));
    }

    /// Appends a prompt and a response entry per message.
    ///
    /// The log must already be sorted by sequence.
    pub fn extend_from_log(&mut self, log: &[ConversationMessage]) {
        for message in log {
            self.push_prompt(message.prompt_raw.clone());
            self.push_response(message.response.clone());
        }
    }

    /// Position of the separator, if one is present.
    pub fn separator_index(&self) -> Option<usize> {
        self.entries.iter().position(TranscriptEntry::is_separator)
    }

    /// Re-marks historical entries for a window of `window_size` pairs.
    pub fn apply_window(&mut self, window_size: usize) -> ContextWindow {
        self.entries.retain(|entry| !entry.is_separator());

        let window = compute_window(self.entries.len(), window_size);
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.historical = window.is_historical(index);
        }

        if let Some(after) = window.separator_after() {
            self.entries
                .insert(after + 1, TranscriptEntry::new(EntryKind::Separator, SEPARATOR_TEXT));
        }

        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript_with_pairs(pairs: usize) -> Transcript {
        let log: Vec<ConversationMessage> = (0..pairs)
            .map(|i| ConversationMessage::new(i as i64, format!("q{i}"), format!("a{i}")))
            .collect();
        let mut transcript = Transcript::new();
        transcript.extend_from_log(&log);
        transcript
    }

    #[test]
    fn test_log_doubles_into_entries() {
        let transcript = transcript_with_pairs(3);
        let kinds: Vec<EntryKind> = transcript.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Prompt,
                EntryKind::Response,
                EntryKind::Prompt,
                EntryKind::Response,
                EntryKind::Prompt,
                EntryKind::Response,
            ]
        );
    }

    #[test]
    fn test_short_transcript_has_no_separator() {
        let mut transcript = transcript_with_pairs(5);
        let window = transcript.apply_window(7);

        assert!(!window.has_separator);
        assert!(transcript.separator_index().is_none());
        assert!(transcript.entries().iter().all(|e| !e.historical));
    }

    #[test]
    fn test_long_transcript_marks_and_separates() {
        let mut transcript = transcript_with_pairs(10);
        let window = transcript.apply_window(7);

        assert_eq!(window.start_gray_index, 6);
        assert_eq!(transcript.separator_index(), Some(6));
        assert_eq!(transcript.message_count(), 20);

        let entries = transcript.entries();
        assert!(entries[..6].iter().all(|e| e.historical));
        assert_eq!(entries[6].text, SEPARATOR_TEXT);
        assert!(entries[7..].iter().all(|e| !e.historical));
        assert_eq!(entries[7].text, "q3");
    }

    #[test]
    fn test_apply_window_is_idempotent() {
        let mut transcript = transcript_with_pairs(10);
        transcript.apply_window(7);
        let first = transcript.clone();

        transcript.apply_window(7);

        assert_eq!(transcript, first);
        let separators = transcript.entries().iter().filter(|e| e.is_separator()).count();
        assert_eq!(separators, 1);
    }

    #[test]
    fn test_separator_moves_after_append() {
        let mut transcript = transcript_with_pairs(8);
        transcript.apply_window(7);
        assert_eq!(transcript.separator_index(), Some(2));

        transcript.push_prompt("q8");
        transcript.push_response("a8");
        transcript.apply_window(7);

        assert_eq!(transcript.separator_index(), Some(4));
        let separators = transcript.entries().iter().filter(|e| e.is_separator()).count();
        assert_eq!(separators, 1);
    }

    #[test]
    fn test_growing_window_clears_marks() {
        let mut transcript = transcript_with_pairs(10);
        transcript.apply_window(7);
        transcript.apply_window(10);

        assert!(transcript.separator_index().is_none());
        assert!(transcript.entries().iter().all(|e| !e.historical));
    }

    #[test]
    fn test_empty_transcript_is_noop() {
        let mut transcript = Transcript::new();
        let window = transcript.apply_window(7);
        assert_eq!(window.entry_count, 0);
        assert!(transcript.is_empty());
    }
}
