//! Conversations: API models, history listing, transcript and context window.

mod listing;
mod model;
mod transcript;
mod window;

pub use listing::{
    ConversationListItem, build_list_items, format_elapsed, highlight_active, sort_conversations,
};
pub use model::{
    ConversationMessage, ConversationSummary, LoadedConversation, parse_timestamp,
    sort_by_sequence,
};
pub use transcript::{EntryKind, SEPARATOR_TEXT, Transcript, TranscriptEntry};
pub use window::{ContextWindow, ContextWindowManager, DEFAULT_WINDOW_PAIRS, compute_window};
