//! View state of the chat client.

use regchat_core::conversation::{ConversationListItem, Transcript, highlight_active};
use regchat_core::regulation::{RegulationItem, RegulationPicker};
use serde::Serialize;

pub const HISTORY_FAILED: &str = "Failed to load conversation history.";
pub const HISTORY_EMPTY: &str = "No previous conversations found.";
pub const LOAD_FAILED: &str = "Unable to load the conversation. Please try again later.";
pub const REGULATION_UNAVAILABLE: &str =
    "Unable to load the conversation because the selected regulation is no longer available.";
pub const SEND_FAILED: &str =
    "Sorry, there was an error processing your request. Please try again.";
pub const NO_MESSAGES: &str = "No messages found in this conversation.";
pub const REGULATIONS_FAILED: &str = "Failed to load regulations.";
pub const SIGN_IN_REQUIRED: &str = "Your session has ended. Sign in again to send this message.";

/// Enablement of the chat input controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlState {
    pub input_enabled: bool,
    pub send_enabled: bool,
    pub new_chat_enabled: bool,
}

impl ControlState {
    pub fn all_enabled() -> Self {
        Self {
            input_enabled: true,
            send_enabled: true,
            new_chat_enabled: true,
        }
    }

    /// State while a message is in flight.
    pub fn all_disabled() -> Self {
        Self {
            input_enabled: false,
            send_enabled: false,
            new_chat_enabled: false,
        }
    }

    /// Chat without a selected regulation: nothing to send to.
    pub fn chat_disabled() -> Self {
        Self {
            input_enabled: false,
            send_enabled: false,
            new_chat_enabled: true,
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::chat_disabled()
    }
}

/// Conversation history panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "items", rename_all = "camelCase")]
pub enum ConversationPanel {
    #[default]
    Loading,
    Items(Vec<ConversationListItem>),
    Empty,
    Error,
}

impl ConversationPanel {
    /// Text shown in place of the list, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Empty => Some(HISTORY_EMPTY),
            Self::Error => Some(HISTORY_FAILED),
            Self::Loading | Self::Items(_) => None,
        }
    }

    pub fn items(&self) -> &[ConversationListItem] {
        match self {
            Self::Items(items) => items,
            _ => &[],
        }
    }

    pub(crate) fn highlight(&mut self, active_id: Option<&str>) {
        if let Self::Items(items) = self {
            highlight_active(items, active_id);
        }
    }
}

/// Regulation picker dialog.
#[derive(Debug, Clone, Default)]
pub enum PickerPanel {
    #[default]
    Hidden,
    Loading,
    Ready(RegulationPicker),
    Error,
}

impl PickerPanel {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Error => Some(REGULATIONS_FAILED),
            _ => None,
        }
    }

    pub fn picker(&self) -> Option<&RegulationPicker> {
        match self {
            Self::Ready(picker) => Some(picker),
            _ => None,
        }
    }
}

/// Everything the chat panel displays.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Conversation follow-up messages are appended to
    pub current_conversation_id: Option<String>,
    pub selected_regulation: Option<RegulationItem>,
    /// Shown as "Welcome, {name}" once signed in
    pub welcome_name: Option<String>,
    pub controls: ControlState,
    /// A reply is being awaited
    pub typing: bool,
    pub transcript: Transcript,
    pub conversations: ConversationPanel,
    pub picker: PickerPanel,
    /// The picker can only be closed once a regulation has been chosen.
    pub picker_dismissable: bool,
    /// No usable token; the host shows its sign-in prompt
    pub login_required: bool,
}

impl UiState {
    pub fn welcome_text(&self) -> Option<String> {
        self.welcome_name
            .as_ref()
            .map(|name| format!("Welcome, {name}"))
    }

    pub fn selected_regulation_text(&self) -> Option<String> {
        self.selected_regulation
            .as_ref()
            .map(|regulation| format!("Selected: {}", regulation.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_messages() {
        assert_eq!(ConversationPanel::Empty.message(), Some(HISTORY_EMPTY));
        assert_eq!(ConversationPanel::Error.message(), Some(HISTORY_FAILED));
        assert_eq!(ConversationPanel::Loading.message(), None);
        assert_eq!(PickerPanel::Error.message(), Some(REGULATIONS_FAILED));
        assert!(!PickerPanel::Hidden.is_visible());
    }

    #[test]
    fn test_default_ui_has_chat_disabled() {
        let ui = UiState::default();
        assert!(!ui.controls.input_enabled);
        assert!(ui.controls.new_chat_enabled);
        assert!(ui.welcome_text().is_none());
    }

    #[test]
    fn test_conversation_panel_serialization() {
        let value = serde_json::to_value(ConversationPanel::Empty).unwrap();
        assert_eq!(value, serde_json::json!({"state": "empty"}));
    }
}
