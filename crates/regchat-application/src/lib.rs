//! Application layer for regchat.
//!
//! `ChatController` implements the chat panel's event handlers on top of the
//! summarization API and the client state repository. All view state lives
//! in the `UiState` it owns.

pub mod controller;
pub mod ui_state;

pub use controller::{ChatController, Flow};
pub use ui_state::{ControlState, ConversationPanel, PickerPanel, UiState};
