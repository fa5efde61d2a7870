//! Renderers for transcript entries, the conversation list and the picker.

pub mod html;
pub mod terminal;
