//! Domain layer for the regulation summarization chat client.
//!
//! Everything in this crate is free of I/O: the hierarchy builder and picker
//! for regulations, the conversation transcript and its context window, the
//! identity token model, and the traits the outer layers implement
//! (`SummarizationApi`, `ClientStateRepository`).

pub mod api;
pub mod auth;
pub mod config;
pub mod conversation;
pub mod error;
pub mod regulation;
pub mod state;

// Re-export common error type
pub use error::{ErrorKind, RegchatError, Result};
