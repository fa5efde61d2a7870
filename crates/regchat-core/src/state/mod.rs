//! Persisted client state and its repository.

pub mod model;
pub mod repository;

pub use model::ClientState;
pub use repository::{ClientStateRepository, InMemoryClientStateRepository};
