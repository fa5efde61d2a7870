//! File-backed implementations of the regchat core traits: platform paths,
//! the JSON client state repository and the TOML configuration loader.

pub mod config_service;
pub mod paths;
pub mod state_repository;
pub mod storage;

pub use config_service::ConfigService;
pub use paths::RegchatPaths;
pub use state_repository::JsonClientStateRepository;
