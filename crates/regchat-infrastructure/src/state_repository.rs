//! JSON-file backed client state repository.

use crate::paths::RegchatPaths;
use crate::storage::AtomicJsonFile;
use regchat_core::error::{RegchatError, Result};
use regchat_core::state::{ClientState, ClientStateRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Stores [`ClientState`] in `state.json`.
///
/// The state is read once on open and cached; every save rewrites the file
/// atomically and updates the cache.
#[derive(Clone)]
pub struct JsonClientStateRepository {
    state: Arc<Mutex<ClientState>>,
    file: Arc<AtomicJsonFile<ClientState>>,
}

impl JsonClientStateRepository {
    /// Opens the repository at the default location.
    pub async fn new() -> Result<Self> {
        Self::open(RegchatPaths::state_file()?).await
    }

    /// Opens the repository at `path`. A missing file yields the default state.
    pub async fn open(path: PathBuf) -> Result<Self> {
        let file = Arc::new(AtomicJsonFile::<ClientState>::new(path));

        let loader = file.clone();
        let initial_state = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| RegchatError::internal(format!("Failed to join task: {}", e)))??
            .unwrap_or_default();

        tracing::debug!(
            "[State] Loaded client state from {}",
            file.path().display()
        );

        Ok(Self {
            state: Arc::new(Mutex::new(initial_state)),
            file,
        })
    }
}

#[async_trait::async_trait]
impl ClientStateRepository for JsonClientStateRepository {
    async fn get_state(&self) -> Result<ClientState> {
        Ok(self.state.lock().await.clone())
    }

    async fn save_state(&self, state: ClientState) -> Result<()> {
        // Hold the cache lock across the write so saves land in call order.
        let mut cached = self.state.lock().await;

        let file = self.file.clone();
        let state_for_save = state.clone();
        tokio::task::spawn_blocking(move || file.save(&state_for_save))
            .await
            .map_err(|e| RegchatError::internal(format!("Failed to join task: {}", e)))??;

        *cached = state;
        Ok(())
    }
}
