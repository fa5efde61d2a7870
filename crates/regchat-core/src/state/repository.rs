//! Client state repository trait.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::auth::IdToken;
use crate::error::{RegchatError, Result};
use crate::regulation::RegulationItem;
use crate::state::model::ClientState;

/// Repository for the persisted client state.
///
/// Setters read the current state, change one field and save the result.
/// Implementations only need `get_state` and `save_state`.
#[async_trait]
pub trait ClientStateRepository: Send + Sync {
    async fn get_state(&self) -> Result<ClientState>;

    /// Saves the whole state, replacing what was stored.
    async fn save_state(&self, state: ClientState) -> Result<()>;

    async fn get_selected_regulation(&self) -> Result<Option<RegulationItem>> {
        Ok(self.get_state().await?.selected_regulation)
    }

    async fn set_selected_regulation(&self, regulation: RegulationItem) -> Result<()> {
        let mut state = self.get_state().await?;
        state.selected_regulation = Some(regulation);
        self.save_state(state).await
    }

    async fn get_user_id(&self) -> Result<Option<String>> {
        Ok(self.get_state().await?.user_id)
    }

    async fn remove_user_id(&self) -> Result<()> {
        let mut state = self.get_state().await?;
        if state.user_id.take().is_some() {
            self.save_state(state).await?;
        }
        Ok(())
    }

    async fn get_id_token(&self) -> Result<Option<IdToken>> {
        Ok(self.get_state().await?.id_token)
    }

    async fn set_id_token(&self, token: IdToken) -> Result<()> {
        let mut state = self.get_state().await?;
        state.id_token = Some(token);
        self.save_state(state).await
    }

    async fn clear_id_token(&self) -> Result<()> {
        let mut state = self.get_state().await?;
        if state.id_token.take().is_some() {
            self.save_state(state).await?;
        }
        Ok(())
    }
}

/// Keeps the state in memory. Used by tests and embedders that manage
/// persistence themselves.
#[derive(Debug, Default)]
pub struct InMemoryClientStateRepository {
    state: Mutex<ClientState>,
}

impl InMemoryClientStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ClientState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

#[async_trait]
impl ClientStateRepository for InMemoryClientStateRepository {
    async fn get_state(&self) -> Result<ClientState> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| RegchatError::internal("client state lock poisoned"))
    }

    async fn save_state(&self, state: ClientState) -> Result<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| RegchatError::internal("client state lock poisoned"))?;
        *guard = state;
        Ok(())
    }
}
