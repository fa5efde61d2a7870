//! Chat panel event handlers.
//!
//! `ChatController` is the single writer of [`UiState`]. Every handler takes
//! `&mut self`, so events are applied one at a time in the order the host
//! delivers them; awaiting an API call suspends the handler without letting
//! another one interleave.

use crate::ui_state::{
    ControlState, ConversationPanel, LOAD_FAILED, NO_MESSAGES, PickerPanel,
    REGULATION_UNAVAILABLE, SEND_FAILED, SIGN_IN_REQUIRED, UiState,
};
use chrono::{DateTime, Utc};
use regchat_core::api::{SummarizationApi, SummarizeRequest};
use regchat_core::auth::{
    AuthorizeRequest, IdToken, IdentityProvider, parse_callback, require_valid,
};
use regchat_core::conversation::{build_list_items, sort_by_sequence};
use regchat_core::regulation::{NodePath, RegulationItem, RegulationPicker, find_by_partition_key};
use regchat_core::state::ClientStateRepository;
use regchat_core::{RegchatError, Result};
use std::sync::Arc;

/// What the host has to do after a handler returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Render the updated state.
    Continue,
    /// The token is missing or expired; send the user to the identity
    /// provider. No API request was made.
    Reauthenticate { login_url: String },
}

pub struct ChatController {
    api: Arc<dyn SummarizationApi>,
    state_repository: Arc<dyn ClientStateRepository>,
    identity: IdentityProvider,
    window_size: usize,
    clock: fn() -> DateTime<Utc>,
    pending_login: Option<AuthorizeRequest>,
    ui: UiState,
}

impl ChatController {
    /// # Arguments
    ///
    /// * `api` - Summarization API client
    /// * `state_repository` - Persisted selection, legacy user id and token
    /// * `identity` - Builds the sign-in and sign-out redirects
    /// * `window_size` - Message pairs kept in context
    pub fn new(
        api: Arc<dyn SummarizationApi>,
        state_repository: Arc<dyn ClientStateRepository>,
        identity: IdentityProvider,
        window_size: usize,
    ) -> Self {
        Self {
            api,
            state_repository,
            identity,
            window_size,
            clock: Utc::now,
            pending_login: None,
            ui: UiState::default(),
        }
    }

    /// Replaces the time source used for expiry checks and elapsed labels.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    // ============================================================================
    // Authentication
    // ============================================================================

    async fn valid_token(&self) -> Result<IdToken> {
        let token = self.state_repository.get_id_token().await?;
        require_valid(token.as_ref(), (self.clock)()).cloned()
    }

    /// Starts a sign-in. The returned URL goes to the identity provider.
    pub fn login_url(&mut self) -> String {
        let request = self.identity.authorize();
        let url = request.url.clone();
        self.pending_login = Some(request);
        url
    }

    fn reauthenticate(&mut self, reason: &RegchatError) -> Flow {
        tracing::info!("[Controller] Sign-in required: {}", reason);
        self.ui.login_required = true;
        Flow::Reauthenticate {
            login_url: self.login_url(),
        }
    }

    /// Handles the redirect back from the identity provider and stores the
    /// token it carries.
    pub async fn complete_login(&mut self, callback_url: &str) -> Result<()> {
        let pending = self.pending_login.as_ref();
        let token = parse_callback(
            callback_url,
            pending.map(|req| req.state.as_str()),
            pending.map(|req| req.nonce.as_str()),
        )?;
        if token.is_expired((self.clock)()) {
            return Err(RegchatError::auth_required("ID token has expired"));
        }

        self.state_repository.set_id_token(token).await?;
        self.pending_login = None;
        self.ui.login_required = false;
        tracing::info!("[Controller] Signed in");
        Ok(())
    }

    /// URL that ends the provider session. The stored token is kept until the
    /// sign-out callback arrives.
    pub async fn logout_url(&self) -> Result<String> {
        let token = self.state_repository.get_id_token().await?;
        Ok(self.identity.logout_url(token.as_ref()))
    }

    /// Handles the sign-out callback.
    pub async fn complete_signout(&mut self) -> Result<()> {
        self.state_repository.clear_id_token().await?;
        self.ui = UiState {
            login_required: true,
            ..UiState::default()
        };
        tracing::info!("[Controller] Signed out");
        Ok(())
    }

    // ============================================================================
    // Startup
    // ============================================================================

    /// Startup sequence: migrate legacy conversations, greet the user, restore
    /// the selected regulation (or open the picker), start a new chat and load
    /// the conversation history.
    pub async fn init(&mut self) -> Result<Flow> {
        let token = match self.valid_token().await {
            Ok(token) => token,
            Err(e) if e.is_auth_required() => return Ok(self.reauthenticate(&e)),
            Err(e) => return Err(e),
        };
        self.ui.login_required = false;

        if let Err(e) = self.migrate_conversations_if_needed(&token).await {
            tracing::warn!("[Controller] Conversation migration failed: {}", e);
        }

        self.ui.welcome_name = token.display_name().map(str::to_string);

        self.ui.selected_regulation = self.state_repository.get_selected_regulation().await?;
        if self.ui.selected_regulation.is_some() {
            self.ui.controls = ControlState::all_enabled();
        } else {
            self.ui.controls = ControlState::chat_disabled();
            if let Flow::Reauthenticate { login_url } = self.open_regulation_picker().await {
                return Ok(Flow::Reauthenticate { login_url });
            }
        }

        self.new_chat();
        Ok(self.fetch_conversation_history().await)
    }

    /// Moves conversations of the legacy anonymous user id to the signed-in
    /// user. The id is forgotten only after the API accepted the migration.
    ///
    /// Returns whether a migration took place.
    pub async fn migrate_conversations_if_needed(&self, token: &IdToken) -> Result<bool> {
        let Some(user_id) = self.state_repository.get_user_id().await? else {
            return Ok(false);
        };

        tracing::info!("[Controller] Migrating conversations of legacy user id");
        self.api.migrate_conversations(token, &user_id).await?;
        self.state_repository.remove_user_id().await?;
        Ok(true)
    }

    // ============================================================================
    // Conversation history
    // ============================================================================

    /// Reloads the history panel, newest first, with the open conversation
    /// highlighted.
    pub async fn fetch_conversation_history(&mut self) -> Flow {
        let token = match self.valid_token().await {
            Ok(token) => token,
            Err(e) if e.is_auth_required() => return self.reauthenticate(&e),
            Err(e) => {
                tracing::error!("[Controller] Error fetching conversations: {}", e);
                self.ui.conversations = ConversationPanel::Error;
                return Flow::Continue;
            }
        };

        match self.api.list_conversations(&token).await {
            Ok(conversations) if conversations.is_empty() => {
                self.ui.conversations = ConversationPanel::Empty;
            }
            Ok(conversations) => {
                let items = build_list_items(
                    conversations,
                    (self.clock)(),
                    self.ui.current_conversation_id.as_deref(),
                );
                self.ui.conversations = ConversationPanel::Items(items);
            }
            Err(e) if e.is_auth_required() => return self.reauthenticate(&e),
            Err(e) => {
                tracing::error!("[Controller] Error fetching conversations: {}", e);
                self.ui.conversations = ConversationPanel::Error;
            }
        }
        Flow::Continue
    }

    /// Opens a stored conversation.
    ///
    /// The conversation's regulation must still be offered by the API;
    /// otherwise the transcript shows an inline error and the current
    /// conversation is left unchanged.
    pub async fn load_conversation(&mut self, conversation_id: &str) -> Flow {
        tracing::info!("[Controller] Loading conversation {}", conversation_id);

        let token = match self.valid_token().await {
            Ok(token) => token,
            Err(e) if e.is_auth_required() => return self.reauthenticate(&e),
            Err(e) => return self.show_load_failure(&e),
        };

        match self.try_load_conversation(&token, conversation_id).await {
            Ok(()) => Flow::Continue,
            Err(e) if e.is_auth_required() => self.reauthenticate(&e),
            Err(e) if e.is_data_inconsistency() => {
                tracing::error!("[Controller] {}", e);
                self.ui.transcript.clear();
                self.ui.transcript.push_error(REGULATION_UNAVAILABLE);
                self.ui.transcript.apply_window(self.window_size);
                Flow::Continue
            }
            Err(e) => self.show_load_failure(&e),
        }
    }

    fn show_load_failure(&mut self, error: &RegchatError) -> Flow {
        tracing::error!("[Controller] Error loading conversation: {}", error);
        self.ui.transcript.clear();
        self.ui.transcript.push_error(LOAD_FAILED);
        self.ui.transcript.apply_window(self.window_size);
        Flow::Continue
    }

    async fn try_load_conversation(&mut self, token: &IdToken, conversation_id: &str) -> Result<()> {
        let mut loaded = self.api.load_conversation(token, conversation_id).await?;
        let regulations = self.api.list_regulations(token).await?;

        let regulation = find_by_partition_key(&regulations, &loaded.regulation)
            .cloned()
            .ok_or_else(|| RegchatError::data_inconsistency(&loaded.regulation, conversation_id))?;

        tracing::debug!(
            "[Controller] Valid regulation found: {} ({})",
            regulation.title,
            regulation.partition_key
        );
        self.set_selected_regulation(regulation).await?;

        self.ui.transcript.clear();
        if loaded.log.is_empty() {
            self.ui.transcript.push_notice(NO_MESSAGES);
        } else {
            sort_by_sequence(&mut loaded.log);
            self.ui.transcript.extend_from_log(&loaded.log);
        }
        self.ui.transcript.apply_window(self.window_size);

        self.ui.current_conversation_id = Some(conversation_id.to_string());
        self.ui
            .conversations
            .highlight(self.ui.current_conversation_id.as_deref());
        Ok(())
    }

    // ============================================================================
    // Chat
    // ============================================================================

    /// Sends a message in the current conversation, or starts one.
    ///
    /// Blank input is ignored. The controls are disabled while the request is
    /// in flight and enabled again however it ends.
    pub async fn send_message(&mut self, input: &str) -> Flow {
        let message = input.trim();
        if message.is_empty() {
            return Flow::Continue;
        }

        self.ui.transcript.push_prompt(message);
        self.ui.transcript.apply_window(self.window_size);
        self.ui.controls = ControlState::all_disabled();
        self.ui.typing = true;

        let flow = self.submit(message).await;

        self.ui.typing = false;
        self.ui.controls = ControlState::all_enabled();
        flow
    }

    async fn submit(&mut self, message: &str) -> Flow {
        let token = match self.valid_token().await {
            Ok(token) => token,
            Err(e) if e.is_auth_required() => return self.reauthenticate_send(&e),
            Err(e) => return self.show_send_failure(&e),
        };

        let Some(regulation) = self.ui.selected_regulation.as_ref() else {
            return self.show_send_failure(&RegchatError::internal("no regulation selected"));
        };
        tracing::debug!(
            "[Controller] Sending message with regulation {}",
            regulation.partition_key
        );

        let request = SummarizeRequest {
            conversation_id: self.ui.current_conversation_id.clone(),
            query: message.to_string(),
            regulation: regulation.partition_key.clone(),
        };

        match self.api.summarize(&token, &request).await {
            Ok(response) => {
                self.ui.typing = false;
                self.ui.current_conversation_id = Some(response.conversation_id);
                self.ui.transcript.push_response(response.result);

                let flow = self.fetch_conversation_history().await;
                self.ui.transcript.apply_window(self.window_size);
                flow
            }
            Err(e) if e.is_auth_required() => self.reauthenticate_send(&e),
            Err(e) => self.show_send_failure(&e),
        }
    }

    /// The unsent prompt stays in the transcript with a notice under it.
    fn reauthenticate_send(&mut self, reason: &RegchatError) -> Flow {
        self.ui.transcript.push_notice(SIGN_IN_REQUIRED);
        self.ui.transcript.apply_window(self.window_size);
        self.reauthenticate(reason)
    }

    fn show_send_failure(&mut self, error: &RegchatError) -> Flow {
        tracing::error!("[Controller] Error sending message: {}", error);
        self.ui.typing = false;
        self.ui.transcript.push_error(SEND_FAILED);
        self.ui.transcript.apply_window(self.window_size);
        Flow::Continue
    }

    /// Clears the transcript and detaches from the current conversation.
    pub fn new_chat(&mut self) {
        self.ui.transcript.clear();
        self.ui.current_conversation_id = None;
        self.ui.conversations.highlight(None);
    }

    // ============================================================================
    // Regulation picker
    // ============================================================================

    /// Shows the picker and loads the regulations into it.
    pub async fn open_regulation_picker(&mut self) -> Flow {
        self.ui.picker = PickerPanel::Loading;
        self.ui.picker_dismissable = self.ui.selected_regulation.is_some();

        let result = match self.valid_token().await {
            Ok(token) => self.api.list_regulations(&token).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(regulations) => {
                self.ui.picker = PickerPanel::Ready(RegulationPicker::new(&regulations));
                Flow::Continue
            }
            Err(e) if e.is_auth_required() => {
                self.ui.picker = PickerPanel::Hidden;
                self.reauthenticate(&e)
            }
            Err(e) => {
                tracing::error!("[Controller] Error loading regulations: {}", e);
                self.ui.picker = PickerPanel::Error;
                Flow::Continue
            }
        }
    }

    /// Expands or collapses a picker section. Returns the new expanded state.
    pub fn toggle_picker_section(&mut self, path: &NodePath) -> Result<bool> {
        match &mut self.ui.picker {
            PickerPanel::Ready(picker) => picker.toggle(path),
            _ => Err(RegchatError::not_found("picker section", path.to_string())),
        }
    }

    /// Chooses the regulation at `path`, closes the picker and starts a new
    /// chat about it.
    pub async fn select_regulation(&mut self, path: &NodePath) -> Result<RegulationItem> {
        let regulation = match &self.ui.picker {
            PickerPanel::Ready(picker) => picker.select(path)?.clone(),
            _ => return Err(RegchatError::not_found("picker entry", path.to_string())),
        };

        self.set_selected_regulation(regulation.clone()).await?;
        self.ui.picker = PickerPanel::Hidden;
        self.ui.controls = ControlState::all_enabled();
        self.new_chat();
        Ok(regulation)
    }

    /// Hides the picker, unless no regulation has been chosen yet.
    pub fn close_regulation_picker(&mut self) -> bool {
        if self.ui.picker_dismissable {
            self.ui.picker = PickerPanel::Hidden;
        }
        !self.ui.picker.is_visible()
    }

    async fn set_selected_regulation(&mut self, regulation: RegulationItem) -> Result<()> {
        tracing::info!(
            "[Controller] Setting selected regulation: {} ({})",
            regulation.title,
            regulation.partition_key
        );
        self.state_repository
            .set_selected_regulation(regulation.clone())
            .await?;
        self.ui.selected_regulation = Some(regulation);
        self.ui.picker_dismissable = true;
        Ok(())
    }
}
