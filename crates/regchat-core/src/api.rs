//! Summarization API contract.
//!
//! The remote service answers questions about one regulation at a time and
//! keeps the conversation log server-side. Every call carries the user's ID
//! token as bearer credential.

use crate::auth::IdToken;
use crate::conversation::{ConversationSummary, LoadedConversation};
use crate::error::Result;
use crate::regulation::RegulationItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of `POST /summarize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    /// Absent for the first message of a new conversation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub query: String,
    /// Partition key of the selected regulation
    pub regulation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    pub conversation_id: String,
    pub result: String,
}

/// Operations of the summarization API.
///
/// Implementations report non-2xx answers and transport failures as
/// [`RegchatError::Network`](crate::RegchatError::Network), and a 401 as
/// [`RegchatError::AuthRequired`](crate::RegchatError::AuthRequired).
#[async_trait]
pub trait SummarizationApi: Send + Sync {
    async fn summarize(&self, token: &IdToken, request: &SummarizeRequest)
    -> Result<SummarizeResponse>;

    async fn list_conversations(&self, token: &IdToken) -> Result<Vec<ConversationSummary>>;

    async fn load_conversation(
        &self,
        token: &IdToken,
        conversation_id: &str,
    ) -> Result<LoadedConversation>;

    async fn list_regulations(&self, token: &IdToken) -> Result<Vec<RegulationItem>>;

    /// Moves conversations stored under a legacy anonymous user id to the
    /// signed-in user.
    async fn migrate_conversations(&self, token: &IdToken, user_id: &str) -> Result<()>;
}
