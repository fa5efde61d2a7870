//! HttpSummarizationApi - REST client for the summarization API.
//!
//! Every request carries the ID token as bearer credential. Requests are
//! sent once; there are no retries and no client-side timeouts.

use async_trait::async_trait;
use regchat_core::api::{SummarizationApi, SummarizeRequest, SummarizeResponse};
use regchat_core::auth::IdToken;
use regchat_core::conversation::{ConversationSummary, LoadedConversation};
use regchat_core::regulation::RegulationItem;
use regchat_core::{RegchatError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadConversationRequest<'a> {
    conversation_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MigrateRequest<'a> {
    user_id: &'a str,
}

/// [`SummarizationApi`] over HTTP.
#[derive(Clone)]
pub struct HttpSummarizationApi {
    client: Client,
    base_url: String,
}

impl HttpSummarizationApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, token: &IdToken, what: &str) -> Result<Response> {
        let response = request
            .header("Authorization", token.bearer())
            .send()
            .await
            .map_err(|e| RegchatError::network(None, format!("{what} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("[Api] {} failed with status {}", what, status);
            return Err(map_http_error(status, what, body));
        }

        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            RegchatError::network(None, format!("Failed to parse {what} response: {e}"))
        })
    }
}

fn map_http_error(status: StatusCode, what: &str, body: String) -> RegchatError {
    if status == StatusCode::UNAUTHORIZED {
        return RegchatError::auth_required(format!("{what} rejected the ID token"));
    }

    let body = body.trim();
    let message = if body.is_empty() {
        format!("{what} returned {status}")
    } else {
        format!("{what} returned {status}: {body}")
    };
    RegchatError::network(Some(status.as_u16()), message)
}

#[async_trait]
impl SummarizationApi for HttpSummarizationApi {
    async fn summarize(
        &self,
        token: &IdToken,
        request: &SummarizeRequest,
    ) -> Result<SummarizeResponse> {
        tracing::debug!(
            "[Api] summarize regulation={} conversation={:?}",
            request.regulation,
            request.conversation_id
        );
        let builder = self.client.post(self.url("/summarize")).json(request);
        let response = self.send(builder, token, "summarize").await?;
        Self::parse(response, "summarize").await
    }

    async fn list_conversations(&self, token: &IdToken) -> Result<Vec<ConversationSummary>> {
        let builder = self
            .client
            .post(self.url("/conversations/list"))
            .header("Content-Type", "application/json");
        let response = self.send(builder, token, "conversations/list").await?;
        Self::parse(response, "conversations/list").await
    }

    async fn load_conversation(
        &self,
        token: &IdToken,
        conversation_id: &str,
    ) -> Result<LoadedConversation> {
        tracing::debug!("[Api] Fetching conversation {}", conversation_id);
        let builder = self
            .client
            .post(self.url("/conversations/load"))
            .json(&LoadConversationRequest { conversation_id });
        let response = self.send(builder, token, "conversations/load").await?;
        Self::parse(response, "conversations/load").await
    }

    async fn list_regulations(&self, token: &IdToken) -> Result<Vec<RegulationItem>> {
        let builder = self.client.get(self.url("/regulations"));
        let response = self.send(builder, token, "regulations").await?;
        Self::parse(response, "regulations").await
    }

    async fn migrate_conversations(&self, token: &IdToken, user_id: &str) -> Result<()> {
        let builder = self
            .client
            .post(self.url("/conversations/migrate"))
            .json(&MigrateRequest { user_id });
        self.send(builder, token, "conversations/migrate").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpSummarizationApi::new("http://localhost:7071/api/");
        assert_eq!(api.url("/summarize"), "http://localhost:7071/api/summarize");
    }

    #[test]
    fn test_map_http_error() {
        let unauthorized = map_http_error(StatusCode::UNAUTHORIZED, "summarize", String::new());
        assert!(unauthorized.is_auth_required());

        let failed = map_http_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "summarize",
            "boom\n".to_string(),
        );
        assert!(matches!(
            failed,
            RegchatError::Network {
                status: Some(500),
                ..
            }
        ));
        assert!(failed.to_string().ends_with(": boom"));
    }
}
