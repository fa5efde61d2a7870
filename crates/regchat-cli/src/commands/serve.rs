//! `regchat serve`: hosts the web front end.
//!
//! Besides the static assets the server renders HTML fragments for the page:
//! the transcript of a conversation log, the history panel and the picker.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use chrono::Utc;
use regchat_core::auth::{LOGIN_CALLBACK_PATH, SIGNOUT_CALLBACK_PATH};
use regchat_core::config::ClientConfig;
use regchat_core::conversation::{
    ConversationMessage, ConversationSummary, Transcript, build_list_items, sort_by_sequence,
};
use regchat_core::regulation::{RegulationItem, RegulationPicker};
use regchat_interaction::render::html;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Settings the browser client reads at startup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    pub api_base_url: String,
    pub sso_redirect_base_url: String,
}

#[derive(Clone)]
struct ServeState {
    settings: Arc<ClientSettings>,
    static_dir: Arc<PathBuf>,
    window_pairs: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptRequest {
    #[serde(default)]
    log: Vec<ConversationMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationsRequest {
    #[serde(default)]
    conversations: Vec<ConversationSummary>,
    #[serde(default)]
    active_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegulationsRequest {
    #[serde(default)]
    regulations: Vec<RegulationItem>,
}

/// Routes `/` and both callback paths to `index.html`, exposes
/// `/client-config` and the `/render/*` fragments, and serves everything
/// else from the static directory.
pub fn router(config: &ClientConfig) -> Router {
    let state = ServeState {
        settings: Arc::new(ClientSettings {
            api_base_url: config.api_base_url.clone(),
            sso_redirect_base_url: config.sso_redirect_base_url.clone(),
        }),
        static_dir: Arc::new(config.server.static_dir.clone()),
        window_pairs: config.context_window_pairs,
    };

    Router::new()
        .route("/", get(index))
        .route(LOGIN_CALLBACK_PATH, get(index))
        .route(SIGNOUT_CALLBACK_PATH, get(index))
        .route("/client-config", get(client_config))
        .route("/render/transcript", post(render_transcript))
        .route("/render/conversations", post(render_conversations))
        .route("/render/regulations", post(render_regulations))
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index(State(state): State<ServeState>) -> Response {
    let path = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            tracing::error!("[Serve] Failed to read {}: {}", path.display(), e);
            (StatusCode::NOT_FOUND, "index.html not found").into_response()
        }
    }
}

async fn client_config(State(state): State<ServeState>) -> Json<ClientSettings> {
    Json(state.settings.as_ref().clone())
}

/// Sorted log, windowed to the configured number of pairs.
async fn render_transcript(
    State(state): State<ServeState>,
    Json(request): Json<TranscriptRequest>,
) -> Html<String> {
    let mut log = request.log;
    sort_by_sequence(&mut log);

    let mut transcript = Transcript::new();
    transcript.extend_from_log(&log);
    transcript.apply_window(state.window_pairs);
    Html(html::render_transcript(&transcript))
}

async fn render_conversations(Json(request): Json<ConversationsRequest>) -> Html<String> {
    let items = build_list_items(request.conversations, Utc::now(), request.active_id.as_deref());
    Html(
        items
            .iter()
            .map(html::render_conversation_item)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Picker with every section collapsed.
async fn render_regulations(Json(request): Json<RegulationsRequest>) -> Html<String> {
    let picker = RegulationPicker::new(&request.regulations);
    Html(html::render_picker_rows(&picker.rows()))
}

pub async fn run(config: ClientConfig) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(
        "[Serve] Serving {} on http://{}",
        config.server.static_dir.display(),
        listener.local_addr()?
    );
    tracing::info!("[Serve] API base URL: {}", config.api_base_url);

    axum::serve(listener, router(&config)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn start(static_dir: PathBuf) -> String {
        start_with(static_dir, 7).await
    }

    async fn start_with(static_dir: PathBuf, window_pairs: usize) -> String {
        let mut config = ClientConfig::default();
        config.api_base_url = "https://api.example.test/api".to_string();
        config.server.static_dir = static_dir;
        config.context_window_pairs = window_pairs;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(&config);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn public_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>regchat</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log('regchat');").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_callbacks_serve_index() {
        let dir = public_dir();
        let base = start(dir.path().to_path_buf()).await;

        for path in ["/", "/login/callback", "/signout/callback"] {
            let response = reqwest::get(format!("{base}{path}")).await.unwrap();
            assert_eq!(response.status(), 200, "{path}");
            assert_eq!(response.text().await.unwrap(), "<html>regchat</html>");
        }
    }

    #[tokio::test]
    async fn test_static_assets_and_missing_files() {
        let dir = public_dir();
        let base = start(dir.path().to_path_buf()).await;

        let asset = reqwest::get(format!("{base}/app.js")).await.unwrap();
        assert_eq!(asset.text().await.unwrap(), "console.log('regchat');");

        let missing = reqwest::get(format!("{base}/missing.css")).await.unwrap();
        assert_eq!(missing.status(), 404);
    }

    #[tokio::test]
    async fn test_client_config_endpoint() {
        let dir = public_dir();
        let base = start(dir.path().to_path_buf()).await;

        let value: serde_json::Value = reqwest::get(format!("{base}/client-config"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "apiBaseUrl": "https://api.example.test/api",
                "ssoRedirectBaseUrl": "http://localhost:3000"
            })
        );
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let dir = public_dir();
        let base = start(dir.path().to_path_buf()).await;

        let response = reqwest::Client::new()
            .get(format!("{base}/client-config"))
            .header("Origin", "http://other.example.test")
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }

    #[tokio::test]
    async fn test_missing_index_is_not_found() {
        let dir = TempDir::new().unwrap();
        let base = start(dir.path().to_path_buf()).await;

        let response = reqwest::get(format!("{base}/")).await.unwrap();
        assert_eq!(response.status(), 404);
    }

    async fn post_fragment(url: String, body: serde_json::Value) -> String {
        let response = reqwest::Client::new()
            .post(url)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert!(
            response.headers()["content-type"]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        response.text().await.unwrap()
    }

    #[tokio::test]
    async fn test_render_transcript_sorts_and_windows_log() {
        let dir = public_dir();
        let base = start_with(dir.path().to_path_buf(), 1).await;

        let body = post_fragment(
            format!("{base}/render/transcript"),
            serde_json::json!({"log": [
                {"sequence": 2, "promptRaw": "second <b>", "response": "**new**"},
                {"sequence": 1, "promptRaw": "first", "response": "old"}
            ]}),
        )
        .await;

        let first = body.find("first").unwrap();
        let second = body.find("second").unwrap();
        assert!(first < second);
        assert!(body.contains(&format!(r#"id="{}""#, html::SEPARATOR_ID)));
        assert!(body.contains(html::FADED_CLASS));
        assert!(body.contains("second &lt;b&gt;"));
        assert!(body.contains("<strong>new</strong>"));
    }

    #[tokio::test]
    async fn test_render_conversations_marks_active() {
        let dir = public_dir();
        let base = start(dir.path().to_path_buf()).await;

        let body = post_fragment(
            format!("{base}/render/conversations"),
            serde_json::json!({
                "conversations": [
                    {"id": "c1", "name": "Older", "regulation": "OPPS_2024",
                     "updated": "2024-05-01T12:00:00Z", "sequenceCount": 2},
                    {"id": "c2", "name": "Newer", "regulation": "PFS_2024",
                     "updated": "2024-05-02T12:00:00Z", "sequenceCount": 4}
                ],
                "activeId": "c1"
            }),
        )
        .await;

        assert!(body.find("Newer").unwrap() < body.find("Older").unwrap());
        assert!(body.contains(&format!(
            r#"class="conversation-item {}" data-conversation-id="c1""#,
            html::ACTIVE_CONVERSATION_CLASS
        )));
        assert!(body.contains("4 messages"));
    }

    #[tokio::test]
    async fn test_render_regulations_starts_collapsed() {
        let dir = public_dir();
        let base = start(dir.path().to_path_buf()).await;

        let body = post_fragment(
            format!("{base}/render/regulations"),
            serde_json::json!({"regulations": [
                {"title": "OPPS 2024", "partitionKey": "OPPS_2024", "hierarchies": ["CMS/Outpatient"]}
            ]}),
        )
        .await;

        assert!(body.contains("collapsible-section-header"));
        assert!(body.contains("CMS"));
        assert!(body.contains("chevron-down"));
        assert!(!body.contains("OPPS 2024"));
    }

    #[tokio::test]
    async fn test_render_rejects_malformed_body() {
        let dir = public_dir();
        let base = start(dir.path().to_path_buf()).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/render/transcript"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
