use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ProviderErrorBody};

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request to completion provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion provider returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("could not decode completion response: {0}")]
    Decode(#[from] serde_json::Error),
}

// external "complete chat" capability
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CompletionError>;
}

// OpenAI-compatible chat completions client
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CompletionError> {
        let mut builder = self.client.post(self.endpoint()).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let res = builder.send().await?;
        let status = res.status();
        let body = res.bytes().await?;
        debug!(%status, bytes = body.len(), "completion response received");

        if !status.is_success() {
            return Err(CompletionError::Status {
                status,
                message: provider_message(&body),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

// Pull `error.message` out of a provider error body, else return the raw text
fn provider_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ProviderErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatMessage;
    use axum::{Json, Router, http::HeaderMap, routing::post};
    use serde_json::{Value, json};

    // Serve `app` on an ephemeral port and return its base URL
    async fn spawn_provider(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            temperature: 0.2,
            max_tokens: 800,
        }
    }

    #[tokio::test]
    async fn sends_bearer_auth_and_decodes_choices() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({
                    "choices": [{"message": {
                        "role": "assistant",
                        "content": format!(
                            "{} {}",
                            auth,
                            body["messages"][1]["content"].as_str().unwrap_or_default()
                        )
                    }}]
                }))
            }),
        );
        let base_url = spawn_provider(app).await;
        let api_key = Some("sk-test".to_string());
        let client = OpenAiClient::new(&base_url, api_key, Duration::from_secs(5)).unwrap();

        let resp = client.complete(&request()).await.unwrap();

        assert_eq!(resp.reply_text(), Some("Bearer sk-test hi"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": {"message": "quota exceeded"}})),
                )
            }),
        );
        let base_url = spawn_provider(app).await;
        let client = OpenAiClient::new(&base_url, None, Duration::from_secs(5)).unwrap();

        match client.complete(&request()).await {
            Err(CompletionError::Status { status, message }) => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"choices": []}))
            }),
        );
        let base_url = spawn_provider(app).await;
        let client = OpenAiClient::new(&base_url, None, Duration::from_millis(100)).unwrap();

        match client.complete(&request()).await {
            Err(CompletionError::Transport(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_decode_error() {
        let app =
            Router::new().route("/v1/chat/completions", post(|| async { "<html>oops</html>" }));
        let base_url = spawn_provider(app).await;
        let client = OpenAiClient::new(&base_url, None, Duration::from_secs(5)).unwrap();

        assert!(matches!(
            client.complete(&request()).await,
            Err(CompletionError::Decode(_))
        ));
    }

    #[test]
    fn provider_message_prefers_error_envelope() {
        let body = br#"{"error": {"message": "Incorrect API key provided",
            "type": "invalid_request_error"}}"#;
        assert_eq!(provider_message(body), "Incorrect API key provided");
    }

    #[test]
    fn provider_message_falls_back_to_raw_body() {
        assert_eq!(provider_message(b"  upstream timeout\n"), "upstream timeout");
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client =
            OpenAiClient::with_client(reqwest::Client::new(), "http://localhost:8000/v1/", None);
        assert_eq!(client.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn status_error_carries_detail() {
        let err = CompletionError::Status {
            status: StatusCode::UNAUTHORIZED,
            message: "bad key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "completion provider returned 401 Unauthorized: bad key"
        );
    }
}
