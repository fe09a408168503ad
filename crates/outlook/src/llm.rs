use std::time::Duration;

use async_trait::async_trait;
use cardscope_core::config::LlmConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const ENDPOINT_CHAT: &str = "/chat/completions";

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("llm request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("llm request failed: {0}")]
    Network(String),
    #[error("llm returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("llm response was invalid: {0}")]
    InvalidResponse(String),
    #[error("llm client could not be built: {0}")]
    Build(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Chat-completions client for OpenAI and API-compatible providers.
pub struct OpenAiChatClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| LlmError::Build(error.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
        })
    }

    /// Builds a client only when an API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, LlmError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        Self::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.prompt },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(event_name = "outlook.llm.request", model = %self.model, "calling chat completions");

        let response = self
            .client
            .post(format!("{}{}", self.base_url, ENDPOINT_CHAT))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    LlmError::Timeout { timeout_ms: self.timeout.as_millis() as u64 }
                } else {
                    LlmError::Network(error.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|error| {
            if error.is_timeout() {
                LlmError::Timeout { timeout_ms: self.timeout.as_millis() as u64 }
            } else {
                LlmError::InvalidResponse(error.to_string())
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use cardscope_core::config::AppConfig;
    use serde_json::{json, Value};

    use super::{CompletionRequest, LlmClient, LlmError, OpenAiChatClient};

    #[derive(Clone, Default)]
    struct Captured {
        request: Arc<Mutex<Option<(Option<String>, Value)>>>,
    }

    async fn completions(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        if let Ok(mut slot) = captured.request.lock() {
            *slot = Some((auth, body));
        }
        Json(json!({
            "choices": [{"message": {"role": "assistant", "content": "  Steady demand.  "}}]
        }))
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let address = listener.local_addr().expect("listener address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{address}/v1/")
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "be careful".to_string(),
            prompt: "Card details:\nName: Mew".to_string(),
            max_tokens: 180,
            temperature: 0.4,
        }
    }

    fn client(base_url: String) -> OpenAiChatClient {
        OpenAiChatClient::new(
            "sk-test".to_string().into(),
            base_url,
            "gpt-4o-mini",
            Duration::from_secs(5),
        )
        .expect("client should build")
    }

    #[tokio::test]
    async fn complete_posts_chat_request_with_bearer_auth() {
        let captured = Captured::default();
        let router = Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(captured.clone());
        let client = client(serve(router).await);

        let text = client.complete(&request()).await.expect("completion succeeds");
        assert_eq!(text, "  Steady demand.  ");

        let (auth, body) =
            captured.request.lock().expect("lock").clone().expect("request captured");
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 180);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be careful");
        assert_eq!(body["messages"][1]["role"], "user");
        let temperature = body["temperature"].as_f64().expect("temperature is numeric");
        assert!((temperature - 0.4).abs() < 1e-6);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let client = client(serve(router).await);

        let error = client.complete(&request()).await.expect_err("status should fail");
        assert_eq!(error, LlmError::Status { status: 429, body: "slow down".to_string() });
    }

    #[tokio::test]
    async fn empty_choices_are_invalid() {
        let router = Router::new()
            .route("/v1/chat/completions", post(|| async { Json(json!({"choices": []})) }));
        let client = client(serve(router).await);

        let error = client.complete(&request()).await.expect_err("empty choices should fail");
        assert!(matches!(error, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn from_config_without_key_builds_nothing() {
        let config = AppConfig::default();
        let client = OpenAiChatClient::from_config(&config.llm).expect("config is valid");
        assert!(client.is_none());
    }

    #[test]
    fn from_config_with_key_uses_configured_model() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-configured".to_string().into());
        config.llm.model = "gpt-test".to_string();

        let client = OpenAiChatClient::from_config(&config.llm)
            .expect("config is valid")
            .expect("client should be built");
        assert_eq!(client.model(), "gpt-test");
    }
}
