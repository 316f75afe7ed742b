//! Text generation over an OpenAI-compatible chat-completions endpoint.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use lingua_core::CapabilityError;
use lingua_core::config::{ConfigError, GatewaySettings, InvokeSettings};
use lingua_invoker::{Endpoint, HyperTransport, InvokeError, Request, RetryPolicy, Transport, call_with_retry};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerateError {
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error("failed to encode generation request: {0}")]
    Encode(String),

    #[error("unexpected completion body: {0}")]
    Malformed(String),

    #[error("model returned no content")]
    Empty,
}

impl From<GenerateError> for CapabilityError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::Invoke(e) => e.into(),
            GenerateError::Empty => CapabilityError::Empty,
            other => CapabilityError::Malformed(other.to_string()),
        }
    }
}

/// One chat message. `content` is plain text or a list of parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user message carrying an inline image followed by `text`.
    pub fn user_with_image(data_url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url.into() },
                },
                ContentPart::Text { text: text.into() },
            ]),
        }
    }
}

pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<String, GenerateError>> + Send + 'a>>;

pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, messages: &'a [ChatMessage]) -> GenerateFuture<'a>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionsGenerator {
    transport: Arc<dyn Transport>,
    endpoint: Endpoint,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    policy: RetryPolicy,
}

impl ChatCompletionsGenerator {
    pub fn new(transport: Arc<dyn Transport>, endpoint: Endpoint, model: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint,
            model: model.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
            policy: RetryPolicy::translate(),
        }
    }

    /// Build from `[gateway]` and `[invoke]`; the API key is read from the
    /// configured environment variable if set.
    pub fn from_settings(gateway: &GatewaySettings, invoke: &InvokeSettings) -> Result<Self, ConfigError> {
        let endpoint = Endpoint::parse(&gateway.generator).ok_or_else(|| ConfigError::Invalid {
            field: "gateway.generator",
            reason: format!("expected host:port, got {:?}", gateway.generator),
        })?;
        let mut generator = Self::new(Arc::new(HyperTransport::new()), endpoint, gateway.model.clone())
            .with_policy(RetryPolicy::from_settings(invoke));
        if let Ok(key) = std::env::var(&gateway.api_key_env) {
            generator = generator.with_api_key(key);
        }
        Ok(generator)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, messages: &[ChatMessage]) -> Result<Request, GenerateError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
        };
        let mut request = Request::post_json(COMPLETIONS_PATH, &body).map_err(|e| GenerateError::Encode(e.to_string()))?;
        if let Some(key) = &self.api_key {
            request = request.header("authorization", format!("Bearer {key}"));
        }
        Ok(request)
    }
}

impl TextGenerator for ChatCompletionsGenerator {
    fn generate<'a>(&'a self, messages: &'a [ChatMessage]) -> GenerateFuture<'a> {
        Box::pin(async move {
            let request = self.request(messages)?;
            debug!(endpoint = %self.endpoint, model = %self.model, messages = messages.len(), "requesting completion");
            let response = call_with_retry(
                self.transport.as_ref(),
                &self.endpoint,
                &request,
                self.timeout,
                &self.policy,
            )
            .await?;
            let completion: CompletionResponse = response
                .json()
                .map_err(|e| GenerateError::Malformed(e.to_string()))?;
            completion
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .filter(|content| !content.trim().is_empty())
                .ok_or(GenerateError::Empty)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua_invoker::transport::TransportFuture;
    use lingua_invoker::{Response, TransportError};
    use std::sync::Mutex;

    /// Records requests and answers every one with the same reply.
    struct Canned {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<Request>>,
    }

    impl Canned {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn send<'a>(&'a self, _endpoint: &'a Endpoint, request: &'a Request) -> TransportFuture<'a> {
            self.seen.lock().unwrap().push(request.clone());
            let status = axum::http::StatusCode::from_u16(self.status).unwrap();
            Box::pin(async move { Ok::<_, TransportError>(Response::new(status, self.body.as_bytes().to_vec())) })
        }
    }

    fn generator(transport: Arc<Canned>) -> ChatCompletionsGenerator {
        ChatCompletionsGenerator::new(transport, Endpoint::local(11434), "test-model")
    }

    #[test]
    fn image_message_serializes_as_parts() {
        let msg = ChatMessage::user_with_image("data:image/png;base64,AAAA", "Extract");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"][0]["type"], "image_url");
        assert_eq!(value["content"][0]["image_url"]["url"], "data:image/png;base64,AAAA");
        assert_eq!(value["content"][1]["type"], "text");
        assert_eq!(value["content"][1]["text"], "Extract");

        let plain = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(plain["content"], "hi");
    }

    #[tokio::test]
    async fn reads_first_choice() {
        let transport = Arc::new(Canned::new(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"Hola"}}]}"#,
        ));
        let generator = generator(transport.clone()).with_api_key("sk-test");
        let out = generator.generate(&[ChatMessage::user("Translate")]).await.unwrap();
        assert_eq!(out, "Hola");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].path, COMPLETIONS_PATH);
        assert!(seen[0]
            .headers
            .iter()
            .any(|(k, v)| k == "authorization" && v == "Bearer sk-test"));
        let body: serde_json::Value = serde_json::from_slice(seen[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["content"], "Translate");
    }

    #[tokio::test]
    async fn empty_choices_is_empty() {
        let generator = generator(Arc::new(Canned::new(200, r#"{"choices":[]}"#)));
        assert_eq!(
            generator.generate(&[ChatMessage::user("x")]).await.unwrap_err(),
            GenerateError::Empty
        );
    }

    #[tokio::test]
    async fn non_json_is_malformed() {
        let generator = generator(Arc::new(Canned::new(200, "<html>")));
        assert!(matches!(
            generator.generate(&[ChatMessage::user("x")]).await.unwrap_err(),
            GenerateError::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn http_error_is_not_retried() {
        let transport = Arc::new(Canned::new(401, r#"{"error":"bad key"}"#));
        let generator = generator(transport.clone());
        let err = generator.generate(&[ChatMessage::user("x")]).await.unwrap_err();
        assert!(matches!(err, GenerateError::Invoke(InvokeError::Http { .. })));
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn from_settings_rejects_bad_endpoint() {
        let mut gateway = lingua_core::LinguaConfig::default().gateway_settings();
        gateway.generator = "nonsense".to_string();
        let invoke = lingua_core::LinguaConfig::default().invoke_settings().unwrap();
        assert!(ChatCompletionsGenerator::from_settings(&gateway, &invoke).is_err());
    }
}
