use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::cache::CompletionCache;
use crate::config::LlmConfig;
use crate::history::ChatMessage;
use crate::logging::RequestLog;
use crate::protocol::{Model, RequestError, TransformationRequest};

/// Every way a completion call can fail, as values. Nothing above this
/// boundary sees a raw transport fault; callers branch on the variant.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("missing API credential: {0}")]
    Configuration(String),
    #[error("provider rejected credential: {0}")]
    Authentication(String),
    #[error("rate limited by provider: {0}")]
    RateLimited(String),
    #[error("connection to provider failed: {0}")]
    Connection(String),
    #[error("provider returned status {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("provider returned no choices")]
    NoChoices,
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
    #[error("unexpected failure: {0}")]
    Unknown(String),
}

impl CompletionError {
    /// Short stable label for logs and timing entries.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Configuration(_) => "configuration",
            CompletionError::Authentication(_) => "authentication",
            CompletionError::RateLimited(_) => "rate_limited",
            CompletionError::Connection(_) => "connection",
            CompletionError::Provider { .. } => "provider_status",
            CompletionError::NoChoices => "no_choices",
            CompletionError::InvalidRequest(_) => "invalid_request",
            CompletionError::Unknown(_) => "unknown",
        }
    }

    /// Whether an immediate manual retry of the same request is reasonable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited(_)
                | CompletionError::Connection(_)
                | CompletionError::Provider { .. }
                | CompletionError::NoChoices
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    pub n: usize,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

impl From<&ChatMessage> for ApiMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub choices: Vec<ApiChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiChoice {
    pub message: ApiMessageBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessageBody {
    pub content: String,
}

/// Seam between the client and the wire. Production uses [`HttpTransport`];
/// tests script responses through a fake.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, body: &ApiRequest) -> Result<ApiResponse, CompletionError>;
}

/// Reqwest-backed transport for an OpenAI-compatible chat-completions endpoint.
pub struct HttpTransport {
    http: Client,
    url: String,
    api_key: String,
}

impl HttpTransport {
    /// Resolve the credential and build the HTTP client. A missing or empty
    /// credential is fatal here, before any request is attempted.
    pub fn from_config(config: &LlmConfig) -> Result<Self, CompletionError> {
        let api_key = resolve_api_key(config)?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CompletionError::Unknown(format!("failed to build HTTP client: {e}")))?;

        let url = chat_completions_url(config.base_url.as_deref());

        Ok(Self { http, url, api_key })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, body: &ApiRequest) -> Result<ApiResponse, CompletionError> {
        let resp = self
            .http
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        resp.json()
            .await
            .map_err(|e| CompletionError::Unknown(format!("malformed provider response: {e}")))
    }
}

fn resolve_api_key(config: &LlmConfig) -> Result<String, CompletionError> {
    if let Ok(key) = std::env::var(&config.api_key_env) {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }

    // Secondary source: a key file, for setups that avoid env vars.
    if let Some(ref path) = config.api_key_file {
        if let Ok(contents) = std::fs::read_to_string(path) {
            let key = contents.trim();
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }
    }

    Err(CompletionError::Configuration(format!(
        "set {} (or llm.api_key_file in the config) to your provider API key",
        config.api_key_env
    )))
}

fn classify_status(status: u16, body: String) -> CompletionError {
    match status {
        401 | 403 => CompletionError::Authentication(body),
        429 => CompletionError::RateLimited(body),
        _ => CompletionError::Provider { status, body },
    }
}

fn classify_transport_error(error: reqwest::Error) -> CompletionError {
    if error.is_connect() || error.is_timeout() {
        CompletionError::Connection(error.to_string())
    } else {
        CompletionError::Unknown(error.to_string())
    }
}

fn chat_completions_url(base_url: Option<&str>) -> String {
    match base_url.map(str::trim).filter(|b| !b.is_empty()) {
        Some(base) => {
            let base = base.trim_end_matches('/');
            if base.ends_with("/v1") {
                format!("{base}/chat/completions")
            } else {
                format!("{base}/v1/chat/completions")
            }
        }
        None => format!("{}/v1/chat/completions", crate::config::DEFAULT_BASE_URL),
    }
}

/// Wraps the provider call with memoization and per-attempt timing.
pub struct CompletionClient {
    transport: Arc<dyn Transport>,
    cache: CompletionCache,
    request_log: Option<RequestLog>,
}

impl CompletionClient {
    pub fn new(transport: Arc<dyn Transport>, request_log: Option<RequestLog>) -> Self {
        Self {
            transport,
            cache: CompletionCache::new(),
            request_log,
        }
    }

    /// Run one transform request: cache hit returns the stored choices without
    /// touching the network; a miss issues exactly one provider call (no
    /// automatic retries). Only successes populate the cache, so a failed call
    /// followed by an identical retry goes back to the provider.
    pub async fn complete(
        &self,
        request: &TransformationRequest,
    ) -> Result<Vec<String>, CompletionError> {
        if let Some(choices) = self.cache.get(request).await {
            tracing::debug!(model = %request.model(), "completion cache hit");
            return Ok(choices);
        }

        let messages = vec![ApiMessage {
            role: "user".to_string(),
            content: request.prompt(),
        }];
        let choices = self
            .execute(
                request.model(),
                messages,
                request.variant_count(),
                request.temperature(),
            )
            .await?;

        self.cache.insert(request, choices.clone()).await;
        Ok(choices)
    }

    /// Run one history-bearing chat turn. Not memoized: the payload depends on
    /// the whole conversation, not just the latest message.
    pub async fn converse(
        &self,
        messages: &[ChatMessage],
        model: Model,
        temperature: f32,
    ) -> Result<String, CompletionError> {
        let wire: Vec<ApiMessage> = messages.iter().map(ApiMessage::from).collect();
        let mut choices = self.execute(model, wire, 1, temperature).await?;
        Ok(choices.remove(0))
    }

    async fn execute(
        &self,
        model: Model,
        messages: Vec<ApiMessage>,
        n: usize,
        temperature: f32,
    ) -> Result<Vec<String>, CompletionError> {
        let body = ApiRequest {
            model: model.id().to_string(),
            messages,
            n,
            temperature,
        };

        let started = Instant::now();
        let result = self.transport.execute(&body).await.and_then(|resp| {
            if resp.choices.is_empty() {
                // A well-formed response with zero choices is a valid provider
                // answer, not a transport fault.
                return Err(CompletionError::NoChoices);
            }
            Ok(resp
                .choices
                .into_iter()
                .map(|choice| choice.message.content)
                .collect::<Vec<_>>())
        });
        let elapsed = started.elapsed();

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        tracing::debug!(
            model = %model,
            variants = n,
            elapsed_ms = elapsed.as_millis() as u64,
            outcome,
            "completion attempt"
        );
        if let Some(ref log) = self.request_log {
            log.record(model.id(), n, elapsed, outcome);
        }

        result
    }
}
