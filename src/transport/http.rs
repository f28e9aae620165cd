use async_trait::async_trait;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::client::{ClientConfig, GenerationClient, GenerationRequest, Payload};
use crate::error_code::ProviderErrorKind;
use crate::types::RawResponse;
use crate::{Error, ErrorContext, Result};

/// OpenAI-compatible HTTP client for the chat and legacy completion endpoints.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    organization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
            organization: config.organization,
        })
    }

    /// OpenAI, configured from the environment.
    pub fn openai_from_env() -> Result<Self> {
        Self::new(ClientConfig::openai_from_env())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, payload: &Payload) -> String {
        let path = match payload {
            Payload::Chat(_) => "chat/completions",
            Payload::Completion(_) => "completions",
        };
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn request_body(request: &GenerationRequest) -> serde_json::Value {
        let mut body = json!({
            "model": request.engine,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "top_p": 1,
            "stop": [request.stop_token],
            "n": request.n,
        });
        match &request.payload {
            Payload::Chat(messages) => body["messages"] = json!(messages),
            Payload::Completion(prompts) => body["prompt"] = json!(prompts),
        }
        body
    }

    fn classify_failure(status: u16, body: &str) -> Error {
        let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
        let from_body = parsed.as_ref().and_then(|e| {
            let code = e.code.as_ref().and_then(|c| c.as_str());
            code.and_then(ProviderErrorKind::from_provider_code)
                .or_else(|| {
                    // `invalid_request_error` is the catch-all type; the status says more.
                    e.error_type
                        .as_deref()
                        .and_then(ProviderErrorKind::from_provider_code)
                        .filter(|k| *k != ProviderErrorKind::InvalidRequest)
                })
        });
        let kind = from_body.unwrap_or_else(|| ProviderErrorKind::from_status(status));
        let message = parsed
            .and_then(|e| e.message)
            .unwrap_or_else(|| body.chars().take(512).collect());
        Error::Provider {
            kind,
            status: Some(status),
            message,
        }
    }
}

#[async_trait]
impl GenerationClient for HttpTransport {
    async fn generate(&self, request: &GenerationRequest) -> Result<RawResponse> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::configuration_with_context(
                "no API key configured",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_details(self.base_url.to_string())
                    .with_source("http_transport"),
            )
        })?;

        let url = self.endpoint(&request.payload);
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut req = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("x-request-id", &request_id)
            .json(&Self::request_body(request));
        if let Some(org) = &self.organization {
            if let Ok(value) = HeaderValue::from_str(org) {
                req = req.header("OpenAI-Organization", value);
            }
        }

        debug!(url = %url, engine = %request.engine, request_id = %request_id, "sending completion request");
        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Provider {
                    kind: ProviderErrorKind::Timeout,
                    status: None,
                    message: e.to_string(),
                }
            } else {
                Error::Transport(e)
            }
        })?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Self::classify_failure(status.as_u16(), &body));
        }
        serde_json::from_str::<RawResponse>(&body)
            .map_err(|e| Error::malformed(format!("invalid completion body: {}", e)))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
