/// Text optimizer — the single point of entry for calls to the external
/// rewriting API.
///
/// The rest of the service only sees `TextOptimizer::optimize(text) -> text`.
/// Transport concerns (proxy routes, retries, timeout) stay in this module.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Proxy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::OptimizerConfig;
use crate::text::escape_html;

pub mod handlers;
pub mod prompts;

const MAX_RETRIES: u32 = 3;
const TEMPERATURE: f32 = 0.7;
const TOP_K: u32 = 40;
const TOP_P: f32 = 0.95;
const MAX_OUTPUT_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("optimizer API key is not configured")]
    NotConfigured,

    #[error("nothing to optimize")]
    EmptyInput,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("optimizer returned no text")]
    EmptyContent,
}

impl OptimizerError {
    fn is_retryable(&self) -> bool {
        matches!(self, OptimizerError::Api { status, .. } if *status == 429 || *status >= 500)
    }
}

/// Rewrites a piece of plain text. Implementations return HTML-safe output
/// that can be substituted directly as block content.
///
/// Carried in `AppState` as `Arc<dyn TextOptimizer>`.
#[async_trait]
pub trait TextOptimizer: Send + Sync {
    async fn optimize(&self, text: &str) -> Result<String, OptimizerError>;
}

pub type SharedOptimizer = Arc<dyn TextOptimizer>;

// ────────────────────────────────────────────────────────────────────────────
// Wire types (generateContent)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl GenerateRequest {
    fn for_text(text: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompts::build_optimize_prompt(text),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_k: TOP_K,
                top_p: TOP_P,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct Route {
    label: String,
    client: Client,
}

/// `generateContent` client. Tries each configured route in order on
/// connection failure and retries 429/5xx with exponential backoff.
#[derive(Clone)]
pub struct GeminiOptimizer {
    routes: Vec<Route>,
    api_key: Option<String>,
    endpoint: String,
}

impl GeminiOptimizer {
    pub fn new(config: &OptimizerConfig) -> Result<Self, OptimizerError> {
        let routes = if config.proxy_urls.is_empty() {
            vec![Route {
                label: "direct".to_string(),
                client: build_client(config.timeout, None)?,
            }]
        } else {
            config
                .proxy_urls
                .iter()
                .map(|url| {
                    Ok(Route {
                        label: url.clone(),
                        client: build_client(config.timeout, Some(Proxy::all(url.as_str())?))?,
                    })
                })
                .collect::<Result<Vec<_>, OptimizerError>>()?
        };

        Ok(Self {
            routes,
            api_key: config.api_key.clone(),
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
        })
    }

    /// One attempt across all routes. A route that fails to connect hands
    /// over to the next one; any HTTP response ends the attempt.
    async fn send_once(&self, api_key: &str, body: &GenerateRequest) -> Result<GenerateResponse, OptimizerError> {
        let mut last_error = None;

        for route in &self.routes {
            let sent = route
                .client
                .post(&self.endpoint)
                .query(&[("key", api_key)])
                .json(body)
                .send()
                .await;

            let response = match sent {
                Ok(r) => r,
                Err(e) => {
                    warn!(route = %route.label, "optimizer route failed: {e}");
                    last_error = Some(OptimizerError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(OptimizerError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            debug!(route = %route.label, "optimizer call succeeded");
            return Ok(response.json().await?);
        }

        Err(last_error.unwrap_or(OptimizerError::EmptyContent))
    }
}

fn build_client(timeout: Duration, proxy: Option<Proxy>) -> Result<Client, OptimizerError> {
    let mut builder = Client::builder().timeout(timeout);
    if let Some(proxy) = proxy {
        builder = builder.proxy(proxy);
    }
    Ok(builder.build()?)
}

#[async_trait]
impl TextOptimizer for GeminiOptimizer {
    async fn optimize(&self, text: &str) -> Result<String, OptimizerError> {
        let api_key = self.api_key.as_deref().ok_or(OptimizerError::NotConfigured)?;
        if text.trim().is_empty() {
            return Err(OptimizerError::EmptyInput);
        }

        let body = GenerateRequest::for_text(text);
        let mut last_error: Option<OptimizerError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "optimizer attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.send_once(api_key, &body).await {
                Ok(response) => {
                    let optimized = response.text().ok_or(OptimizerError::EmptyContent)?;
                    return Ok(escape_html(optimized.trim()));
                }
                Err(e) if e.is_retryable() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(OptimizerError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}
