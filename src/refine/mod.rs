//! The external refinement collaborator.
//!
//! A hosted language model may rewrite generated code. Its failures are
//! [`RefinementError`]s, kept apart from generator errors.

use crate::config::RefinementConfig;
use crate::error::RefinementError;
use crate::serialize::{StructuredBlock, build_refinement_prompt};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

mod http;

pub use http::{HttpRefinementClient, HttpRefinementConfig};

const MAX_RESPONSE_LOG_CHARS: usize = 4_000;

/// One chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub temperature: f32,
}

#[async_trait]
pub trait RefinementClient: Send + Sync {
    async fn complete(&self, request: RefinementRequest) -> Result<String, RefinementError>;
}

#[async_trait]
impl RefinementClient for Arc<dyn RefinementClient> {
    async fn complete(&self, request: RefinementRequest) -> Result<String, RefinementError> {
        (**self).complete(request).await
    }
}

/// Canned client for tests. Records every request it receives.
pub struct MockRefinementClient {
    pub response: Result<String, RefinementError>,
    pub delay: Duration,
    requests: Mutex<Vec<RefinementRequest>>,
}

impl MockRefinementClient {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: RefinementError) -> Self {
        Self {
            response: Err(error),
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<RefinementRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RefinementClient for MockRefinementClient {
    async fn complete(&self, request: RefinementRequest) -> Result<String, RefinementError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone()
    }
}

/// Returns the body of the first fenced code block, or the trimmed response
/// when it has none.
///
/// A language tag on the opening fence is dropped. An unterminated fence runs
/// to the end of the response.
pub fn extract_code(response: &str) -> String {
    let Some(start) = response.find("```") else {
        return response.trim().to_string();
    };
    let mut body = &response[start + 3..];
    if let Some(newline) = body.find('\n') {
        let tag = body[..newline].trim();
        if tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            body = &body[newline + 1..];
        }
    }
    let body = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim().to_string()
}

fn truncate_for_log(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}...<truncated>")
    } else {
        truncated
    }
}

/// Sends refinement requests through a client under a timeout.
pub struct Refiner<C: RefinementClient> {
    client: C,
    config: RefinementConfig,
}

impl<C: RefinementClient> Refiner<C> {
    pub fn new(client: C, config: RefinementConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Asks the collaborator to rewrite `current_code` for the given blocks and
    /// returns the replacement source.
    pub async fn refine(
        &self,
        blocks: &[StructuredBlock],
        current_code: Option<&str>,
        instruction: &str,
    ) -> Result<String, RefinementError> {
        let prompt = build_refinement_prompt(blocks, current_code, instruction)
            .map_err(|e| RefinementError::Serialization(e.to_string()))?;
        let request = RefinementRequest {
            system: prompt.system,
            user: prompt.user,
            model: self.config.model.clone(),
            temperature: self.config.temperature,
        };

        info!(
            model = %self.config.model,
            blocks = blocks.len(),
            "requesting refinement"
        );
        let response = tokio::time::timeout(self.config.timeout(), self.client.complete(request))
            .await
            .map_err(|_| RefinementError::Timeout(self.config.timeout_secs))??;
        debug!(
            response = %truncate_for_log(&response, MAX_RESPONSE_LOG_CHARS),
            "refinement response"
        );

        let code = extract_code(&response);
        if code.is_empty() {
            return Err(RefinementError::EmptyResponse);
        }
        info!(bytes = code.len(), "refinement accepted");
        Ok(code)
    }
}
