use super::{RefinementClient, RefinementRequest};
use crate::config::RefinementConfig;
use crate::error::RefinementError;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

/// Connection settings for an OpenAI-compatible chat completion API.
#[derive(Debug, Clone)]
pub struct HttpRefinementConfig {
    /// Base URL; `/chat/completions` is appended.
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub extra_headers: HeaderMap,
}

impl HttpRefinementConfig {
    /// Reads the key from the environment variable named in `config`.
    pub fn from_config(config: &RefinementConfig) -> Result<Self, RefinementError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RefinementError::MissingApiKey(config.api_key_env.clone()))?;

        let mut extra_headers = HeaderMap::new();
        insert_header(&mut extra_headers, "http-referer", &config.referer)?;
        insert_header(&mut extra_headers, "x-title", &config.title)?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: Some(api_key),
            timeout_secs: config.timeout_secs,
            extra_headers,
        })
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<(), RefinementError> {
    let value = HeaderValue::from_str(value).map_err(|e| RefinementError::Http(e.to_string()))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

pub struct HttpRefinementClient {
    client: reqwest::Client,
    config: HttpRefinementConfig,
}

impl HttpRefinementClient {
    pub fn new(config: HttpRefinementConfig) -> Result<Self, RefinementError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RefinementError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl RefinementClient for HttpRefinementClient {
    async fn complete(&self, request: RefinementRequest) -> Result<String, RefinementError> {
        let mut headers = self.config.extra_headers.clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            let value = format!("Bearer {}", key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&value).map_err(|e| RefinementError::Http(e.to_string()))?,
            );
        }

        let body = ChatRequest {
            model: request.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user,
                },
            ],
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| RefinementError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RefinementError::Response(format!("HTTP {}: {}", status, text)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| RefinementError::Http(e.to_string()))?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| RefinementError::Serialization(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(RefinementError::EmptyResponse)
    }
}
