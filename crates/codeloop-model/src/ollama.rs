// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::{GenerateOptions, ModelClient, ModelResponse};

#[derive(Debug, Deserialize)]
struct GenerateApiResponse {
    response: String,
}

/// HTTP client for an Ollama-compatible local endpoint. Speaks
/// `POST /api/generate` (non-streaming) for completions and `GET /api/tags`
/// for availability.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct GenerateApiRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<serde_json::Value>,
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn generate(&self, prompt: &str, options: Option<GenerateOptions>) -> ModelResponse {
        let temperature = options
            .as_ref()
            .and_then(|o| o.temperature)
            .unwrap_or(self.temperature);
        let max_tokens = options.as_ref().and_then(|o| o.max_tokens).or(self.max_tokens);

        let mut model_options = json!({ "temperature": temperature });
        if let Some(n) = max_tokens {
            model_options["num_predict"] = json!(n);
        }

        let body = GenerateApiRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: Some(model_options),
        };

        debug!(model = %self.model, url = %self.generate_url(), "model generate request");
        let started = Instant::now();

        let resp = match self.client.post(self.generate_url()).json(&body).send().await {
            Ok(r) => r,
            Err(e) => return ModelResponse::failed(format!("request failed: {e}")),
        };

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return ModelResponse::failed(format!("model endpoint returned {status}: {text}"));
        }

        let parsed: GenerateApiResponse = match resp.json().await {
            Ok(p) => p,
            Err(e) => return ModelResponse::failed(format!("malformed response: {e}")),
        };

        let mut out = ModelResponse::ok(parsed.response);
        out.metadata.duration_ms = Some(started.elapsed().as_millis() as u64);
        out
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(self.tags_url())
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
