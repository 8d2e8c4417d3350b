// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{GenerateOptions, ModelClient, ModelResponse};

/// Deterministic mock client for tests. Echoes the prompt back.
#[derive(Default)]
pub struct MockClient;

#[async_trait]
impl ModelClient for MockClient {
    async fn generate(&self, prompt: &str, _options: Option<GenerateOptions>) -> ModelResponse {
        ModelResponse::ok(format!("MOCK: {prompt}"))
    }

    async fn is_available(&self) -> bool {
        true
    }
}

/// A pre-scripted mock client. Each call to `generate` pops the next
/// response from the front of the queue, so tests can script an exact
/// sequence of model replies across a multi-step plan/execute loop.
pub struct ScriptedMockClient {
    responses: Mutex<Vec<ModelResponse>>,
    available: bool,
    /// Every prompt seen by this client, in call order — lets tests assert
    /// on what the Planner actually sent.
    pub prompts_seen: Mutex<Vec<String>>,
}

impl ScriptedMockClient {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            available: true,
            prompts_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

#[async_trait]
impl ModelClient for ScriptedMockClient {
    async fn generate(&self, prompt: &str, _options: Option<GenerateOptions>) -> ModelResponse {
        self.prompts_seen.lock().unwrap().push(prompt.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            ModelResponse::failed("scripted mock exhausted")
        } else {
            responses.remove(0)
        }
    }

    async fn is_available(&self) -> bool {
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_client_echoes_prompt() {
        let resp = MockClient.generate("hello", None).await;
        assert_eq!(resp.content, "MOCK: hello");
    }

    #[tokio::test]
    async fn mock_client_is_always_available() {
        assert!(MockClient.is_available().await);
    }

    #[tokio::test]
    async fn scripted_client_returns_responses_in_order() {
        let client = ScriptedMockClient::new(vec![
            ModelResponse::ok("first"),
            ModelResponse::ok("second"),
        ]);
        assert_eq!(client.generate("p1", None).await.content, "first");
        assert_eq!(client.generate("p2", None).await.content, "second");
    }

    #[tokio::test]
    async fn scripted_client_exhausted_returns_failure() {
        let client = ScriptedMockClient::new(vec![ModelResponse::ok("only")]);
        let _ = client.generate("p1", None).await;
        let second = client.generate("p2", None).await;
        assert!(second.is_error());
    }

    #[tokio::test]
    async fn scripted_client_records_prompts() {
        let client = ScriptedMockClient::new(vec![ModelResponse::ok("x")]);
        client.generate("seen prompt", None).await;
        assert_eq!(client.prompts_seen.lock().unwrap().as_slice(), ["seen prompt"]);
    }

    #[tokio::test]
    async fn unavailable_client_reports_false() {
        let client = ScriptedMockClient::new(vec![]).unavailable();
        assert!(!client.is_available().await);
    }
}
