// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod mock;
mod ollama;
mod provider;
mod types;

pub use mock::{MockClient, ScriptedMockClient};
pub use ollama::OllamaClient;
pub use provider::ModelClient;
pub use types::{GenerateOptions, ModelResponse, ResponseMetadata};

use codeloop_config::ModelConfig;

/// Construct a boxed [`ModelClient`] from configuration.
///
/// `"mock"` selects [`MockClient`] for tests and offline runs; anything else
/// is treated as an Ollama-compatible endpoint reachable at `base_url`.
pub fn from_config(cfg: &ModelConfig) -> Box<dyn ModelClient> {
    if cfg.provider == "mock" {
        return Box::new(MockClient);
    }
    let client = OllamaClient::new(cfg.base_url.clone(), cfg.name.clone())
        .with_temperature(cfg.temperature)
        .with_max_tokens(cfg.max_tokens);
    Box::new(client)
}
