// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;

use crate::{GenerateOptions, ModelResponse};

/// Contract for the local LLM endpoint the Planner consults each step.
///
/// Non-streaming and total: `generate` never propagates a transport error —
/// it reports one via [`ModelResponse::failed`] so the caller always has a
/// response to reason about. `is_available` is a cheap, side-effect-free
/// probe used by `codeloop status`.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str, options: Option<GenerateOptions>) -> ModelResponse;
    async fn is_available(&self) -> bool;
}
