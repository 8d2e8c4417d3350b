// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

/// Per-call generation parameters. All fields are optional — unset fields
/// fall back to the client's configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// A completion from the model.
///
/// `generate` never throws on a transport failure — it reports the failure
/// via `metadata.error` and returns empty `content` instead, so the Planner
/// always has a response object to reason about.
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    pub content: String,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub error: Option<String>,
    pub duration_ms: Option<u64>,
}

impl ModelResponse {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: ResponseMetadata::default(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            metadata: ResponseMetadata {
                error: Some(error.into()),
                duration_ms: None,
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.metadata.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_has_no_error() {
        let r = ModelResponse::ok("hi");
        assert_eq!(r.content, "hi");
        assert!(!r.is_error());
    }

    #[test]
    fn failed_has_empty_content_and_error_set() {
        let r = ModelResponse::failed("connection refused");
        assert!(r.content.is_empty());
        assert!(r.is_error());
        assert_eq!(r.metadata.error.as_deref(), Some("connection refused"));
    }
}
