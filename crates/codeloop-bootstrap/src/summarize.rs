// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! `summarize` — an LLM-backed tool.
//!
//! Lives here rather than in `codeloop-tools` so that tool construction can
//! depend on a `ModelClient` without `codeloop-tools` depending on
//! `codeloop-model` (the same circular-dependency avoidance `TaskTool` used
//! in the teacher crate this workspace is built from).
use std::sync::Arc;

use async_trait::async_trait;
use codeloop_model::ModelClient;
use codeloop_tools::{Tool, ToolCall, ToolOutput};
use serde_json::{json, Value};

/// Asks the model for a short summary of arbitrary text — typically a file
/// or tool-output excerpt the Planner decided was worth condensing.
pub struct SummarizeTool {
    model: Arc<dyn ModelClient>,
}

impl SummarizeTool {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Tool for SummarizeTool {
    fn name(&self) -> &str {
        "summarize"
    }

    fn description(&self) -> &str {
        "Summarize a piece of text (file content, command output) in a few sentences."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "Text to summarize" }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let Some(text) = call.args.get("text").and_then(Value::as_str) else {
            return ToolOutput::err(&call.id, "missing 'text' parameter");
        };
        let prompt = format!("Summarize the following in 2-3 sentences:\n\n{text}");
        let response = self.model.generate(&prompt, None).await;
        if response.is_error() {
            return ToolOutput::err(
                &call.id,
                format!("summarize failed: {}", response.metadata.error.unwrap_or_default()),
            );
        }
        ToolOutput::ok(&call.id, response.content)
    }
}
