// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use codeloop_model::ModelClient;
use codeloop_tools::{Tool, ToolCall, ToolOutput};
use serde_json::{json, Value};

/// Asks the model to analyze code or output against a free-form question —
/// e.g. "what does this function do", "why might this test be flaky".
pub struct AnalyzeTool {
    model: Arc<dyn ModelClient>,
}

impl AnalyzeTool {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Tool for AnalyzeTool {
    fn name(&self) -> &str {
        "analyze"
    }

    fn description(&self) -> &str {
        "Analyze code or command output against a question and return the model's findings."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "Code or output to analyze" },
                "question": { "type": "string", "description": "What to look for" }
            },
            "required": ["text", "question"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let Some(text) = call.args.get("text").and_then(Value::as_str) else {
            return ToolOutput::err(&call.id, "missing 'text' parameter");
        };
        let Some(question) = call.args.get("question").and_then(Value::as_str) else {
            return ToolOutput::err(&call.id, "missing 'question' parameter");
        };
        let prompt = format!("{question}\n\n{text}");
        let response = self.model.generate(&prompt, None).await;
        if response.is_error() {
            return ToolOutput::err(
                &call.id,
                format!("analyze failed: {}", response.metadata.error.unwrap_or_default()),
            );
        }
        ToolOutput::ok(&call.id, response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeloop_model::MockClient;

    #[tokio::test]
    async fn analyzes_given_text_and_question() {
        let tool = AnalyzeTool::new(Arc::new(MockClient));
        let call = ToolCall {
            id: "1".into(),
            name: "analyze".into(),
            args: json!({ "text": "fn f() {}", "question": "what does this do" }),
        };
        let out = tool.execute(&call).await;
        assert!(out.success);
    }

    #[tokio::test]
    async fn missing_question_is_error() {
        let tool = AnalyzeTool::new(Arc::new(MockClient));
        let call = ToolCall {
            id: "1".into(),
            name: "analyze".into(),
            args: json!({ "text": "x" }),
        };
        let out = tool.execute(&call).await;
        assert!(!out.success);
    }
}
