// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::Value;

/// A single tool invocation requested by the Planner.
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Opaque identifier, forwarded verbatim into the ToolOutput.
    pub id: String,
    pub name: String,
    /// Parsed JSON arguments — passed through to `execute` unchanged.
    pub args: Value,
}

/// The result of executing a tool.
///
/// `output` is free-form; `error` is set iff `success` is false.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub call_id: String,
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl ToolOutput {
    pub fn ok(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            success: true,
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn err(call_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            success: false,
            output: None,
            error: Some(msg.into()),
        }
    }
}

/// Trait that every built-in tool must implement.
///
/// Parameter handling: a tool receives `call.args` unchanged and is
/// responsible for validating and aliasing its own parameters (e.g.
/// `pattern` as a synonym for `query`). The registry and executor never
/// interpret or rewrite parameters — unknown parameters are silently
/// ignored by the tool.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema for accepted parameters.
    fn parameters_schema(&self) -> Value;
    /// Whether this tool mutates durable state (files, VCS). Destructive
    /// tools are gated on a confirmation by the Executor.
    fn is_destructive(&self) -> bool {
        false
    }
    /// Execute the tool. Failures are reported via `ToolOutput::err`, never
    /// via a panic — a tool call is synchronous and total from the
    /// Executor's point of view.
    async fn execute(&self, call: &ToolCall) -> ToolOutput;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct MinimalTool;

    #[async_trait]
    impl Tool for MinimalTool {
        fn name(&self) -> &str {
            "minimal"
        }
        fn description(&self) -> &str {
            "a minimal tool"
        }
        fn parameters_schema(&self) -> Value {
            json!({ "type": "object" })
        }
        async fn execute(&self, call: &ToolCall) -> ToolOutput {
            ToolOutput::ok(&call.id, "ok")
        }
    }

    #[test]
    fn default_is_destructive_is_false() {
        assert!(!MinimalTool.is_destructive());
    }

    #[tokio::test]
    async fn ok_sets_success_and_output() {
        let out = ToolOutput::ok("1", "hi");
        assert!(out.success);
        assert_eq!(out.output.as_deref(), Some("hi"));
        assert!(out.error.is_none());
    }

    #[tokio::test]
    async fn err_sets_failure_and_error() {
        let out = ToolOutput::err("1", "boom");
        assert!(!out.success);
        assert!(out.output.is_none());
        assert_eq!(out.error.as_deref(), Some("boom"));
    }
}
