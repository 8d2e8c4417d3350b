// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool::{Tool, ToolCall, ToolOutput};

/// Shows the unstaged (or, with `staged=true`, staged) diff via `git diff`.
/// Read-only.
pub struct GitDiffTool;

#[async_trait]
impl Tool for GitDiffTool {
    fn name(&self) -> &str {
        "git_diff"
    }

    fn description(&self) -> &str {
        "Shows the current diff. path: restrict to a file or directory (optional). \
         staged: show the staged diff instead of the working-tree diff (default false)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Restrict the diff to this file or directory"
                },
                "staged": {
                    "type": "boolean",
                    "description": "Show the staged diff instead of the working-tree diff"
                }
            },
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let path = call.args.get("path").and_then(|v| v.as_str());
        let staged = call.args.get("staged").and_then(|v| v.as_bool()).unwrap_or(false);

        let mut args = vec!["diff".to_string()];
        if staged {
            args.push("--staged".to_string());
        }
        if let Some(p) = path {
            args.push("--".to_string());
            args.push(p.to_string());
        }

        let output = match tokio::process::Command::new("git")
            .args(&args)
            .stdin(std::process::Stdio::null())
            .output()
            .await
        {
            Ok(o) => o,
            Err(e) => return ToolOutput::err(&call.id, format!("git diff error: {e}")),
        };
        if !output.status.success() {
            return ToolOutput::err(
                &call.id,
                format!(
                    "git diff failed: {}",
                    String::from_utf8_lossy(&output.stderr)
                ),
            );
        }
        let diff = String::from_utf8_lossy(&output.stdout).into_owned();
        if diff.trim().is_empty() {
            ToolOutput::ok(&call.id, "(no changes)")
        } else {
            ToolOutput::ok(&call.id, diff)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tool::{Tool, ToolCall};

    #[tokio::test]
    async fn execute_returns_some_result() {
        let out = GitDiffTool
            .execute(&ToolCall {
                id: "d1".into(),
                name: "git_diff".into(),
                args: json!({}),
            })
            .await;
        assert!(out.success || out.error.is_some());
    }
}
