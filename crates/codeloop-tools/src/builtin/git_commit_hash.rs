// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool::{Tool, ToolCall, ToolOutput};

/// Returns the current HEAD commit hash via `git rev-parse HEAD`.
/// Read-only. Falls back to "unknown" outside a git repository. Also called
/// directly by the Context Builder to populate `current_commit`.
pub struct GitCommitHashTool;

#[async_trait]
impl Tool for GitCommitHashTool {
    fn name(&self) -> &str {
        "git_commit_hash"
    }

    fn description(&self) -> &str {
        "Returns the current HEAD commit hash. Falls back to \"unknown\" outside a git repository."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "additionalProperties": false })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        ToolOutput::ok(&call.id, current_commit_hash().await)
    }
}

pub async fn current_commit_hash() -> String {
    match tokio::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .stdin(std::process::Stdio::null())
        .output()
        .await
    {
        Ok(out) if out.status.success() => {
            String::from_utf8_lossy(&out.stdout).trim().to_string()
        }
        _ => "unknown".to_string(),
    }
}
