// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool::{Tool, ToolCall, ToolOutput};

/// Lists modified/untracked files via `git status --porcelain`. Read-only.
pub struct GitStatusTool;

#[async_trait]
impl Tool for GitStatusTool {
    fn name(&self) -> &str {
        "git_status"
    }

    fn description(&self) -> &str {
        "Lists modified, staged, and untracked files via git status --porcelain."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "additionalProperties": false })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        match modified_files().await {
            Ok(files) if files.is_empty() => ToolOutput::ok(&call.id, "(working tree clean)"),
            Ok(files) => ToolOutput::ok(&call.id, files.join("\n")),
            Err(e) => ToolOutput::err(&call.id, format!("git status error: {e}")),
        }
    }
}

/// Parses `git status --porcelain` output: each non-blank line's status code
/// occupies the first 3 columns, the path follows. Also called directly by
/// the Context Builder to populate `modified_files`.
pub async fn modified_files() -> anyhow::Result<Vec<String>> {
    let output = tokio::process::Command::new("git")
        .args(["status", "--porcelain"])
        .stdin(std::process::Stdio::null())
        .output()
        .await?;
    if !output.status.success() {
        anyhow::bail!("not a git repository");
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.get(3..).unwrap_or("").trim().to_string())
        .filter(|f| !f.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tool::{Tool, ToolCall};

    #[tokio::test]
    async fn execute_does_not_panic_outside_or_inside_a_repo() {
        let out = GitStatusTool
            .execute(&ToolCall {
                id: "s1".into(),
                name: "git_status".into(),
                args: json!({}),
            })
            .await;
        assert!(out.success || out.error.is_some());
    }
}
