// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::tool::{Tool, ToolCall, ToolOutput};

/// Moves or renames a file. Destructive — gated on user confirmation by the
/// Executor.
pub struct FileMoveTool;

#[async_trait]
impl Tool for FileMoveTool {
    fn name(&self) -> &str {
        "file_move"
    }

    fn description(&self) -> &str {
        "Moves or renames a file, creating the destination's parent directories as needed."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "source": {
                    "type": "string",
                    "description": "Path to the file to move"
                },
                "destination": {
                    "type": "string",
                    "description": "Destination path"
                }
            },
            "required": ["source", "destination"]
        })
    }

    fn is_destructive(&self) -> bool {
        true
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let source = match call.args.get("source").and_then(|v| v.as_str()) {
            Some(s) => s.to_string(),
            None => return ToolOutput::err(&call.id, "missing required parameter 'source'"),
        };
        let destination = match call.args.get("destination").and_then(|v| v.as_str()) {
            Some(d) => d.to_string(),
            None => return ToolOutput::err(&call.id, "missing required parameter 'destination'"),
        };

        debug!(source = %source, destination = %destination, "file_move tool");

        if tokio::fs::metadata(&source).await.is_err() {
            return ToolOutput::err(&call.id, format!("source does not exist: {source}"));
        }

        if let Some(parent) = std::path::Path::new(&destination).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    return ToolOutput::err(&call.id, format!("mkdir failed: {e}"));
                }
            }
        }

        match tokio::fs::rename(&source, &destination).await {
            Ok(_) => ToolOutput::ok(&call.id, format!("moved {source} to {destination}")),
            Err(e) => ToolOutput::err(&call.id, format!("move failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tool::{Tool, ToolCall};

    fn call(args: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "m1".into(),
            name: "file_move".into(),
            args,
        }
    }

    fn tmp_path(tag: &str) -> String {
        use std::sync::atomic::{AtomicU32, Ordering};
        static CTR: AtomicU32 = AtomicU32::new(0);
        let n = CTR.fetch_add(1, Ordering::Relaxed);
        format!("/tmp/codeloop_move_{tag}_{}_{n}", std::process::id())
    }

    #[tokio::test]
    async fn moves_file_to_new_path() {
        let src = tmp_path("src");
        let dst = tmp_path("dst");
        std::fs::write(&src, "payload").unwrap();

        let out = FileMoveTool
            .execute(&call(json!({"source": src.clone(), "destination": dst.clone()})))
            .await;
        assert!(out.success, "{:?}", out.error);
        assert!(!std::path::Path::new(&src).exists());
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "payload");
        let _ = std::fs::remove_file(&dst);
    }

    #[tokio::test]
    async fn missing_source_is_error() {
        let out = FileMoveTool
            .execute(&call(
                json!({"source": "/tmp/codeloop_no_such_src_xyz", "destination": "/tmp/codeloop_dst_xyz"}),
            ))
            .await;
        assert!(!out.success);
        assert!(out.error.unwrap().contains("does not exist"));
    }

    #[tokio::test]
    async fn creates_destination_parent_dirs() {
        let src = tmp_path("nestsrc");
        std::fs::write(&src, "x").unwrap();
        let dst_dir = tmp_path("nestdir");
        let dst = format!("{dst_dir}/sub/file.txt");

        let out = FileMoveTool
            .execute(&call(json!({"source": src, "destination": dst.clone()})))
            .await;
        assert!(out.success, "{:?}", out.error);
        assert!(std::path::Path::new(&dst).exists());
        let _ = std::fs::remove_dir_all(&dst_dir);
    }

    #[test]
    fn file_move_is_destructive() {
        assert!(FileMoveTool.is_destructive());
    }
}
