// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::tool::{Tool, ToolCall, ToolOutput};

/// Writes a file to the local filesystem, overwriting any existing content
/// unless `append` is set. Destructive — gated on user confirmation by the
/// Executor.
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes a file to the local filesystem, creating parent directories as needed. \
         Overwrites an existing file at the given path unless append=true."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Absolute or relative path to the file"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file"
                },
                "append": {
                    "type": "boolean",
                    "description": "If true, append to existing content instead of overwriting (default false)"
                }
            },
            "required": ["file_path", "content"]
        })
    }

    fn is_destructive(&self) -> bool {
        true
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let path = match call.args.get("file_path").and_then(|v| v.as_str()) {
            Some(p) => p.to_string(),
            None => {
                let args_preview =
                    serde_json::to_string(&call.args).unwrap_or_else(|_| "null".to_string());
                return ToolOutput::err(
                    &call.id,
                    format!(
                        "missing required parameter 'file_path'. Received: {}",
                        args_preview
                    ),
                );
            }
        };
        let content = match call.args.get("content").and_then(|v| v.as_str()) {
            Some(c) => c.to_string(),
            None => {
                let args_preview =
                    serde_json::to_string(&call.args).unwrap_or_else(|_| "null".to_string());
                return ToolOutput::err(
                    &call.id,
                    format!(
                        "missing required parameter 'content'. Received: {}",
                        args_preview
                    ),
                );
            }
        };
        let should_append = call
            .args
            .get("append")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        debug!(path = %path, append = should_append, "write_file tool");

        if let Some(parent) = std::path::Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
        }

        if should_append {
            use tokio::io::AsyncWriteExt;
            match tokio::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(&path)
                .await
            {
                Ok(mut f) => {
                    let result = f.write_all(content.as_bytes()).await;
                    // Explicit flush + shutdown — the tokio::fs::File close on
                    // drop is fire-and-forget, not guaranteed before return.
                    let _ = f.flush().await;
                    let _ = f.shutdown().await;
                    match result {
                        Ok(_) => ToolOutput::ok(
                            &call.id,
                            format!("appended {} bytes to {path}", content.len()),
                        ),
                        Err(e) => ToolOutput::err(&call.id, format!("write error: {e}")),
                    }
                }
                Err(e) => ToolOutput::err(&call.id, format!("open error: {e}")),
            }
        } else {
            match tokio::fs::write(&path, &content).await {
                Ok(_) => {
                    ToolOutput::ok(&call.id, format!("wrote {} bytes to {path}", content.len()))
                }
                Err(e) => ToolOutput::err(&call.id, format!("write error: {e}")),
            }
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
            id: "w1".into(),
            name: "write_file".into(),
            args,
        }
    }

    fn tmp_path() -> String {
        use std::sync::atomic::{AtomicU32, Ordering};
        static CTR: AtomicU32 = AtomicU32::new(0);
        let n = CTR.fetch_add(1, Ordering::Relaxed);
        format!("/tmp/codeloop_write_test_{}_{n}.txt", std::process::id())
    }

    #[tokio::test]
    async fn write_creates_file() {
        let path = tmp_path();
        let out = WriteFileTool
            .execute(&call(json!({"file_path": path, "content": "hello write"})))
            .await;
        assert!(out.success, "{:?}", out.error);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap().trim(),
            "hello write"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn append_adds_to_file() {
        let path = tmp_path();
        let w1 = WriteFileTool
            .execute(&call(json!({"file_path": path, "content": "first\n"})))
            .await;
        assert!(w1.success, "write failed: {:?}", w1.error);
        let w2 = WriteFileTool
            .execute(&call(
                json!({"file_path": path, "content": "second\n", "append": true}),
            ))
            .await;
        assert!(w2.success, "append failed: {:?}", w2.error);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("first"));
        assert!(contents.contains("second"));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn write_creates_parent_dirs() {
        use std::sync::atomic::{AtomicU32, Ordering};
        static CTR: AtomicU32 = AtomicU32::new(0);
        let n = CTR.fetch_add(1, Ordering::Relaxed);
        let dir = format!("/tmp/codeloop_write_nested_{}_{n}", std::process::id());
        let path = format!("{dir}/sub/file.txt");
        let out = WriteFileTool
            .execute(&call(json!({"file_path": path, "content": "nested"})))
            .await;
        assert!(out.success, "{:?}", out.error);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn missing_file_path_is_error() {
        let out = WriteFileTool.execute(&call(json!({"content": "x"}))).await;
        assert!(!out.success);
        assert!(out.error.unwrap().contains("missing required parameter 'file_path'"));
    }

    #[tokio::test]
    async fn missing_content_is_error() {
        let out = WriteFileTool
            .execute(&call(json!({"file_path": "/tmp/x.txt"})))
            .await;
        assert!(!out.success);
        assert!(out.error.unwrap().contains("missing required parameter 'content'"));
    }

    #[test]
    fn write_file_is_destructive() {
        assert!(WriteFileTool.is_destructive());
    }
}
