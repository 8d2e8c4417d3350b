// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! `read_file`, routed through the Cache Service.
//!
//! Lives here rather than in `codeloop-tools` so that the tool can depend on
//! `codeloop-store`'s `CacheService` without `codeloop-tools` depending on
//! `codeloop-store` (the same circular-dependency avoidance `summarize`/
//! `analyze` use for `codeloop-model`). Pagination, byte capping, and binary
//! detection are ported from `codeloop_tools::ReadFileTool`; only the source
//! of the file content changes.
use std::sync::Arc;

use async_trait::async_trait;
use codeloop_store::CacheService;
use codeloop_tools::{Tool, ToolCall, ToolOutput};
use serde_json::{json, Value};
use tracing::debug;

const DEFAULT_LINE_LIMIT: usize = 200;
const MAX_BYTES: usize = 20_000;

/// Reads a text file with 1-indexed line numbers, paginated by offset/limit,
/// serving commit-scoped cached content when available.
pub struct CachedReadFileTool {
    cache: Arc<CacheService>,
}

impl CachedReadFileTool {
    pub fn new(cache: Arc<CacheService>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Tool for CachedReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads a file. Default: 200 lines / 20 KB, whichever comes first. \
         Lines are formatted as L{n}:content (1-indexed). When more lines exist, \
         a pagination notice shows the next offset. Binary files are rejected."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Absolute or relative path to the file"
                },
                "offset": {
                    "type": "integer",
                    "description": "1-indexed line number to start reading from (default 1)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of lines to return (default 200)"
                }
            },
            "required": ["file_path"],
            "additionalProperties": false
        })
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
        let offset = call.args.get("offset").and_then(|v| v.as_u64()).unwrap_or(1) as usize;
        let limit = call
            .args
            .get("limit")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_LINE_LIMIT as u64) as usize;

        debug!(path = %path, offset, limit, "cached read_file tool");

        let cached = match self.cache.read_file_cached(&path).await {
            Ok(c) => c,
            Err(e) => return ToolOutput::err(&call.id, format!("read error: {e}")),
        };

        if has_binary_content(&cached.content) {
            return ToolOutput::err(
                &call.id,
                format!("{path} appears to be a binary file; read_file only handles text"),
            );
        }

        let start = offset.saturating_sub(1);
        let all_lines: Vec<&str> = cached.content.lines().collect();
        let total = all_lines.len();

        let mut selected: Vec<String> = Vec::new();
        let mut byte_count: usize = 0;
        let mut truncated_by_bytes = false;
        for (i, line) in all_lines.iter().enumerate().skip(start).take(limit) {
            let line_bytes = line.len() + 1;
            if byte_count + line_bytes > MAX_BYTES {
                truncated_by_bytes = true;
                break;
            }
            selected.push(format!("L{}:{}", i + 1, line));
            byte_count += line_bytes;
        }

        let last_shown = start + selected.len();
        let mut content = selected.join("\n");

        if last_shown < total {
            let reason = if truncated_by_bytes {
                format!("byte limit ({} B) reached", MAX_BYTES)
            } else {
                format!("{} more lines", total - last_shown)
            };
            content.push_str(&format!(
                "\n...[{} — showing L{}-L{} of {}; use offset={} to continue]",
                reason,
                offset,
                offset + selected.len().saturating_sub(1),
                total,
                last_shown + 1
            ));
        }

        ToolOutput::ok(&call.id, content)
    }
}

/// Samples up to 4096 bytes of `content` to decide if it's binary. A file
/// that failed UTF-8 decoding never reaches here (the cache read itself
/// errors); this catches valid-UTF-8 content that is still effectively
/// binary, e.g. a NUL-padded or control-character-heavy file.
fn has_binary_content(content: &str) -> bool {
    let bytes = content.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let sample = &bytes[..bytes.len().min(4096)];
    if sample.contains(&0u8) {
        return true;
    }
    let non_printable = sample
        .iter()
        .filter(|&&b| b < 9 || (b > 13 && b < 32))
        .count();
    non_printable * 100 / sample.len() > 30
}
