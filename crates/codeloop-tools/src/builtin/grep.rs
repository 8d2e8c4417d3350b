// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::tool::{Tool, ToolCall, ToolOutput};

/// Code search. Supports literal and regex modes. Degrades through three
/// tiers depending on what is installed on the host: `rg`, then `grep`,
/// then an in-process walk-and-match scan that needs no external binary.
pub struct GrepTool;

#[async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &str {
        "grep"
    }

    fn description(&self) -> &str {
        "Regex search over file contents. pattern: full regex (escape literal braces: \\{\\}).\n\
         path: file or directory to search (default: current directory).\n\
         include: glob filter applied to candidate files, e.g. '*.rs'.\n\
         case_sensitive: true by default. limit: 100 matches by default.\n\
         Falls back to an in-process scan when neither rg nor grep is installed."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Regular expression pattern to search for"
                },
                "path": {
                    "type": "string",
                    "description": "File or directory to search in (default: current directory)"
                },
                "include": {
                    "type": "string",
                    "description": "Glob pattern to filter files, e.g. '*.rs'"
                },
                "case_sensitive": {
                    "type": "boolean",
                    "description": "Case-sensitive search (default true)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of matches to return (default 100)"
                }
            },
            "required": ["pattern"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        // `pattern` is the canonical name; some models emit `query` instead —
        // alias it here rather than in the executor.
        let pattern = call
            .args
            .get("pattern")
            .or_else(|| call.args.get("query"))
            .and_then(|v| v.as_str());
        let pattern = match pattern {
            Some(p) => p.to_string(),
            None => {
                let args_preview =
                    serde_json::to_string(&call.args).unwrap_or_else(|_| "null".to_string());
                return ToolOutput::err(
                    &call.id,
                    format!(
                        "missing required parameter 'pattern'. Received: {}",
                        args_preview
                    ),
                );
            }
        };
        let path = call
            .args
            .get("path")
            .and_then(|v| v.as_str())
            .unwrap_or(".")
            .to_string();
        let include = call
            .args
            .get("include")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let case_sensitive = call
            .args
            .get("case_sensitive")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        let limit = call.args.get("limit").and_then(|v| v.as_u64()).unwrap_or(100) as usize;

        debug!(pattern = %pattern, path = %path, "grep tool");

        match run_search(&pattern, &path, include.as_deref(), case_sensitive, limit).await {
            Ok(output) if output.trim().is_empty() => ToolOutput::ok(&call.id, "(no matches)"),
            Ok(output) => ToolOutput::ok(&call.id, output),
            Err(e) => ToolOutput::err(&call.id, format!("grep error: {e}")),
        }
    }
}

async fn binary_exists(name: &str) -> bool {
    tokio::process::Command::new("which")
        .arg(name)
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

async fn run_search(
    pattern: &str,
    path: &str,
    include: Option<&str>,
    case_sensitive: bool,
    limit: usize,
) -> anyhow::Result<String> {
    let raw = if binary_exists("rg").await {
        run_rg(pattern, path, include, case_sensitive).await?
    } else if binary_exists("grep").await {
        run_grep(pattern, path, include, case_sensitive).await?
    } else {
        run_inprocess_scan(pattern, path, include, case_sensitive)?
    };

    let lines: Vec<&str> = raw.lines().take(limit).collect();
    let mut result = lines.join("\n");
    let total_lines = raw.lines().count();
    if total_lines > limit {
        result.push_str(&format!(
            "\n...[{} more matches not shown — narrow with path= or include= to see all results]",
            total_lines - limit
        ));
    }
    Ok(result)
}

async fn run_rg(
    pattern: &str,
    path: &str,
    include: Option<&str>,
    case_sensitive: bool,
) -> anyhow::Result<String> {
    let mut args = vec![
        "--color".to_string(),
        "never".to_string(),
        "--vimgrep".to_string(),
        "--no-heading".to_string(),
    ];
    if !case_sensitive {
        args.push("--ignore-case".to_string());
    }
    if let Some(glob) = include {
        args.push("-g".to_string());
        args.push(glob.to_string());
    }
    args.push(pattern.to_string());
    args.push(path.to_string());

    let output = tokio::process::Command::new("rg")
        .args(&args)
        .stdin(std::process::Stdio::null())
        .output()
        .await?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

async fn run_grep(
    pattern: &str,
    path: &str,
    include: Option<&str>,
    case_sensitive: bool,
) -> anyhow::Result<String> {
    let mut args = vec!["-rn".to_string()];
    if !case_sensitive {
        args.push("-i".to_string());
    }
    if let Some(glob) = include {
        args.push("--include".to_string());
        args.push(glob.to_string());
    }
    args.push(pattern.to_string());
    args.push(path.to_string());

    let output = tokio::process::Command::new("grep")
        .args(&args)
        .stdin(std::process::Stdio::null())
        .output()
        .await?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Last-resort fallback when neither `rg` nor `grep` is on `PATH`: walk the
/// tree ourselves and match each line with the `regex` crate.
fn run_inprocess_scan(
    pattern: &str,
    path: &str,
    include: Option<&str>,
    case_sensitive: bool,
) -> anyhow::Result<String> {
    let re = if case_sensitive {
        regex::Regex::new(pattern)?
    } else {
        regex::RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()?
    };
    let include_re = include.and_then(glob_to_regex);

    let root = std::path::Path::new(path);
    let mut out = String::new();
    let mut files: Vec<std::path::PathBuf> = Vec::new();
    if root.is_file() {
        files.push(root.to_path_buf());
    } else {
        for entry in walkdir::WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !is_excluded_dir(e))
            .filter_map(Result::ok)
        {
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();

    for file in files {
        if let Some(ref ire) = include_re {
            let name = file.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !ire.is_match(name) {
                continue;
            }
        }
        let Ok(text) = std::fs::read_to_string(&file) else {
            continue;
        };
        for (i, line) in text.lines().enumerate() {
            if re.is_match(line) {
                out.push_str(&format!("{}:{}:{}\n", file.display(), i + 1, line));
            }
        }
    }
    Ok(out)
}

fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && matches!(
            entry.file_name().to_str(),
            Some(".git") | Some("target") | Some("node_modules")
        )
}

fn glob_to_regex(pattern: &str) -> Option<regex::Regex> {
    let mut re = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    regex::Regex::new(&re).ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tool::{Tool, ToolCall};

    fn call(args: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "g1".into(),
            name: "grep".into(),
            args,
        }
    }

    #[tokio::test]
    async fn finds_pattern_in_file() {
        use std::sync::atomic::{AtomicU32, Ordering};
        static CTR: AtomicU32 = AtomicU32::new(0);
        let n = CTR.fetch_add(1, Ordering::Relaxed);
        let path = format!("/tmp/codeloop_grep_test_{}_{n}.txt", std::process::id());
        std::fs::write(&path, "pub struct Thing;\n").unwrap();

        let out = GrepTool
            .execute(&call(json!({"pattern": "pub struct", "path": path.clone()})))
            .await;
        assert!(out.success, "{:?}", out.error);
        assert!(out.output.unwrap().contains("Thing"));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn no_match_returns_no_matches() {
        let out = GrepTool
            .execute(&call(json!({
                "pattern": "xyzzy_nonexistent_pattern_12345",
                "path": "/tmp"
            })))
            .await;
        assert!(out.success);
        assert!(out.output.unwrap().contains("no matches"));
    }

    #[tokio::test]
    async fn missing_pattern_is_error() {
        let out = GrepTool.execute(&call(json!({}))).await;
        assert!(!out.success);
        assert!(out
            .error
            .unwrap()
            .contains("missing required parameter 'pattern'"));
    }

    #[tokio::test]
    async fn query_alias_is_accepted() {
        use std::sync::atomic::{AtomicU32, Ordering};
        static CTR: AtomicU32 = AtomicU32::new(0);
        let n = CTR.fetch_add(1, Ordering::Relaxed);
        let path = format!("/tmp/codeloop_grep_alias_{}_{n}.txt", std::process::id());
        std::fs::write(&path, "needle\n").unwrap();

        let out = GrepTool
            .execute(&call(json!({"query": "needle", "path": path.clone()})))
            .await;
        assert!(out.success, "{:?}", out.error);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn inprocess_scan_finds_match_without_external_binary() {
        use std::sync::atomic::{AtomicU32, Ordering};
        static CTR: AtomicU32 = AtomicU32::new(0);
        let n = CTR.fetch_add(1, Ordering::Relaxed);
        let path = format!("/tmp/codeloop_grep_scan_{}_{n}.txt", std::process::id());
        std::fs::write(&path, "hello scanner\n").unwrap();

        let result = run_inprocess_scan("scanner", &path, None, true).unwrap();
        assert!(result.contains("hello scanner"));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn limit_truncates_results() {
        use std::sync::atomic::{AtomicU32, Ordering};
        static CTR: AtomicU32 = AtomicU32::new(0);
        let n = CTR.fetch_add(1, Ordering::Relaxed);
        let dir = format!("/tmp/codeloop_grep_limit_{}_{n}", std::process::id());
        std::fs::create_dir_all(&dir).unwrap();
        for i in 0..5 {
            std::fs::write(format!("{dir}/f{i}.txt"), "needle\n").unwrap();
        }

        let out = GrepTool
            .execute(&call(json!({"pattern": "needle", "path": dir.clone(), "limit": 2})))
            .await;
        assert!(out.success, "{:?}", out.error);
        let text = out.output.unwrap();
        assert!(text.contains("more") || text.lines().count() <= 3);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
