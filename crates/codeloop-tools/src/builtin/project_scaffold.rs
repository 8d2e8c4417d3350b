// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::tool::{Tool, ToolCall, ToolOutput};

/// Creates a minimal project skeleton from a named template (rust-bin,
/// rust-lib, node, python). Destructive — writes a directory tree.
pub struct ProjectScaffoldTool;

#[async_trait]
impl Tool for ProjectScaffoldTool {
    fn name(&self) -> &str {
        "project_scaffold"
    }

    fn description(&self) -> &str {
        "Creates a minimal project skeleton under path/name from a template \
         (rust-bin, rust-lib, node, python)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "template": {
                    "type": "string",
                    "enum": ["rust-bin", "rust-lib", "node", "python"],
                    "description": "Project template to use"
                },
                "path": {
                    "type": "string",
                    "description": "Directory path where the project should be created"
                },
                "name": {
                    "type": "string",
                    "description": "Project name (defaults to the last path component)"
                }
            },
            "required": ["template", "path"]
        })
    }

    fn is_destructive(&self) -> bool {
        true
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let template = match call.args.get("template").and_then(|v| v.as_str()) {
            Some(t) => t.to_string(),
            None => return ToolOutput::err(&call.id, "missing required parameter 'template'"),
        };
        let path = match call.args.get("path").and_then(|v| v.as_str()) {
            Some(p) => p.to_string(),
            None => return ToolOutput::err(&call.id, "missing required parameter 'path'"),
        };
        let name = call
            .args
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                std::path::Path::new(&path)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("project")
                    .to_string()
            });

        debug!(template = %template, path = %path, name = %name, "project_scaffold tool");

        let files = match template.as_str() {
            "rust-bin" => rust_bin_files(&name),
            "rust-lib" => rust_lib_files(&name),
            "node" => node_files(&name),
            "python" => python_files(&name),
            other => {
                return ToolOutput::err(&call.id, format!("unknown template: {other}"));
            }
        };

        for (rel_path, content) in &files {
            let full = std::path::Path::new(&path).join(rel_path);
            if let Some(parent) = full.parent() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    return ToolOutput::err(&call.id, format!("mkdir failed for {parent:?}: {e}"));
                }
            }
            if let Err(e) = tokio::fs::write(&full, content).await {
                return ToolOutput::err(&call.id, format!("write failed for {full:?}: {e}"));
            }
        }

        ToolOutput::ok(
            &call.id,
            format!(
                "created {} template at {path} ({} files: {})",
                template,
                files.len(),
                files.iter().map(|(p, _)| p.as_str()).collect::<Vec<_>>().join(", ")
            ),
        )
    }
}

fn rust_bin_files(name: &str) -> Vec<(String, String)> {
    vec![
        (
            "Cargo.toml".into(),
            format!("[package]\nname = \"{name}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n[dependencies]\n"),
        ),
        (
            "src/main.rs".into(),
            "fn main() {\n    println!(\"Hello, world!\");\n}\n".into(),
        ),
    ]
}

fn rust_lib_files(name: &str) -> Vec<(String, String)> {
    vec![
        (
            "Cargo.toml".into(),
            format!("[package]\nname = \"{name}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n[dependencies]\n"),
        ),
        ("src/lib.rs".into(), "pub fn placeholder() {}\n".into()),
    ]
}

fn node_files(name: &str) -> Vec<(String, String)> {
    vec![
        (
            "package.json".into(),
            format!(
                "{{\n  \"name\": \"{name}\",\n  \"version\": \"0.1.0\",\n  \"main\": \"index.js\"\n}}\n"
            ),
        ),
        (
            "index.js".into(),
            "console.log('Hello, world!');\n".into(),
        ),
    ]
}

fn python_files(name: &str) -> Vec<(String, String)> {
    vec![
        (
            "pyproject.toml".into(),
            format!("[project]\nname = \"{name}\"\nversion = \"0.1.0\"\n"),
        ),
        (
            format!("{}/__init__.py", name.replace('-', "_")),
            "".into(),
        ),
    ]
}
