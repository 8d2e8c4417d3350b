// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool::{Tool, ToolCall, ToolOutput};

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

fn synonyms(word: &str) -> &'static [&'static str] {
    match word {
        "function" => &["func", "method", "def"],
        "class" => &["struct", "type", "interface"],
        "variable" => &["var", "let", "const"],
        "error" => &["exception", "fail", "bug"],
        "test" => &["spec", "unittest", "pytest"],
        "config" => &["configuration", "settings", "options"],
        "file" => &["document", "script", "module"],
        _ => &[],
    }
}

/// Expands a natural-language query into candidate code-search terms:
/// stop words are dropped and a small programming-synonym table widens the
/// set. Non-critical — the Executor does not abort a plan if this fails.
pub struct BrainstormSearchTermsTool;

#[async_trait]
impl Tool for BrainstormSearchTermsTool {
    fn name(&self) -> &str {
        "brainstorm_search_terms"
    }

    fn description(&self) -> &str {
        "Generates relevant search terms for a query, ahead of a grep/code-search step."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The original query to brainstorm terms for"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let query = match call.args.get("query").and_then(|v| v.as_str()) {
            Some(q) => q,
            None => return ToolOutput::err(&call.id, "missing required parameter 'query'"),
        };

        let lowered = query.to_lowercase();
        let keywords: Vec<String> = lowered
            .split_whitespace()
            .filter(|w| !STOP_WORDS.contains(w))
            .map(str::to_string)
            .collect();

        let mut terms: BTreeSet<String> = keywords.iter().cloned().collect();
        for kw in &keywords {
            for syn in synonyms(kw) {
                terms.insert(syn.to_string());
            }
        }

        ToolOutput::ok(
            &call.id,
            format!(
                "Search terms: {}",
                terms.into_iter().collect::<Vec<_>>().join(", ")
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tool::{Tool, ToolCall};

    fn call(args: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "b1".into(),
            name: "brainstorm_search_terms".into(),
            args,
        }
    }

    #[tokio::test]
    async fn drops_stop_words_and_expands_synonyms() {
        let out = BrainstormSearchTermsTool
            .execute(&call(json!({"query": "find the error in this function"})))
            .await;
        assert!(out.success, "{:?}", out.error);
        let text = out.output.unwrap();
        assert!(text.contains("error"));
        assert!(text.contains("exception"));
        assert!(text.contains("func"));
        assert!(!text.contains(" the "));
    }

    #[tokio::test]
    async fn missing_query_is_error() {
        let out = BrainstormSearchTermsTool.execute(&call(json!({}))).await;
        assert!(!out.success);
        assert!(out.error.unwrap().contains("missing required parameter 'query'"));
    }

    #[test]
    fn brainstorm_is_not_destructive() {
        assert!(!BrainstormSearchTermsTool.is_destructive());
    }
}
