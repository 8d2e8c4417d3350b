// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use codeloop_model::ModelClient;
use codeloop_tools::{ToolRegistry, ToolSchema};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::json_extract::extract_largest_json_object;
use crate::types::{Action, Plan, PlanMetadata, ToolResult};

const FIND_KEYWORDS: &[&str] = &["find", "search", "look for", "locate"];

/// Renders a prompt from context + tool schemas, asks the Model Client for
/// a reply, and turns it into a Plan. Never throws: any failure (transport,
/// parse, unknown tool) degrades to an empty Plan, which the Driver
/// interprets per its own rules.
pub struct Planner {
    model: Arc<dyn ModelClient>,
    tools: Arc<ToolRegistry>,
}

impl Planner {
    pub fn new(model: Arc<dyn ModelClient>, tools: Arc<ToolRegistry>) -> Self {
        Self { model, tools }
    }

    pub async fn plan(
        &self,
        user_prompt: &str,
        current_commit: &str,
        modified_files: &[String],
        recent_summaries: &[String],
        max_summaries: usize,
        visible_history: &[ToolResult],
        step: u32,
    ) -> Plan {
        let prompt = render_prompt(
            &self.tools.schemas(),
            user_prompt,
            current_commit,
            modified_files,
            recent_summaries,
            max_summaries,
            visible_history,
            step,
        );

        let response = self.model.generate(&prompt, None).await;
        if response.is_error() {
            debug!(error = ?response.metadata.error, "model generate failed, returning empty plan");
            return Plan::empty();
        }

        let mut plan = match extract_largest_json_object(&response.content) {
            Some(value) => parse_plan(&value),
            None => {
                warn!("no JSON object found in model response");
                Plan::empty()
            }
        };

        let mut pre_actions = pre_actions(user_prompt, modified_files);
        pre_actions.append(&mut plan.actions);
        plan.actions = pre_actions;
        plan
    }
}

/// Hardcoded heuristics prepended ahead of whatever the model proposed.
fn pre_actions(user_prompt: &str, modified_files: &[String]) -> Vec<Action> {
    let mut actions = Vec::new();
    let lower = user_prompt.to_lowercase();

    if FIND_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        actions.push(Action::tool_use(
            "brainstorm_search_terms",
            serde_json::json!({ "query": user_prompt }),
        ));
    }

    let filename_re = Regex::new(r"[A-Za-z0-9_./]+\.[A-Za-z]+").unwrap();
    for candidate in filename_re.find_iter(user_prompt) {
        let path = candidate.as_str();
        if !modified_files.iter().any(|m| m == path) {
            actions.push(Action::tool_use(
                "read_file",
                serde_json::json!({ "file_path": path }),
            ));
        }
    }

    actions
}

fn parse_plan(value: &Value) -> Plan {
    let actions = value
        .get("actions")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(parse_action).collect())
        .unwrap_or_default();

    let metadata = value.get("metadata").map(parse_metadata);

    Plan { actions, metadata }
}

fn parse_action(value: &Value) -> Option<Action> {
    match value.get("type").and_then(Value::as_str) {
        Some("tool_use") => {
            let tool_name = value
                .get("tool_name")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let parameters = value
                .get("parameters")
                .cloned()
                .unwrap_or_else(|| serde_json::json!({}));
            Some(Action::ToolAction {
                tool_name,
                parameters,
            })
        }
        Some("confirmation") => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let destructive = value
                .get("destructive")
                .and_then(Value::as_bool)
                .unwrap_or(true);
            Some(Action::ConfirmationAction {
                message,
                destructive,
            })
        }
        _ => None,
    }
}

fn parse_metadata(value: &Value) -> PlanMetadata {
    let default = PlanMetadata::default();
    PlanMetadata {
        confidence: value
            .get("confidence")
            .and_then(Value::as_f64)
            .map(|f| f as f32)
            .unwrap_or(default.confidence),
        is_final: value
            .get("is_final")
            .and_then(Value::as_bool)
            .unwrap_or(default.is_final),
        expected_follow_up: value
            .get("expected_follow_up")
            .and_then(Value::as_bool)
            .unwrap_or(default.expected_follow_up),
        reasoning: value
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    }
}

/// Renders the single template prompt sent to the Model Client.
fn render_prompt(
    tool_schemas: &[ToolSchema],
    user_prompt: &str,
    current_commit: &str,
    modified_files: &[String],
    recent_summaries: &[String],
    max_summaries: usize,
    visible_history: &[ToolResult],
    step: u32,
) -> String {
    let mut out = String::new();
    out.push_str("You are a local coding agent. Respond with a single JSON object: \
        {\"actions\":[...], \"metadata\":{...}}.\n\n");

    out.push_str("# Available tools\n");
    for schema in tool_schemas {
        out.push_str(&format!("- {}: {}\n", schema.name, schema.description));
    }

    out.push_str("\n# Recent sessions\n");
    for summary in recent_summaries.iter().rev().take(max_summaries) {
        out.push_str("- ");
        out.push_str(summary);
        out.push('\n');
    }

    out.push_str("\n# Current state\n");
    out.push_str(&format!("commit: {current_commit}\n"));
    out.push_str("modified files:\n");
    for f in modified_files {
        out.push_str(&format!("- {f}\n"));
    }

    out.push_str("\n# Prior results this request\n");
    out.push_str(&condense_history(visible_history));

    out.push_str("\n# Request\n");
    out.push_str(user_prompt);
    out.push('\n');

    out.push_str(&format!(
        "\nstep {step}: decide whether this plan can be the final step.\n"
    ));

    out
}

/// Shows the last 4 results verbatim; older ones are folded into a
/// "x/y succeeded" summary line.
fn condense_history(history: &[ToolResult]) -> String {
    if history.is_empty() {
        return "(none yet)\n".to_string();
    }
    let verbatim_from = history.len().saturating_sub(4);
    let mut out = String::new();
    if verbatim_from > 0 {
        let succeeded = history[..verbatim_from].iter().filter(|r| r.success).count();
        out.push_str(&format!("{succeeded}/{verbatim_from} succeeded\n"));
    }
    for r in &history[verbatim_from..] {
        out.push_str(&format!(
            "- {} [{}]: {}\n",
            r.action_description,
            if r.success { "ok" } else { "failed" },
            r.output.as_deref().or(r.error.as_deref()).unwrap_or("")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeloop_model::{ModelResponse, ScriptedMockClient};

    fn planner_with_response(content: &str) -> Planner {
        let client = ScriptedMockClient::new(vec![ModelResponse::ok(content)]);
        Planner::new(Arc::new(client), Arc::new(ToolRegistry::new()))
    }

    #[tokio::test]
    async fn parses_tool_use_and_confirmation_actions() {
        let planner = planner_with_response(
            r#"{"actions":[
                {"type":"tool_use","tool_name":"write_file","parameters":{"file_path":"a.txt"}},
                {"type":"confirmation","message":"proceed?","destructive":true}
            ],"metadata":{"is_final":true}}"#,
        );
        let plan = planner
            .plan("write a file", "abc123", &[], &[], 5, &[], 1)
            .await;
        assert_eq!(plan.actions.len(), 2);
        assert!(plan.metadata_or_default().is_final);
    }

    #[tokio::test]
    async fn unknown_action_type_is_dropped() {
        let planner = planner_with_response(
            r#"{"actions":[{"type":"mystery"},{"type":"tool_use","tool_name":"t","parameters":{}}]}"#,
        );
        let plan = planner.plan("do it", "c", &[], &[], 5, &[], 1).await;
        assert_eq!(plan.actions.len(), 1);
    }

    #[tokio::test]
    async fn unparseable_response_yields_empty_plan() {
        let planner = planner_with_response("no json at all here");
        let plan = planner.plan("do it", "c", &[], &[], 5, &[], 1).await;
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn model_failure_yields_empty_plan() {
        let client = ScriptedMockClient::new(vec![]).unavailable();
        let planner = Planner::new(Arc::new(client), Arc::new(ToolRegistry::new()));
        let plan = planner.plan("do it", "c", &[], &[], 5, &[], 1).await;
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn find_prompt_prepends_brainstorm_action() {
        let planner = planner_with_response(r#"{"actions":[]}"#);
        let plan = planner
            .plan("find the login handler", "c", &[], &[], 5, &[], 1)
            .await;
        match &plan.actions[0] {
            Action::ToolAction { tool_name, .. } => assert_eq!(tool_name, "brainstorm_search_terms"),
            _ => panic!("expected brainstorm action first"),
        }
    }

    #[tokio::test]
    async fn filename_like_substrings_prepend_read_actions() {
        let planner = planner_with_response(r#"{"actions":[]}"#);
        let plan = planner
            .plan("please look at main.rs closely", "c", &[], &[], 5, &[], 1)
            .await;
        assert!(plan.actions.iter().any(|a| matches!(
            a,
            Action::ToolAction { tool_name, parameters }
                if tool_name == "read_file" && parameters["file_path"] == "main.rs"
        )));
    }

    #[tokio::test]
    async fn already_modified_file_is_not_re_read() {
        let planner = planner_with_response(r#"{"actions":[]}"#);
        let plan = planner
            .plan(
                "check main.rs",
                "c",
                &["main.rs".to_string()],
                &[],
                5,
                &[],
                1,
            )
            .await;
        assert!(plan.actions.is_empty());
    }
}
