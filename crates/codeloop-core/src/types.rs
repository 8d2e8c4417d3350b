// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One unit of work in a Plan: either a tool invocation or a user
/// confirmation prompt. The Executor matches on this exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "tool_use")]
    ToolAction {
        tool_name: String,
        #[serde(default)]
        parameters: Value,
    },
    #[serde(rename = "confirmation")]
    ConfirmationAction {
        message: String,
        #[serde(default = "default_true")]
        destructive: bool,
    },
}

fn default_true() -> bool {
    true
}

impl Action {
    pub fn tool_use(tool_name: impl Into<String>, parameters: Value) -> Self {
        Action::ToolAction {
            tool_name: tool_name.into(),
            parameters,
        }
    }

    pub fn confirmation(message: impl Into<String>, destructive: bool) -> Self {
        Action::ConfirmationAction {
            message: message.into(),
            destructive,
        }
    }
}

/// Advisory metadata accompanying a Plan. Affects loop termination but never
/// overrides a declared empty plan or a critical failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default = "default_true")]
    pub expected_follow_up: bool,
    #[serde(default)]
    pub reasoning: String,
}

fn default_confidence() -> f32 {
    0.5
}

impl Default for PlanMetadata {
    fn default() -> Self {
        Self {
            confidence: default_confidence(),
            is_final: false,
            expected_follow_up: true,
            reasoning: String::new(),
        }
    }
}

/// An ordered sequence of Actions returned by the Planner for a single step.
/// `actions` is empty both as a parse failure and as a genuine "nothing left
/// to do" terminal signal — the Driver distinguishes the two by step number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub metadata: Option<PlanMetadata>,
}

impl Plan {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn metadata_or_default(&self) -> PlanMetadata {
        self.metadata.clone().unwrap_or_default()
    }

    pub fn has_tool_actions(&self) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(a, Action::ToolAction { .. }))
    }
}

/// The outcome of executing one Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub action_description: String,
}

impl ToolResult {
    pub fn ok(action_description: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
            action_description: action_description.into(),
        }
    }

    pub fn err(action_description: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            action_description: action_description.into(),
        }
    }

    /// A non-confirmation result whose output is worth excerpting in the
    /// final summary. Confirmation results carry no meaningful `output`.
    pub fn is_confirmation(&self) -> bool {
        self.action_description.starts_with("Confirmation: ")
    }
}

/// Per-request input to the Planner, built by the Context Builder from git
/// state and recent session summaries.
#[derive(Debug, Clone)]
pub struct Context {
    pub user_prompt: String,
    /// `"unknown"` when built outside a git repository.
    pub current_commit: String,
    pub modified_files: Vec<String>,
    /// Newest-last, per §3 of the data model.
    pub recent_summaries: Vec<String>,
    pub debug: bool,
}

/// One entry of the Executor's `execution_log`, handed to the Driver for
/// persistence alongside the SessionRecord.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    pub action: Action,
    pub result: ToolResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_with_no_actions_is_empty() {
        assert!(Plan::empty().is_empty());
    }

    #[test]
    fn metadata_defaults_match_spec() {
        let m = PlanMetadata::default();
        assert_eq!(m.confidence, 0.5);
        assert!(!m.is_final);
        assert!(m.expected_follow_up);
        assert_eq!(m.reasoning, "");
    }

    #[test]
    fn has_tool_actions_false_for_confirmation_only_plan() {
        let plan = Plan {
            actions: vec![Action::confirmation("ok?", true)],
            metadata: None,
        };
        assert!(!plan.has_tool_actions());
    }

    #[test]
    fn confirmation_result_is_recognized_by_action_description() {
        let r = ToolResult::err("Confirmation: write foo?", "User cancelled action");
        assert!(r.is_confirmation());
    }

    #[test]
    fn action_round_trips_through_json() {
        let action = Action::tool_use("read_file", serde_json::json!({"file_path": "a.rs"}));
        let s = serde_json::to_string(&action).unwrap();
        let back: Action = serde_json::from_str(&s).unwrap();
        match back {
            Action::ToolAction { tool_name, .. } => assert_eq!(tool_name, "read_file"),
            _ => panic!("expected ToolAction"),
        }
    }
}
