// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use codeloop_tools::{ToolCall, ToolRegistry};
use tracing::warn;
use uuid::Uuid;

use crate::types::{Action, ExecutionLogEntry, ToolResult};

/// Tools whose failure does not invalidate the rest of a Plan — purely
/// informational lookups the Executor can shrug off and keep going.
const NON_CRITICAL_TOOLS: &[&str] = &["grep", "brainstorm_search_terms"];

/// Solicits a yes/no answer to a confirmation message. The production
/// implementation reads a line from stdin; tests inject a scripted answer.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn ask(&self, message: &str) -> String;
}

/// Reads the confirmation answer from stdin.
pub struct StdinPrompt;

#[async_trait]
impl ConfirmationPrompt for StdinPrompt {
    async fn ask(&self, message: &str) -> String {
        println!("{message} [y/N] ");
        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).ok();
            line
        })
        .await
        .unwrap_or_default()
    }
}

/// Always answers with a fixed string — for tests and `auto_continue`-style
/// non-interactive runs.
pub struct ScriptedPrompt(pub Vec<String>);

#[async_trait]
impl ConfirmationPrompt for ScriptedPrompt {
    async fn ask(&self, _message: &str) -> String {
        // Tests construct one `ScriptedPrompt` per confirmation expected;
        // a single fixed answer covers the common case of one gated action.
        self.0.first().cloned().unwrap_or_default()
    }
}

fn is_accepted(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Runs a Plan's actions in declared order against the Tool Registry,
/// gating destructive tool actions on user confirmation.
pub struct Executor {
    tools: Arc<ToolRegistry>,
    auto_continue: bool,
    confirmer: Arc<dyn ConfirmationPrompt>,
}

impl Executor {
    pub fn new(tools: Arc<ToolRegistry>, auto_continue: bool, confirmer: Arc<dyn ConfirmationPrompt>) -> Self {
        Self {
            tools,
            auto_continue,
            confirmer,
        }
    }

    /// Executes `actions` in order, synthesizing a confirmation ahead of any
    /// destructive ToolAction that the Plan didn't already gate (I2).
    pub async fn execute_plan(&self, actions: &[Action]) -> Vec<ExecutionLogEntry> {
        let mut log = Vec::new();
        let mut i = 0;

        while i < actions.len() {
            let action = &actions[i];
            match action {
                Action::ConfirmationAction { message, .. } => {
                    let result = self.run_confirmation(message).await;
                    let stop = !result.success;
                    log.push(ExecutionLogEntry {
                        action: action.clone(),
                        result,
                    });
                    if stop {
                        return log;
                    }
                }
                Action::ToolAction { tool_name, parameters } => {
                    let gated_next = matches!(
                        actions.get(i + 1),
                        Some(Action::ConfirmationAction { .. })
                    );
                    let is_destructive = self.tools.is_destructive(tool_name);

                    if is_destructive {
                        // The confirmation must be answered, and must be
                        // accepted, before the tool ever runs — whether it
                        // was declared by the Plan (gated_next) or is
                        // synthesized here.
                        let message = if gated_next {
                            match &actions[i + 1] {
                                Action::ConfirmationAction { message, .. } => message.clone(),
                                _ => unreachable!(),
                            }
                        } else {
                            format!("Execute {tool_name}?")
                        };
                        let confirmation = self.run_confirmation(&message).await;
                        let declined = !confirmation.success;
                        log.push(ExecutionLogEntry {
                            action: Action::confirmation(message, true),
                            result: confirmation,
                        });
                        if gated_next {
                            // Consume the declared ConfirmationAction too —
                            // we already evaluated it above.
                            i += 1;
                        }
                        if declined {
                            return log;
                        }
                    }

                    let result = self.run_tool(tool_name, parameters).await;
                    let critical_failure = !result.success && !NON_CRITICAL_TOOLS.contains(&tool_name.as_str());
                    log.push(ExecutionLogEntry {
                        action: action.clone(),
                        result,
                    });
                    if critical_failure {
                        return log;
                    }
                }
            }
            i += 1;
        }

        log
    }

    async fn run_confirmation(&self, message: &str) -> ToolResult {
        let accepted = if self.auto_continue {
            true
        } else {
            is_accepted(&self.confirmer.ask(message).await)
        };
        let description = format!("Confirmation: {message}");
        if accepted {
            ToolResult::ok(description, "accepted")
        } else {
            ToolResult::err(description, "User cancelled action")
        }
    }

    async fn run_tool(&self, tool_name: &str, parameters: &serde_json::Value) -> ToolResult {
        let description = format!("{tool_name}({parameters})");
        let Some(tool) = self.tools.get(tool_name) else {
            warn!(tool_name, "tool not found in registry");
            return ToolResult::err(description, format!("Tool execution failed: unknown tool {tool_name}"));
        };
        let call = ToolCall {
            id: Uuid::new_v4().to_string(),
            name: tool_name.to_string(),
            args: parameters.clone(),
        };
        let output = tool.execute(&call).await;
        if output.success {
            ToolResult::ok(description, output.output.unwrap_or_default())
        } else {
            ToolResult::err(description, output.error.unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use codeloop_tools::{Tool, ToolOutput};
    use serde_json::json;

    struct AlwaysOkTool;

    #[async_trait]
    impl Tool for AlwaysOkTool {
        fn name(&self) -> &str {
            "noop"
        }
        fn description(&self) -> &str {
            "does nothing"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({})
        }
        async fn execute(&self, call: &ToolCall) -> ToolOutput {
            ToolOutput::ok(&call.id, "done")
        }
    }

    struct AlwaysFailsTool;

    #[async_trait]
    impl Tool for AlwaysFailsTool {
        fn name(&self) -> &str {
            "grep"
        }
        fn description(&self) -> &str {
            "fails"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({})
        }
        async fn execute(&self, call: &ToolCall) -> ToolOutput {
            ToolOutput::err(&call.id, "boom")
        }
    }

    struct DestructiveTool;

    #[async_trait]
    impl Tool for DestructiveTool {
        fn name(&self) -> &str {
            "write_file"
        }
        fn description(&self) -> &str {
            "writes"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({})
        }
        fn is_destructive(&self) -> bool {
            true
        }
        async fn execute(&self, call: &ToolCall) -> ToolOutput {
            ToolOutput::ok(&call.id, "wrote")
        }
    }

    fn registry_with(tools: Vec<Box<dyn FnOnce(&mut ToolRegistry)>>) -> Arc<ToolRegistry> {
        let mut reg = ToolRegistry::new();
        for install in tools {
            install(&mut reg);
        }
        Arc::new(reg)
    }

    #[tokio::test]
    async fn successful_tool_action_produces_ok_result() {
        let tools = registry_with(vec![Box::new(|r: &mut ToolRegistry| r.register(AlwaysOkTool))]);
        let executor = Executor::new(tools, false, Arc::new(ScriptedPrompt(vec!["y".into()])));
        let log = executor
            .execute_plan(&[Action::tool_use("noop", json!({}))])
            .await;
        assert_eq!(log.len(), 1);
        assert!(log[0].result.success);
    }

    #[tokio::test]
    async fn unknown_tool_stops_iteration_when_critical() {
        let tools = registry_with(vec![]);
        let executor = Executor::new(tools, false, Arc::new(ScriptedPrompt(vec!["y".into()])));
        let log = executor
            .execute_plan(&[
                Action::tool_use("missing", json!({})),
                Action::tool_use("missing2", json!({})),
            ])
            .await;
        assert_eq!(log.len(), 1, "should stop after the first critical failure");
    }

    #[tokio::test]
    async fn non_critical_tool_failure_does_not_stop_iteration() {
        let tools = registry_with(vec![
            Box::new(|r: &mut ToolRegistry| r.register(AlwaysFailsTool)),
            Box::new(|r: &mut ToolRegistry| r.register(AlwaysOkTool)),
        ]);
        let executor = Executor::new(tools, false, Arc::new(ScriptedPrompt(vec!["y".into()])));
        let log = executor
            .execute_plan(&[
                Action::tool_use("grep", json!({})),
                Action::tool_use("noop", json!({})),
            ])
            .await;
        assert_eq!(log.len(), 2);
        assert!(!log[0].result.success);
        assert!(log[1].result.success);
    }

    #[tokio::test]
    async fn destructive_action_gated_by_explicit_confirmation_accepted() {
        let tools = registry_with(vec![Box::new(|r: &mut ToolRegistry| r.register(DestructiveTool))]);
        let executor = Executor::new(tools, false, Arc::new(ScriptedPrompt(vec!["y".into()])));
        let log = executor
            .execute_plan(&[
                Action::tool_use("write_file", json!({"file_path":"a.txt"})),
                Action::confirmation("Execute write_file?", true),
            ])
            .await;
        assert_eq!(log.len(), 2);
        assert!(log[1].result.success);
    }

    #[tokio::test]
    async fn destructive_action_declined_stops_iteration() {
        let tools = registry_with(vec![Box::new(|r: &mut ToolRegistry| r.register(DestructiveTool))]);
        let executor = Executor::new(tools, false, Arc::new(ScriptedPrompt(vec!["n".into()])));
        let log = executor
            .execute_plan(&[
                Action::tool_use("write_file", json!({"file_path":"a.txt"})),
                Action::confirmation("Execute write_file?", true),
            ])
            .await;
        assert_eq!(log.len(), 1, "the tool itself must not run");
        assert!(log[0].result.error.as_deref().unwrap().contains("cancelled"));
    }

    #[tokio::test]
    async fn ungated_destructive_action_gets_synthesized_confirmation() {
        let tools = registry_with(vec![Box::new(|r: &mut ToolRegistry| r.register(DestructiveTool))]);
        let executor = Executor::new(tools, false, Arc::new(ScriptedPrompt(vec!["y".into()])));
        let log = executor
            .execute_plan(&[Action::tool_use("write_file", json!({"file_path":"a.txt"}))])
            .await;
        assert_eq!(log.len(), 2, "executor must synthesize the missing confirmation");
        assert!(log[1].result.success);
    }

    #[tokio::test]
    async fn auto_continue_skips_the_prompt() {
        let tools = registry_with(vec![Box::new(|r: &mut ToolRegistry| r.register(DestructiveTool))]);
        let executor = Executor::new(tools, true, Arc::new(ScriptedPrompt(vec!["n".into()])));
        let log = executor
            .execute_plan(&[Action::tool_use("write_file", json!({"file_path":"a.txt"}))])
            .await;
        assert!(log[1].result.success, "auto_continue must accept despite a 'n' answer");
    }
}
