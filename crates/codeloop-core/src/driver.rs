// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use codeloop_model::ModelClient;
use codeloop_store::SessionStore;
use tracing::{error, info};

use crate::context_builder::ContextBuilder;
use crate::executor::Executor;
use crate::planner::Planner;
use crate::types::{ExecutionLogEntry, ToolResult};

const MIN_STEPS: u32 = 3;
const MAX_STEPS: u32 = 10;
const BASE_STEPS: u32 = 5;
const HEAVY_KEYWORDS: &[&str] = &[
    "refactor", "implement", "create", "build", "design", "test", "debug",
];
const LIGHT_KEYWORDS: &[&str] = &["read", "show", "display", "list", "status"];

/// Converts one user prompt into one final response string, running the
/// bounded plan/execute loop described in the design (§4.1).
pub struct Driver {
    context_builder: ContextBuilder,
    planner: Planner,
    executor: Executor,
    sessions: Arc<SessionStore>,
    model: Arc<dyn ModelClient>,
    max_summaries: usize,
}

impl Driver {
    pub fn new(
        context_builder: ContextBuilder,
        planner: Planner,
        executor: Executor,
        sessions: Arc<SessionStore>,
        model: Arc<dyn ModelClient>,
        max_summaries: usize,
    ) -> Self {
        Self {
            context_builder,
            planner,
            executor,
            sessions,
            model,
            max_summaries,
        }
    }

    pub async fn process_request(&self, user_prompt: &str) -> String {
        let user_prompt = user_prompt.to_string();
        let context = self.context_builder.build(&user_prompt).await;
        let max_steps = adaptive_max_steps(&context.user_prompt, context.modified_files.len());

        let mut history: Vec<ToolResult> = Vec::new();
        let mut execution_log: Vec<ExecutionLogEntry> = Vec::new();
        let mut step = 1u32;
        let mut outcome = LoopOutcome::MaxStepsReached;

        while step <= max_steps {
            let visible_history = filter_history(&history, step);

            let plan = self
                .planner
                .plan(
                    &context.user_prompt,
                    &context.current_commit,
                    &context.modified_files,
                    &context.recent_summaries,
                    self.max_summaries,
                    &visible_history,
                    step,
                )
                .await;

            if plan.is_empty() {
                if step == 1 {
                    let message = if self.model.is_available().await {
                        "Could not make sense of the model's reply. Please rephrase your request."
                    } else {
                        "Model is currently unavailable. Please try again shortly."
                    };
                    return self
                        .finish(&context, &[], message.to_string())
                        .await;
                }
                outcome = LoopOutcome::Complete;
                break;
            }

            let is_final_declared = plan.metadata_or_default().is_final;
            let expected_follow_up = plan.metadata_or_default().expected_follow_up;
            let had_tool_actions = plan.has_tool_actions();

            let mut entries = self.executor.execute_plan(&plan.actions).await;
            let last_failed = entries.last().map(|e| !e.result.success).unwrap_or(false);
            let last_error = entries.last().and_then(|e| e.result.error.clone());

            history.extend(entries.iter().map(|e| e.result.clone()));
            execution_log.append(&mut entries);

            if last_failed {
                let cancelled = last_error
                    .as_deref()
                    .map(|e| e.to_lowercase().contains("cancelled"))
                    .unwrap_or(false);
                outcome = if cancelled {
                    LoopOutcome::UserCancelled
                } else {
                    LoopOutcome::Failed
                };
                break;
            }

            if is_final_declared {
                outcome = LoopOutcome::Complete;
                break;
            }
            if !had_tool_actions {
                outcome = LoopOutcome::Complete;
                break;
            }
            if step > 2 && !expected_follow_up {
                outcome = LoopOutcome::Complete;
                break;
            }

            step += 1;
        }

        let summary = compose_summary(&history, &context.user_prompt, outcome);
        self.finish(&context, &execution_log, summary).await
    }

    async fn finish(
        &self,
        context: &crate::types::Context,
        execution_log: &[ExecutionLogEntry],
        summary: String,
    ) -> String {
        let log_json = if execution_log.is_empty() {
            None
        } else {
            serde_json::to_value(execution_log).ok()
        };
        if let Err(e) = self.sessions.store_session(
            &context.user_prompt,
            &context.current_commit,
            &context.modified_files,
            &summary,
            log_json.as_ref(),
        ) {
            error!(error = %e, "failed to persist session record");
        } else {
            info!(commit = %context.current_commit, "session recorded");
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopOutcome {
    Complete,
    Failed,
    UserCancelled,
    MaxStepsReached,
}

fn adaptive_max_steps(prompt: &str, modified_file_count: usize) -> u32 {
    let lower = prompt.to_lowercase();
    let mut steps = BASE_STEPS as i32;
    if HEAVY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        steps += 2;
    }
    if modified_file_count > 5 {
        steps += 1;
    }
    if LIGHT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        steps -= 2;
    }
    steps.clamp(MIN_STEPS as i32, MAX_STEPS as i32) as u32
}

/// All prior results for the first three steps; afterwards the last six
/// results plus any earlier failures, oldest first.
fn filter_history(history: &[ToolResult], step: u32) -> Vec<ToolResult> {
    if step <= 3 || history.len() <= 6 {
        return history.to_vec();
    }
    let tail_start = history.len() - 6;
    let earlier_failures = history[..tail_start].iter().filter(|r| !r.success).cloned();
    earlier_failures.chain(history[tail_start..].iter().cloned()).collect()
}

fn compose_summary(history: &[ToolResult], user_prompt: &str, outcome: LoopOutcome) -> String {
    let total = history.len();
    let succeeded = history.iter().filter(|r| r.success).count();

    let banner = match outcome {
        LoopOutcome::UserCancelled => "Cancelled by user.".to_string(),
        _ if total == 0 => "No actions were taken.".to_string(),
        _ if succeeded == total => "All actions completed successfully.".to_string(),
        _ if succeeded == 0 => "No actions completed successfully.".to_string(),
        _ => format!("{succeeded}/{total} actions completed successfully."),
    };

    let mut out = banner;
    if matches!(outcome, LoopOutcome::MaxStepsReached) {
        out.push_str(" (max steps reached)");
    }
    out.push('\n');

    let excerpts = history
        .iter()
        .filter(|r| r.success && !r.is_confirmation())
        .take(3);
    for r in excerpts {
        let text = r.output.as_deref().unwrap_or("");
        let truncated: String = text.chars().take(600).collect();
        out.push_str(&format!("\n[{}]\n{}\n", r.action_description, truncated));
    }

    out.push_str("\nRequest: ");
    out.push_str(user_prompt);
    out
}
