// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod context_builder;
mod driver;
mod executor;
mod json_extract;
mod planner;
mod types;

pub use context_builder::ContextBuilder;
pub use driver::Driver;
pub use executor::{ConfirmationPrompt, Executor, ScriptedPrompt, StdinPrompt};
pub use json_extract::extract_largest_json_object;
pub use planner::Planner;
pub use types::{Action, Context, ExecutionLogEntry, Plan, PlanMetadata, ToolResult};
