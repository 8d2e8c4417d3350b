// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Top-level construction: turns a loaded [`Config`] into a ready-to-use
//! [`Driver`], wiring together the Model Client, Tool Registry, Store, and
//! the Planner/Executor/ContextBuilder that sit in between.
use std::sync::Arc;

use anyhow::Result;
use codeloop_core::{ContextBuilder, Driver, Executor, Planner, StdinPrompt};
use codeloop_config::Config;
use codeloop_store::Store;

use crate::registry::build_tool_registry;

/// Builds a [`Driver`] from configuration. Opens (or creates) the session
/// database at `config.database.db_path` as a side effect.
pub fn build_driver(config: &Config) -> Result<Driver> {
    let model: Arc<dyn codeloop_model::ModelClient> = Arc::from(codeloop_model::from_config(&config.model));
    let store = Store::open(&config.database)?;
    let cache = Arc::new(store.cache);
    let sessions = Arc::new(store.sessions);
    let tools = Arc::new(build_tool_registry(model.clone(), cache));

    let context_builder = ContextBuilder::new(sessions.clone(), config.database.max_summaries as usize);
    let planner = Planner::new(model.clone(), tools.clone());
    let executor = Executor::new(tools, config.execution.auto_continue, Arc::new(StdinPrompt));

    Ok(Driver::new(
        context_builder,
        planner,
        executor,
        sessions,
        model,
        config.database.max_summaries as usize,
    ))
}
