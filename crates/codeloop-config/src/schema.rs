// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Root configuration object. Loaded by [`crate::loader`] from the search
/// path, then overridden by `CODELOOP_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            database: DatabaseConfig::default(),
            indexer: IndexerConfig::default(),
            execution: ExecutionConfig::default(),
            debug: false,
        }
    }
}

/// Local LLM endpoint settings. Targets an Ollama-compatible `/api/generate`
/// endpoint by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: String,
    /// Model name forwarded to the provider's generate endpoint.
    pub name: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".into(),
            name: "llama2".into(),
            base_url: "http://localhost:11434".into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

/// Cache & Session Store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub db_path: String,
    /// Maximum number of recent session summaries fed back into context.
    pub max_summaries: u32,
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_path: ".codeloop.db".into(),
            max_summaries: 10,
            cache_enabled: true,
        }
    }
}

/// File indexer settings — governs which files are eligible for caching and
/// whether a filesystem watcher keeps the index warm between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    pub index_file: String,
    pub ignore_patterns: Vec<String>,
    #[serde(default = "default_true")]
    pub watch_enabled: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            index_file: ".codeloop_index.json".into(),
            ignore_patterns: vec![
                ".git".into(),
                "target".into(),
                "node_modules".into(),
                ".env".into(),
                "*.pyc".into(),
            ],
            watch_enabled: true,
        }
    }
}

/// Execution-loop behavior: confirmation gating and verbosity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// When true, destructive actions are executed without prompting for
    /// confirmation. Defaults to false — the Executor always asks first.
    #[serde(default)]
    pub auto_continue: bool,
    /// Tool names whose full output is echoed to the terminal as it runs,
    /// rather than only appearing in the final synthesized answer.
    #[serde(default)]
    pub show_tool_output: Vec<String>,
}
