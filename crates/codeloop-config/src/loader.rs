// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::Config;

/// Ordered list of config file locations searched from lowest to highest priority.
/// Later files override earlier ones.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. System-wide default
    paths.push(PathBuf::from("/etc/codeloop/config.yaml"));
    paths.push(PathBuf::from("/etc/codeloop/config.yml"));

    // 2. XDG / home
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/codeloop/config.yaml"));
        paths.push(home.join(".config/codeloop/config.yml"));
    }
    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("codeloop/config.yaml"));
        paths.push(cfg.join("codeloop/config.yml"));
    }

    // 3. Workspace-local
    paths.push(PathBuf::from(".codeloop/config.yaml"));
    paths.push(PathBuf::from(".codeloop/config.yml"));
    paths.push(PathBuf::from(".codeloop.yaml"));
    paths.push(PathBuf::from(".codeloop.yml"));
    paths.push(PathBuf::from("codeloop.yaml"));
    paths.push(PathBuf::from("codeloop.yml"));

    paths
}

/// The path `config-reset` writes defaults to: `~/.config/codeloop/config.yaml`,
/// falling back to the workspace-local `.codeloop.yaml` if no home directory
/// can be resolved.
pub fn user_config_path() -> PathBuf {
    match dirs::config_dir() {
        Some(cfg) => cfg.join("codeloop/config.yaml"),
        None => PathBuf::from(".codeloop.yaml"),
    }
}

/// Load configuration by merging all discovered YAML files, then applying
/// `CODELOOP_*` environment variable overrides.
/// The `extra` argument may provide an explicit path (e.g. `--config` CLI flag).
pub fn load(extra: Option<&Path>) -> anyhow::Result<Config> {
    let mut merged = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());

    for path in config_search_paths() {
        if path.is_file() {
            debug!(path = %path.display(), "loading config layer");
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let layer: serde_yaml::Value = serde_yaml::from_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?;
            merge_yaml(&mut merged, layer);
        }
    }

    if let Some(p) = extra {
        debug!(path = %p.display(), "loading explicit config");
        let text =
            std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
        let layer: serde_yaml::Value =
            serde_yaml::from_str(&text).with_context(|| format!("parsing {}", p.display()))?;
        merge_yaml(&mut merged, layer);
    }

    // Deserialize the merged YAML value into Config, falling back to defaults
    // when the merged value is empty (no config files found).
    let mut config: Config = if matches!(merged, serde_yaml::Value::Mapping(ref m) if m.is_empty())
    {
        Config::default()
    } else {
        serde_yaml::from_value(merged).unwrap_or_default()
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Deep-merge `src` into `dst`; src wins on scalar conflicts.
fn merge_yaml(dst: &mut serde_yaml::Value, src: serde_yaml::Value) {
    match (dst, src) {
        (serde_yaml::Value::Mapping(d), serde_yaml::Value::Mapping(s)) => {
            for (k, v) in s {
                let entry = d
                    .entry(k)
                    .or_insert(serde_yaml::Value::Mapping(serde_yaml::Mapping::new()));
                merge_yaml(entry, v);
            }
        }
        (dst, src) => *dst = src,
    }
}

fn env_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

/// Applies `CODELOOP_*` environment variable overrides on top of the merged
/// YAML config. Mirrors the coercion rules of the original env-override
/// table: float for temperature, int for token/summary counts, a small
/// truthy-word set for booleans.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(v) = std::env::var("CODELOOP_PROVIDER") {
        config.model.provider = v;
    }
    if let Ok(v) = std::env::var("CODELOOP_MODEL") {
        config.model.name = v;
    }
    if let Ok(v) = std::env::var("CODELOOP_BASE_URL") {
        config.model.base_url = v;
    }
    if let Ok(v) = std::env::var("CODELOOP_TEMPERATURE") {
        if let Ok(t) = v.parse::<f32>() {
            config.model.temperature = t;
        }
    }
    if let Ok(v) = std::env::var("CODELOOP_MAX_TOKENS") {
        config.model.max_tokens = v.parse::<u32>().ok();
    }
    if let Ok(v) = std::env::var("CODELOOP_DB_PATH") {
        config.database.db_path = v;
    }
    if let Ok(v) = std::env::var("CODELOOP_MAX_SUMMARIES") {
        if let Ok(n) = v.parse::<u32>() {
            config.database.max_summaries = n;
        }
    }
    if let Ok(v) = std::env::var("CODELOOP_CACHE_ENABLED") {
        config.database.cache_enabled = env_bool(&v);
    }
    if let Ok(v) = std::env::var("CODELOOP_INDEX_FILE") {
        config.indexer.index_file = v;
    }
    if let Ok(v) = std::env::var("CODELOOP_WATCH_ENABLED") {
        config.indexer.watch_enabled = env_bool(&v);
    }
    if let Ok(v) = std::env::var("CODELOOP_AUTO_CONTINUE") {
        config.execution.auto_continue = env_bool(&v);
    }
    if let Ok(v) = std::env::var("CODELOOP_DEBUG") {
        config.debug = env_bool(&v);
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    // Serializes tests that mutate process-wide env vars.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn val(s: &str) -> serde_yaml::Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn merge_scalar_src_wins() {
        let mut dst = val("x: 1");
        let src = val("x: 2");
        merge_yaml(&mut dst, src);
        assert_eq!(dst["x"].as_i64(), Some(2));
    }

    #[test]
    fn merge_preserves_keys_not_in_src() {
        let mut dst = val("a: 1\nb: 2");
        let src = val("b: 99");
        merge_yaml(&mut dst, src);
        assert_eq!(dst["a"].as_i64(), Some(1));
        assert_eq!(dst["b"].as_i64(), Some(99));
    }

    #[test]
    fn merge_nested_tables() {
        let mut dst = val("model:\n  provider: ollama\n  name: llama2");
        let src = val("model:\n  name: llama3");
        merge_yaml(&mut dst, src);
        assert_eq!(dst["model"]["provider"].as_str(), Some("ollama"));
        assert_eq!(dst["model"]["name"].as_str(), Some("llama3"));
    }

    #[test]
    fn load_returns_error_when_explicit_path_missing() {
        let _guard = ENV_LOCK.lock().unwrap();
        let result = load(Some(Path::new("/tmp/codeloop_nonexistent_config_xyz.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn load_with_no_extra_path_returns_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let cfg = load(None).unwrap();
        assert_eq!(cfg.model.provider, "ollama");
    }

    #[test]
    fn load_explicit_file_overrides_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "model:\n  provider: openai\n  name: gpt-4o\n  base_url: https://api.openai.com\n  temperature: 0.1").unwrap();
        let cfg = load(Some(f.path())).unwrap();
        assert_eq!(cfg.model.provider, "openai");
        assert_eq!(cfg.model.name, "gpt-4o");
    }

    #[test]
    fn env_override_wins_over_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("CODELOOP_PROVIDER", "anthropic");
        std::env::set_var("CODELOOP_AUTO_CONTINUE", "yes");
        let cfg = load(None).unwrap();
        assert_eq!(cfg.model.provider, "anthropic");
        assert!(cfg.execution.auto_continue);
        std::env::remove_var("CODELOOP_PROVIDER");
        std::env::remove_var("CODELOOP_AUTO_CONTINUE");
    }

    #[test]
    fn env_bool_accepts_truthy_words() {
        assert!(env_bool("true"));
        assert!(env_bool("1"));
        assert!(env_bool("yes"));
        assert!(env_bool("ON"));
        assert!(!env_bool("false"));
        assert!(!env_bool("nah"));
    }
}
