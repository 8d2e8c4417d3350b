// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = codeloop_config::load(cli.config.as_deref())
        .context("loading configuration")?;

    let code = match cli.command.unwrap_or(Commands::Run { prompt: None }) {
        Commands::Init => run_init(&config).await,
        Commands::Run { prompt } => run(&config, prompt).await,
        Commands::Status => run_status(&config),
        Commands::Tools => run_tools(&config),
        Commands::ConfigShow => run_config_show(&config),
        Commands::ConfigReset => run_config_reset(),
    };

    std::process::exit(code);
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}

/// Exit code 0 on success, 1 on model unavailability — per the CLI contract
/// in the design (§6).
async fn run_init(config: &codeloop_config::Config) -> i32 {
    let model = codeloop_model::from_config(&config.model);
    if !model.is_available().await {
        eprintln!("model endpoint is not reachable: {}", config.model.base_url);
        return 1;
    }
    match codeloop_store::Store::open(&config.database) {
        Ok(_) => {
            println!("codeloop initialized (db: {})", config.database.db_path);
            0
        }
        Err(e) => {
            eprintln!("failed to initialize session store: {e}");
            1
        }
    }
}

async fn run(config: &codeloop_config::Config, prompt: Option<String>) -> i32 {
    let driver = match codeloop_bootstrap::build_driver(config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("failed to start agent: {e}");
            return 1;
        }
    };

    match prompt {
        Some(prompt) => {
            println!("{}", driver.process_request(&prompt).await);
        }
        None => {
            let stdin = io::stdin();
            print!("> ");
            io::stdout().flush().ok();
            for line in stdin.lock().lines().map_while(Result::ok) {
                if line.trim().is_empty() {
                    print!("> ");
                    io::stdout().flush().ok();
                    continue;
                }
                println!("{}", driver.process_request(&line).await);
                print!("> ");
                io::stdout().flush().ok();
            }
        }
    }
    0
}

fn run_status(config: &codeloop_config::Config) -> i32 {
    println!("model: {} ({})", config.model.name, config.model.provider);
    println!("database: {}", config.database.db_path);
    println!("auto_continue: {}", config.execution.auto_continue);
    0
}

fn run_tools(config: &codeloop_config::Config) -> i32 {
    let model = std::sync::Arc::from(codeloop_model::from_config(&config.model));
    let cache = match codeloop_store::Store::open(&config.database) {
        Ok(store) => std::sync::Arc::new(store.cache),
        Err(e) => {
            eprintln!("failed to open database at {}: {e}", config.database.db_path);
            return 1;
        }
    };
    let registry = codeloop_bootstrap::build_tool_registry(model, cache);
    for schema in registry.schemas() {
        let marker = if schema.destructive { "*" } else { " " };
        println!("{marker} {:<24} {}", schema.name, schema.description);
    }
    0
}

fn run_config_show(config: &codeloop_config::Config) -> i32 {
    println!("{}", serde_yaml::to_string(config).unwrap_or_default());
    0
}

fn run_config_reset() -> i32 {
    let path = codeloop_config::user_config_path();
    let default = codeloop_config::Config::default();
    let yaml = match serde_yaml::to_string(&default) {
        Ok(y) => y,
        Err(e) => {
            eprintln!("failed to render default config: {e}");
            return 1;
        }
    };
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("failed to create {}: {e}", parent.display());
            return 1;
        }
    }
    match std::fs::write(&path, yaml) {
        Ok(()) => {
            println!("wrote default config to {}", path.display());
            0
        }
        Err(e) => {
            eprintln!("failed to write {}: {e}", path.display());
            1
        }
    }
}
