// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A local coding agent: plan/execute over a local model endpoint.
#[derive(Parser, Debug)]
#[command(name = "codeloop", version, about)]
pub struct Cli {
    /// Path to a config file. Defaults to the standard search order
    /// (/etc/codeloop, ~/.config/codeloop, ./.codeloop.yaml).
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Enable debug-level logging on stderr.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the initial file index and probe model availability.
    Init,

    /// Run one prompt (or start an interactive REPL if none is given).
    Run {
        /// The request to send. If omitted, reads prompts from stdin.
        prompt: Option<String>,
    },

    /// Print a one-line summary of the current agent state.
    Status,

    /// List all registered tools and their descriptions.
    Tools,

    /// Print the resolved configuration as YAML.
    ConfigShow,

    /// Write the default configuration to the user config path.
    ConfigReset,
}
