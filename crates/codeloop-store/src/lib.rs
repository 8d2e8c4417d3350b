// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cache;
mod relevance;
mod schema;
mod session;

pub use cache::{CacheService, CachedFile};
pub use relevance::{jaccard_similarity, DEFAULT_MIN_SIMILARITY};
pub use session::{PromptMatch, SessionStore, SessionSummary};

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use codeloop_config::DatabaseConfig;
use rusqlite::Connection;
use tracing::info;

/// Opens (creating if necessary) the SQLite database described by
/// `config.db_path` and returns the paired [`CacheService`] and
/// [`SessionStore`] sharing that single connection.
pub struct Store {
    pub cache: CacheService,
    pub sessions: SessionStore,
}

impl Store {
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let conn = Connection::open(&config.db_path)
            .with_context(|| format!("opening database at {}", config.db_path))?;
        schema::init_schema(&conn).context("initializing schema")?;
        info!(db_path = %config.db_path, "opened codeloop store");

        let conn = Arc::new(Mutex::new(conn));
        Ok(Self {
            cache: CacheService::new(conn.clone()),
            sessions: SessionStore::new(conn),
        })
    }

    /// In-memory store for tests and one-shot runs with caching disabled.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("opening in-memory database")?;
        schema::init_schema(&conn).context("initializing schema")?;
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self {
            cache: CacheService::new(conn.clone()),
            sessions: SessionStore::new(conn),
        })
    }
}
