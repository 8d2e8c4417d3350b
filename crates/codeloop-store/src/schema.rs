// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use rusqlite::Connection;

/// Creates the sessions / file_cache / model_interactions tables and their
/// indexes if they do not already exist. Safe to call on every startup.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sessions (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp       TEXT NOT NULL,
            user_prompt     TEXT NOT NULL,
            commit_hash     TEXT NOT NULL,
            modified_files  TEXT NOT NULL,
            summary         TEXT NOT NULL,
            execution_log   TEXT
        );

        CREATE TABLE IF NOT EXISTS file_cache (
            file_path     TEXT PRIMARY KEY,
            commit_hash   TEXT NOT NULL,
            content_hash  TEXT NOT NULL,
            content       TEXT NOT NULL,
            summary       TEXT,
            last_updated  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS model_interactions (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id    INTEGER,
            timestamp     TEXT NOT NULL,
            step_number   INTEGER NOT NULL,
            prompt        TEXT NOT NULL,
            response      TEXT NOT NULL,
            metadata      TEXT,
            FOREIGN KEY (session_id) REFERENCES sessions(id)
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_timestamp ON sessions(timestamp);
        CREATE INDEX IF NOT EXISTS idx_file_cache_commit ON file_cache(commit_hash);
        CREATE INDEX IF NOT EXISTS idx_model_interactions_session ON model_interactions(session_id);
        ",
    )
}
