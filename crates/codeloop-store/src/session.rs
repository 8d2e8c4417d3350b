// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;
use serde_json::Value;

use crate::relevance::{filter_relevant, jaccard_similarity};

/// A previously recorded session, as read back for the recent-summaries
/// feed handed to the context builder.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub id: i64,
    pub timestamp: String,
    pub user_prompt: String,
    pub summary: String,
}

/// A prompt match returned by [`SessionStore::search_similar_prompts`].
#[derive(Debug, Clone)]
pub struct PromptMatch {
    pub prompt: String,
    pub summary: String,
    pub timestamp: String,
    pub similarity: f64,
}

/// Persists sessions and per-step model interactions to the `sessions` and
/// `model_interactions` tables.
pub struct SessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SessionStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Records a completed session and returns its newly assigned id.
    pub fn store_session(
        &self,
        user_prompt: &str,
        commit_hash: &str,
        modified_files: &[String],
        summary: &str,
        execution_log: Option<&Value>,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sessions \
             (timestamp, user_prompt, commit_hash, modified_files, summary, execution_log) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Utc::now().to_rfc3339(),
                user_prompt,
                commit_hash,
                serde_json::to_string(modified_files)?,
                summary,
                execution_log.map(|v| v.to_string()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Records one model call made during a session's plan/execute loop.
    pub fn store_model_interaction<M: Serialize>(
        &self,
        session_id: i64,
        step_number: u32,
        prompt: &str,
        response: &str,
        metadata: Option<&M>,
    ) -> Result<()> {
        let metadata_json = metadata.map(serde_json::to_string).transpose()?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO model_interactions \
             (session_id, timestamp, step_number, prompt, response, metadata) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session_id,
                Utc::now().to_rfc3339(),
                step_number,
                prompt,
                response,
                metadata_json,
            ],
        )?;
        Ok(())
    }

    /// Returns up to `limit` recent session summaries, newest first.
    ///
    /// When `current_prompt` is given and relevance filtering is enabled,
    /// the most recent `limit * 2` sessions are scored by bag-of-words
    /// overlap against `current_prompt` and only the relevant ones kept;
    /// otherwise the plain newest-first list is truncated to `limit`.
    pub fn get_recent_summaries(
        &self,
        limit: usize,
        current_prompt: Option<&str>,
        use_relevance_filter: bool,
    ) -> Result<Vec<SessionSummary>> {
        let fetch_n = if use_relevance_filter && current_prompt.is_some() {
            limit * 2
        } else {
            limit
        };

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, user_prompt, summary FROM sessions \
             ORDER BY timestamp DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![fetch_n as i64], |row| {
                Ok(SessionSummary {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    user_prompt: row.get(2)?,
                    summary: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        drop(stmt);
        drop(conn);

        match (use_relevance_filter, current_prompt) {
            (true, Some(prompt)) => {
                let kept = filter_relevant(prompt, &rows, |r| r.summary.as_str(), limit);
                Ok(kept.into_iter().cloned().collect())
            }
            _ => Ok(rows.into_iter().take(limit).collect()),
        }
    }

    /// Ranks past sessions by bag-of-words overlap against `query`,
    /// descending, capped at `limit`. Unlike [`Self::get_recent_summaries`]
    /// this has no minimum-similarity floor — callers decide what's useful.
    pub fn search_similar_prompts(&self, query: &str, limit: usize) -> Result<Vec<PromptMatch>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT user_prompt, summary, timestamp FROM sessions")?;
        let mut matches = stmt
            .query_map([], |row| {
                let prompt: String = row.get(0)?;
                let summary: String = row.get(1)?;
                let timestamp: String = row.get(2)?;
                Ok((prompt, summary, timestamp))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(|(prompt, summary, timestamp)| {
                let similarity = jaccard_similarity(query, &prompt);
                PromptMatch {
                    prompt,
                    summary,
                    timestamp,
                    similarity,
                }
            })
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap());
        matches.truncate(limit);
        Ok(matches)
    }
}
