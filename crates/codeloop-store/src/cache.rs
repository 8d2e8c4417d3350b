// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Fallback commit hash used when the working tree is not a git repository.
/// Distinct from the context builder's `"unknown"` sentinel: a cache entry
/// keyed on `"no-git"` is exempt from the commit-based cleanup sweep.
const NO_GIT_SENTINEL: &str = "no-git";

/// A file cached at a specific commit, with an optional generated summary.
#[derive(Debug, Clone)]
pub struct CachedFile {
    pub content: String,
    pub summary: Option<String>,
}

/// Commit-scoped file content cache, backed by the `file_cache` table.
///
/// A cached entry is only valid for the commit it was captured at — reads
/// at a different commit hash are treated as a miss, never served stale.
pub struct CacheService {
    conn: Arc<Mutex<Connection>>,
}

impl CacheService {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Current HEAD commit hash, or `"no-git"` outside a git repository.
    pub async fn current_commit(&self) -> String {
        match tokio::process::Command::new("git")
            .args(["rev-parse", "HEAD"])
            .output()
            .await
        {
            Ok(out) if out.status.success() => {
                String::from_utf8_lossy(&out.stdout).trim().to_string()
            }
            _ => NO_GIT_SENTINEL.to_string(),
        }
    }

    /// Hex-encoded content hash of a file's bytes, used to detect staleness.
    pub fn file_content_hash(path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {} for content hash", path.display()))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    fn get_cached(&self, file_path: &str, commit_hash: &str) -> Result<Option<CachedFile>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT content, summary FROM file_cache WHERE file_path = ?1 AND commit_hash = ?2",
                params![file_path, commit_hash],
                |row| {
                    Ok(CachedFile {
                        content: row.get(0)?,
                        summary: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn put_cached(
        &self,
        file_path: &str,
        commit_hash: &str,
        content: &str,
        summary: Option<&str>,
    ) -> Result<()> {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let content_hash = hex::encode(hasher.finalize());
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO file_cache \
             (file_path, commit_hash, content_hash, content, summary, last_updated) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                file_path,
                commit_hash,
                content_hash,
                content,
                summary,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Reads a file through the commit-scoped cache: serves the cached copy
    /// when present at the current commit, otherwise reads from disk and
    /// populates the cache (without a summary).
    pub async fn read_file_cached(&self, file_path: &str) -> Result<CachedFile> {
        let commit = self.current_commit().await;
        if let Some(cached) = self.get_cached(file_path, &commit)? {
            debug!(file_path, commit, "file cache hit");
            return Ok(cached);
        }
        let content = tokio::fs::read_to_string(file_path)
            .await
            .with_context(|| format!("reading {file_path}"))?;
        self.put_cached(file_path, &commit, &content, None)?;
        Ok(CachedFile {
            content,
            summary: None,
        })
    }

    /// Attaches a summary to a cached file, reading and caching it fresh if
    /// it wasn't already cached at the current commit.
    pub async fn cache_file_summary(&self, file_path: &str, summary: &str) -> Result<()> {
        let commit = self.current_commit().await;
        let content = match self.get_cached(file_path, &commit)? {
            Some(existing) => existing.content,
            None => tokio::fs::read_to_string(file_path)
                .await
                .with_context(|| format!("reading {file_path}"))?,
        };
        self.put_cached(file_path, &commit, &content, Some(summary))
    }

    /// Deletes cached entries for commits outside the last `keep_last_n`,
    /// always preserving entries cached under the `"no-git"` sentinel.
    /// A silent no-op when git is unavailable.
    pub async fn cleanup_old_cache(&self, keep_last_n: u32) -> Result<()> {
        let out = tokio::process::Command::new("git")
            .args(["log", &format!("-{keep_last_n}"), "--format=%H"])
            .output()
            .await;
        let out = match out {
            Ok(o) if o.status.success() => o,
            _ => return Ok(()),
        };
        let mut keep: Vec<String> = String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(|l| l.to_string())
            .filter(|l| !l.is_empty())
            .collect();
        keep.push(NO_GIT_SENTINEL.to_string());

        let placeholders = keep.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!("DELETE FROM file_cache WHERE commit_hash NOT IN ({placeholders})");
        let conn = self.conn.lock().unwrap();
        let params: Vec<&dyn rusqlite::ToSql> =
            keep.iter().map(|s| s as &dyn rusqlite::ToSql).collect();
        conn.execute(&sql, params.as_slice())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::init_schema;

    fn store() -> CacheService {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        CacheService::new(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn read_file_cached_misses_then_hits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();
        let cache = store();

        let first = cache.read_file_cached(path.to_str().unwrap()).await.unwrap();
        assert_eq!(first.content, "hello");
        assert!(first.summary.is_none());

        std::fs::write(&path, "mutated after caching").unwrap();
        let second = cache.read_file_cached(path.to_str().unwrap()).await.unwrap();
        assert_eq!(second.content, "hello", "served from cache, not re-read from disk");
    }

    #[tokio::test]
    async fn cache_file_summary_attaches_to_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();
        let cache = store();

        cache.read_file_cached(path.to_str().unwrap()).await.unwrap();
        cache
            .cache_file_summary(path.to_str().unwrap(), "a greeting")
            .await
            .unwrap();

        let again = cache.read_file_cached(path.to_str().unwrap()).await.unwrap();
        assert_eq!(again.summary.as_deref(), Some("a greeting"));
    }

    #[test]
    fn file_content_hash_changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();
        let h1 = CacheService::file_content_hash(&path).unwrap();
        std::fs::write(&path, "goodbye").unwrap();
        let h2 = CacheService::file_content_hash(&path).unwrap();
        assert_ne!(h1, h2);
    }
}
