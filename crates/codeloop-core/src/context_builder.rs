// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use codeloop_store::SessionStore;
use codeloop_tools::builtin::{git_commit_hash, git_status};

use crate::types::Context;

/// Assembles the per-request Context from git state and recent session
/// summaries. Every external call degrades to a documented default rather
/// than propagating an error — see §7 of the design (TransientIO).
pub struct ContextBuilder {
    sessions: Arc<SessionStore>,
    max_summaries: usize,
}

impl ContextBuilder {
    pub fn new(sessions: Arc<SessionStore>, max_summaries: usize) -> Self {
        Self {
            sessions,
            max_summaries,
        }
    }

    pub async fn build(&self, user_prompt: &str) -> Context {
        let user_prompt = user_prompt.to_string();
        let current_commit = git_commit_hash::current_commit_hash().await;
        let modified_files = git_status::modified_files().await.unwrap_or_default();
        // `get_recent_summaries` returns newest/most-relevant first; reverse
        // so `Context.recent_summaries` honors its documented "newest-last"
        // contract, which `Planner::render_prompt` relies on.
        let mut recent_summaries: Vec<String> = self
            .sessions
            .get_recent_summaries(self.max_summaries, Some(&user_prompt), true)
            .map(|rows| rows.into_iter().map(|r| r.summary).collect())
            .unwrap_or_default();
        recent_summaries.reverse();

        Context {
            user_prompt,
            current_commit,
            modified_files,
            recent_summaries,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeloop_store::Store;

    #[tokio::test]
    async fn build_never_panics_outside_or_inside_a_repo() {
        let store = Store::open_in_memory().unwrap();
        let builder = ContextBuilder::new(Arc::new(store.sessions), 5);
        let ctx = builder.build("hello").await;
        assert_eq!(ctx.user_prompt, "hello");
        assert!(!ctx.current_commit.is_empty());
    }
}
