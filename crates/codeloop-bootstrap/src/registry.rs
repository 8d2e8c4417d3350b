// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Centralised tool-registry builder. The single canonical place where
//! tools are wired up — adding a tool means registering it here once.
use std::sync::Arc;

use codeloop_model::ModelClient;
use codeloop_store::CacheService;
use codeloop_tools::{
    BrainstormSearchTermsTool, FileMoveTool, GitCommitHashTool, GitDiffTool, GitStatusTool,
    GrepTool, ProjectScaffoldTool, ToolRegistry, WriteFileTool,
};

use crate::analyze::AnalyzeTool;
use crate::cached_read_file::CachedReadFileTool;
use crate::summarize::SummarizeTool;

/// Builds a [`ToolRegistry`] with every built-in tool plus the LLM-backed
/// `summarize`/`analyze` tools (which need a handle to the Model Client) and
/// the cache-aware `read_file` (which needs a handle to the Cache Service).
pub fn build_tool_registry(model: Arc<dyn ModelClient>, cache: Arc<CacheService>) -> ToolRegistry {
    let mut reg = ToolRegistry::new();

    reg.register(CachedReadFileTool::new(cache));
    reg.register(WriteFileTool);
    reg.register(FileMoveTool);
    reg.register(ProjectScaffoldTool);
    reg.register(GrepTool);
    reg.register(GitStatusTool);
    reg.register(GitDiffTool);
    reg.register(GitCommitHashTool);
    reg.register(BrainstormSearchTermsTool);
    reg.register(SummarizeTool::new(model.clone()));
    reg.register(AnalyzeTool::new(model));

    reg
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeloop_model::MockClient;
    use codeloop_store::Store;

    #[test]
    fn registers_every_built_in_and_llm_backed_tool() {
        let cache = Arc::new(Store::open_in_memory().unwrap().cache);
        let reg = build_tool_registry(Arc::new(MockClient), cache);
        let names = reg.names();
        for expected in [
            "read_file",
            "write_file",
            "file_move",
            "project_scaffold",
            "grep",
            "git_status",
            "git_diff",
            "git_commit_hash",
            "brainstorm_search_terms",
            "summarize",
            "analyze",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {expected}");
        }
    }
}
