// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
pub mod builtin;
pub mod registry;
pub mod tool;

pub use registry::{ToolRegistry, ToolSchema};
pub use tool::{Tool, ToolCall, ToolOutput};

pub use builtin::brainstorm_search_terms::BrainstormSearchTermsTool;
pub use builtin::file_move::FileMoveTool;
pub use builtin::git_commit_hash::GitCommitHashTool;
pub use builtin::git_diff::GitDiffTool;
pub use builtin::git_status::GitStatusTool;
pub use builtin::grep::GrepTool;
pub use builtin::project_scaffold::ProjectScaffoldTool;
pub use builtin::read_file::ReadFileTool;
pub use builtin::write_file::WriteFileTool;
