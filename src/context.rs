//! Project documentation excerpts that give the backend some context.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Documentation files read from the repository root, in order.
pub const CONTEXT_FILES: [&str; 2] = ["README.md", "CLAUDE.md"];

/// Lines captured from the top of each file.
pub const MAX_CONTEXT_LINES: usize = 100;

/// Prefix applied to every captured line.
const LINE_PREFIX: &str = "  ";

/// Reads documentation excerpts from a repository root.
#[derive(Debug, Clone)]
pub struct ContextCollector {
    root: PathBuf,
}

impl ContextCollector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Collect the excerpts. Missing or unreadable files are skipped, so
    /// the result is empty rather than an error.
    pub fn collect(&self) -> String {
        CONTEXT_FILES
            .iter()
            .filter_map(|name| excerpt(&self.root.join(name), name))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn excerpt(path: &Path, label: &str) -> Option<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("No context from {}: {e}", path.display());
            return None;
        }
    };

    let mut block = format!("{label} (first {MAX_CONTEXT_LINES} lines):");
    for line in content.lines().take(MAX_CONTEXT_LINES) {
        block.push('\n');
        block.push_str(LINE_PREFIX);
        block.push_str(line);
    }
    Some(block)
}
