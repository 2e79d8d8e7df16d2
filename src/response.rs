//! Extraction of the commit message from raw backend output.
//!
//! The backend is asked to wrap the message in a fenced block: a line of
//! three backticks, the message, and another line of three backticks.
//! Only bare fence lines count; a fence carrying an info string (such as
//! a language name) is treated as ordinary content.

use crate::error::ResponseError;

const FENCE: &str = "```";

/// Maximum raw output lines echoed in diagnostics.
pub const DIAGNOSTIC_LINES: usize = 20;

/// Return the content of the first fenced block in `raw`.
///
/// Blank lines directly inside the fences are dropped. A missing or
/// unterminated block, or one with no content, is
/// [`ResponseError::NoCommitBlockFound`].
pub fn parse(raw: &str) -> Result<String, ResponseError> {
    let mut lines = raw.lines();

    lines
        .by_ref()
        .find(|line| is_fence(line))
        .ok_or(ResponseError::NoCommitBlockFound)?;

    let mut body = Vec::new();
    let mut closed = false;
    for line in lines {
        if is_fence(line) {
            closed = true;
            break;
        }
        body.push(line);
    }

    if !closed {
        return Err(ResponseError::NoCommitBlockFound);
    }

    let first = body.iter().position(|l| !l.trim().is_empty());
    let last = body.iter().rposition(|l| !l.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => Ok(body[first..=last].join("\n")),
        _ => Err(ResponseError::NoCommitBlockFound),
    }
}

fn is_fence(line: &str) -> bool {
    line.trim() == FENCE
}

/// The first [`DIAGNOSTIC_LINES`] lines of raw output, for error reports.
pub fn excerpt(raw: &str) -> String {
    let mut out = raw
        .lines()
        .take(DIAGNOSTIC_LINES)
        .collect::<Vec<_>>()
        .join("\n");
    let total = raw.lines().count();
    if total > DIAGNOSTIC_LINES {
        out.push_str(&format!("\n... ({} more lines)", total - DIAGNOSTIC_LINES));
    }
    out
}
