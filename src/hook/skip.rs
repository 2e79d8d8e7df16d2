//! Skip patterns matched against a pre-existing commit message.

use regex_lite::Regex;
use tracing::warn;

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    /// Fallback for patterns that are not valid regexes.
    Literal(String),
}

/// Ordered skip patterns.
///
/// Patterns are unanchored regexes, so plain text behaves as a substring
/// match and `^Merge` anchors to the start of the message. Matching is
/// case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct SkipPatterns {
    patterns: Vec<(String, Matcher)>,
}

impl SkipPatterns {
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| {
                let matcher = match Regex::new(p) {
                    Ok(re) => Matcher::Regex(re),
                    Err(e) => {
                        warn!(
                            "Skip pattern '{p}' is not a valid regex ({e}), matching it literally"
                        );
                        Matcher::Literal(p.clone())
                    }
                };
                (p.clone(), matcher)
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The first pattern matching `message`, if any.
    pub fn first_match(&self, message: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, matcher)| match matcher {
                Matcher::Regex(re) => re.is_match(message),
                Matcher::Literal(text) => message.contains(text.as_str()),
            })
            .map(|(pattern, _)| pattern.as_str())
    }
}

/// Strip git's comment lines from a commit message file.
pub fn strip_comments(message: &str) -> String {
    message
        .lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}
