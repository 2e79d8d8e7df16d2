//! Unified diff sections and glob-based file filtering.

use regex_lite::Regex;
use tracing::debug;

use crate::error::ConfigError;

/// Marker that starts a per-file section in `git diff` output.
const FILE_HEADER_PREFIX: &str = "diff --git ";

/// One per-file section of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSection {
    /// Path from the `b/` side of the header, prefix stripped.
    /// `None` for text that precedes the first file header.
    pub path: Option<String>,
    /// Full section text, header included, line endings preserved.
    pub body: String,
}

/// A unified diff split into ordered per-file sections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnifiedDiff {
    sections: Vec<FileSection>,
}

impl UnifiedDiff {
    /// Split diff text at each `diff --git` header.
    pub fn parse(text: &str) -> Self {
        let mut sections: Vec<FileSection> = Vec::new();

        for line in text.split_inclusive('\n') {
            if let Some(header) = line.strip_prefix(FILE_HEADER_PREFIX) {
                sections.push(FileSection {
                    path: Some(header_path(header)),
                    body: String::new(),
                });
            } else if sections.is_empty() {
                sections.push(FileSection {
                    path: None,
                    body: String::new(),
                });
            }
            if let Some(current) = sections.last_mut() {
                current.body.push_str(line);
            }
        }

        Self { sections }
    }

    pub fn sections(&self) -> &[FileSection] {
        &self.sections
    }

    /// Paths of every file section, in order.
    pub fn paths(&self) -> Vec<&str> {
        self.sections.iter().filter_map(|s| s.path.as_deref()).collect()
    }

    /// True when no section carries any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.sections.iter().all(|s| s.body.trim().is_empty())
    }

    /// Reassemble the diff text.
    pub fn to_text(&self) -> String {
        self.sections.iter().map(|s| s.body.as_str()).collect()
    }
}

/// Extract the path from the remainder of a `diff --git a/x b/x` header.
///
/// Uses the last ` b/` separator so paths containing spaces survive; falls
/// back to the last whitespace-separated token. Git quotes paths with
/// special or non-ASCII bytes (`"b/caf\303\251.md"`); those are unquoted.
fn header_path(header: &str) -> String {
    let header = header.trim_end_matches(['\n', '\r']);
    if let Some(idx) = header.rfind(" \"b/")
        && let Some(quoted) = header[idx + 1..].strip_suffix('"')
    {
        let path = unquote(&quoted[1..]);
        return path.strip_prefix("b/").unwrap_or(&path).to_string();
    }

    let b_side = match header.rfind(" b/") {
        Some(idx) => &header[idx + 1..],
        None => header.rsplit(' ').next().unwrap_or(header),
    };
    b_side.strip_prefix("b/").unwrap_or(b_side).to_string()
}

/// Undo git's C-style path quoting (the text between the quotes).
///
/// Octal escapes are raw bytes, so multi-byte UTF-8 is decoded after
/// all escapes are resolved.
fn unquote(quoted: &str) -> String {
    let mut bytes = Vec::with_capacity(quoted.len());
    let mut rest = quoted.as_bytes();

    while let Some((&b, tail)) = rest.split_first() {
        rest = tail;
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        let Some((&esc, tail)) = rest.split_first() else {
            bytes.push(b'\\');
            break;
        };
        rest = tail;
        match esc {
            b'0'..=b'7' => {
                let mut value = u32::from(esc - b'0');
                for _ in 0..2 {
                    match rest.split_first() {
                        Some((&d @ b'0'..=b'7', tail)) => {
                            value = value * 8 + u32::from(d - b'0');
                            rest = tail;
                        }
                        _ => break,
                    }
                }
                bytes.push(value as u8);
            }
            b'a' => bytes.push(0x07),
            b'b' => bytes.push(0x08),
            b'f' => bytes.push(0x0c),
            b'n' => bytes.push(b'\n'),
            b'r' => bytes.push(b'\r'),
            b't' => bytes.push(b'\t'),
            b'v' => bytes.push(0x0b),
            other => bytes.push(other),
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Compile a glob into an anchored regex.
///
/// `*` matches any run of characters (including `/`), `?` matches one
/// character, everything else is literal.
pub fn glob_to_regex(glob: &str) -> Result<Regex, regex_lite::Error> {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push('^');
    let mut literal = String::new();
    for ch in glob.chars() {
        match ch {
            '*' | '?' => {
                pattern.push_str(&regex_lite::escape(&literal));
                literal.clear();
                pattern.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    pattern.push_str(&regex_lite::escape(&literal));
    pattern.push('$');
    Regex::new(&pattern)
}

/// Drops whole file sections whose path matches an ignore glob.
#[derive(Debug, Clone, Default)]
pub struct DiffFilter {
    patterns: Vec<(String, Regex)>,
}

impl DiffFilter {
    /// Compile every glob once.
    pub fn new(globs: &[String]) -> Result<Self, ConfigError> {
        let patterns = globs
            .iter()
            .map(|glob| {
                glob_to_regex(glob)
                    .map(|re| (glob.clone(), re))
                    .map_err(|source| ConfigError::InvalidPattern {
                        key: "file_ignore_patterns",
                        pattern: glob.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The first glob matching `path`, if any.
    pub fn matching_glob(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(path))
            .map(|(glob, _)| glob.as_str())
    }

    /// Remove ignored sections, preserving the order of the rest.
    ///
    /// With no patterns the diff is returned untouched.
    pub fn filter(&self, diff: UnifiedDiff) -> UnifiedDiff {
        if self.patterns.is_empty() {
            return diff;
        }

        let sections = diff
            .sections
            .into_iter()
            .filter(|section| {
                let Some(path) = section.path.as_deref() else {
                    return true;
                };
                match self.matching_glob(path) {
                    Some(glob) => {
                        debug!("Ignoring {path} (matches {glob})");
                        false
                    }
                    None => true,
                }
            })
            .collect();

        UnifiedDiff { sections }
    }
}
