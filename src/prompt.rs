//! Prompt template rendering.
//!
//! Templates reference these placeholders:
//! `{repo_name}`, `{max_subject_length}`, `{max_body_length}`,
//! `{author_name}`, `{author_email}`, `{project_context}`, `{diff}`.
//! Any other `{...}` text is left alone.

/// Values for every recognized placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptVars {
    pub repo_name: String,
    pub max_subject_length: usize,
    pub max_body_length: usize,
    pub author_name: String,
    pub author_email: String,
    pub project_context: String,
    pub diff: String,
}

impl PromptVars {
    /// Value for a placeholder name, or `None` if the name is not recognized.
    fn lookup(&self, name: &str) -> Option<String> {
        let value = match name {
            "repo_name" => self.repo_name.clone(),
            "max_subject_length" => self.max_subject_length.to_string(),
            "max_body_length" => self.max_body_length.to_string(),
            "author_name" => self.author_name.clone(),
            "author_email" => self.author_email.clone(),
            "project_context" => self.project_context.clone(),
            "diff" => self.diff.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// Render `template` with `vars`.
///
/// Placeholders are replaced in one left-to-right pass over the template,
/// so substituted text is never scanned again. Afterwards every literal
/// `\n` (backslash, `n`) becomes a newline.
pub fn render(template: &str, vars: &PromptVars) -> String {
    let mut out = String::with_capacity(template.len() + vars.diff.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];

        let replaced = candidate.find('}').and_then(|close| {
            vars.lookup(&candidate[..close])
                .map(|value| (value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(&value);
                rest = &candidate[close + 1..];
            }
            None => {
                out.push('{');
                rest = candidate;
            }
        }
    }
    out.push_str(rest);

    out.replace("\\n", "\n")
}
