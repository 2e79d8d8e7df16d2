//! Repository metadata and staged diff collection using git2.

use std::path::{Path, PathBuf};

use git2::{DiffFormat, ErrorCode, Repository, Tree};
use tracing::{debug, warn};

use crate::error::GitError;

/// Marker directories git creates while a rebase is in progress.
const REBASE_MARKERS: [&str; 2] = ["rebase-merge", "rebase-apply"];

/// Everything the hook needs to know about the repository.
///
/// This abstraction allows substituting the repository in tests.
#[cfg_attr(test, mockall::automock)]
pub trait GitSource {
    /// Whether a rebase is underway.
    fn rebase_in_progress(&self) -> bool;

    /// Unified diff of the index against HEAD. Empty when nothing is staged.
    fn staged_diff(&self) -> Result<String, GitError>;

    /// Short repository name.
    fn repo_name(&self) -> String;

    /// Configured author `(name, email)`; empty strings when unset.
    fn author(&self) -> (String, String);

    /// Root of the work tree.
    fn work_dir(&self) -> PathBuf;
}

/// [`GitSource`] backed by a real repository.
pub struct Git2Source {
    repo: Repository,
}

impl Git2Source {
    /// Discover the repository containing `path`.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(GitError::Discover)?;
        if repo.is_bare() {
            return Err(GitError::Bare);
        }
        Ok(Self { repo })
    }

    pub fn from_repository(repo: Repository) -> Result<Self, GitError> {
        if repo.is_bare() {
            return Err(GitError::Bare);
        }
        Ok(Self { repo })
    }

    fn config_string(&self, key: &str) -> String {
        match self.repo.config().and_then(|c| c.get_string(key)) {
            Ok(value) => value,
            Err(e) => {
                debug!("git config {key} unavailable: {}", e.message());
                String::new()
            }
        }
    }
}

impl GitSource for Git2Source {
    fn rebase_in_progress(&self) -> bool {
        let git_dir = self.repo.path();
        REBASE_MARKERS.iter().any(|m| git_dir.join(m).is_dir())
    }

    fn staged_diff(&self) -> Result<String, GitError> {
        let head_tree = resolve_head_tree(&self.repo)?;
        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, None)
            .map_err(GitError::Diff)?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            // Include the origin character for content lines
            let origin = line.origin();
            if origin == '+' || origin == '-' || origin == ' ' {
                text.push(origin);
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })
        .map_err(GitError::Diff)?;

        Ok(text)
    }

    fn repo_name(&self) -> String {
        self.work_dir()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| {
                warn!("Could not determine repository name");
                String::new()
            })
    }

    fn author(&self) -> (String, String) {
        (self.config_string("user.name"), self.config_string("user.email"))
    }

    fn work_dir(&self) -> PathBuf {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.repo.path().to_path_buf())
    }
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// `Ok(Some(tree))` for repos with a valid HEAD, or `Err(GitError::Diff)`
/// for real errors (corrupt HEAD, permission issues, missing objects).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::Diff(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::Diff)?;
    Ok(Some(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;

    fn init_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn commit_all(repo: &Repository, message: &str) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    fn stage(repo: &Repository, path: &str) {
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
    }

    #[test]
    fn test_clean_repo_has_empty_staged_diff() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        commit_all(&repo, "init");

        let source = Git2Source::from_repository(repo).unwrap();
        assert_eq!(source.staged_diff().unwrap(), "");
    }

    #[test]
    fn test_unstaged_changes_are_not_included() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        commit_all(&repo, "init");
        std::fs::write(dir.path().join("a.txt"), "changed\n").unwrap();

        let source = Git2Source::from_repository(repo).unwrap();
        assert_eq!(source.staged_diff().unwrap(), "");
    }

    #[test]
    fn test_staged_modification_produces_file_header() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("file.txt"), "original\n").unwrap();
        commit_all(&repo, "init");
        std::fs::write(dir.path().join("file.txt"), "modified\n").unwrap();
        stage(&repo, "file.txt");

        let source = Git2Source::from_repository(repo).unwrap();
        let diff = source.staged_diff().unwrap();
        assert!(diff.starts_with("diff --git a/file.txt b/file.txt\n"));
        assert!(diff.contains("-original\n"));
        assert!(diff.contains("+modified\n"));
    }

    #[test]
    fn test_unborn_branch_diffs_against_empty_tree() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("new.txt"), "hello\n").unwrap();
        stage(&repo, "new.txt");

        let source = Git2Source::from_repository(repo).unwrap();
        let diff = source.staged_diff().unwrap();
        assert!(diff.contains("b/new.txt"));
        assert!(diff.contains("+hello"));
    }

    #[test]
    fn test_corrupt_head_propagates_error() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        commit_all(&repo, "init");
        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/\0invalid").unwrap();

        let repo = Repository::open(dir.path()).unwrap();
        let source = Git2Source::from_repository(repo).unwrap();
        assert!(matches!(source.staged_diff(), Err(GitError::Diff(_))));
    }

    #[test]
    fn test_rebase_marker_detected() {
        let (dir, repo) = init_repo();
        let source = Git2Source::from_repository(repo).unwrap();
        assert!(!source.rebase_in_progress());

        std::fs::create_dir(dir.path().join(".git/rebase-merge")).unwrap();
        assert!(source.rebase_in_progress());
    }

    #[test]
    fn test_repo_name_and_author() {
        let (dir, repo) = init_repo();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Ada Lovelace").unwrap();
        config.set_str("user.email", "ada@example.com").unwrap();

        let source = Git2Source::from_repository(repo).unwrap();
        let expected = dir
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert_eq!(source.repo_name(), expected);
        assert_eq!(
            source.author(),
            ("Ada Lovelace".to_string(), "ada@example.com".to_string())
        );
    }

    #[test]
    fn test_bare_repository_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init_bare(dir.path()).unwrap();
        assert!(matches!(
            Git2Source::from_repository(repo),
            Err(GitError::Bare)
        ));
    }
}
