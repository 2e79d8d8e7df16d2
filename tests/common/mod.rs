//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use commitsmith::config::ConfigPaths;
use commitsmith::{BackendError, BackendOutput, Git2Source, HookArgs, TextGenerationBackend};

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// A test git repository builder for integration tests.
///
/// Holds a second directory for the global config so it never lands in
/// the work tree.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub config_dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = temp_test_dir();
        let config_dir = temp_test_dir();
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
        }
        Self {
            dir,
            config_dir,
            repo,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the work tree root.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Add a path to the index.
    pub fn stage(&self, rel: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(rel)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write and stage a file in one step.
    pub fn write_staged(&self, rel: &str, content: &str) {
        self.write(rel, content);
        self.stage(rel);
    }

    /// Commit the current index. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig =
            Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Write the global config document.
    pub fn global_config(&self, yaml: &str) {
        std::fs::write(self.config_paths().global, yaml).expect("Failed to write global config");
    }

    /// Write the repository-local config document.
    pub fn local_config(&self, yaml: &str) {
        std::fs::write(self.config_paths().local, yaml).expect("Failed to write local config");
    }

    pub fn config_paths(&self) -> ConfigPaths {
        ConfigPaths {
            global: self.config_dir.path().join("config.yaml"),
            local: self.path().join(".commitsmith.yaml"),
        }
    }

    /// A fresh git source for the repository.
    pub fn source(&self) -> Git2Source {
        let repo = Repository::open(self.path()).expect("Failed to reopen repo");
        Git2Source::from_repository(repo).expect("Repository should have a work tree")
    }

    /// Path of the commit message file, seeded with `content`.
    pub fn message_file(&self, content: &str) -> PathBuf {
        let path = self.repo.path().join("COMMIT_EDITMSG");
        std::fs::write(&path, content).expect("Failed to write message file");
        path
    }

    pub fn args(&self, message_file: PathBuf, source: Option<&str>) -> HookArgs {
        HookArgs {
            message_file,
            source: source.map(str::to_string),
            sha: None,
        }
    }
}

/// Backend double that replays a canned reply and records prompts.
#[derive(Clone)]
pub struct FakeBackend {
    pub available: bool,
    pub output: String,
    pub exit_code: i32,
    pub calls: Arc<AtomicU32>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeBackend {
    pub fn replying(output: &str) -> Self {
        Self {
            available: true,
            output: output.to_string(),
            exit_code: 0,
            calls: Arc::new(AtomicU32::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(output: &str, exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::replying(output)
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::replying("")
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().expect("prompt lock poisoned").last().cloned()
    }
}

#[async_trait]
impl TextGenerationBackend for FakeBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn invoke(&self, prompt: &str) -> Result<BackendOutput, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt lock poisoned")
            .push(prompt.to_string());
        Ok(BackendOutput {
            output: self.output.clone(),
            exit_code: self.exit_code,
        })
    }
}
