//! Common test utilities and helpers
//!
//! Registry fixtures, workspace layouts and a thin wrapper around the git
//! command line shared by the integration tests.

#![allow(dead_code)]

use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Write a registry catalog built from `(name, repository, dependencies)` triples
pub fn write_registry(dir: &Path, libraries: &[(&str, &str, Vec<&str>)]) -> PathBuf {
    write_registry_with_version(dir, 1, libraries)
}

/// Same as [`write_registry`] with an explicit API version
pub fn write_registry_with_version(
    dir: &Path,
    api_version: u32,
    libraries: &[(&str, &str, Vec<&str>)],
) -> PathBuf {
    let entries: serde_json::Map<String, serde_json::Value> = libraries
        .iter()
        .map(|(name, repository, dependencies)| {
            (
                name.to_string(),
                json!({
                    "machineName": name,
                    "majorVersion": 1,
                    "minorVersion": 2,
                    "patchVersion": 3,
                    "repository": repository,
                    "dependencies": dependencies,
                }),
            )
        })
        .collect();

    let path = dir.join("registry.json");
    let catalog = json!({ "apiVersion": api_version, "libraries": entries });
    std::fs::write(&path, serde_json::to_string_pretty(&catalog).unwrap())
        .expect("Failed to write registry fixture");
    path
}

/// Create `names` as fake checkouts (directories holding `.git`) under `root`
pub fn create_fake_checkouts(root: &Path, names: &[&str]) {
    for name in names {
        std::fs::create_dir_all(root.join(name).join(".git"))
            .expect("Failed to create fake checkout");
    }
}

/// Whether a usable git executable is on PATH
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run git in `dir` and panic with its stderr on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("Failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Give a repository a local identity so commits work without global config
pub fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.email", "dev@example.org"]);
    git(dir, &["config", "user.name", "Library Developer"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// A bare "remote" repository with one commit, plus the temp dir holding it
pub struct RemoteFixture {
    pub temp_dir: TempDir,
    pub bare: PathBuf,
}

impl RemoteFixture {
    /// Create `<tmp>/remote.git` containing `README.md` and `library.json`
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let seed = temp_dir.path().join("seed");
        std::fs::create_dir_all(&seed).unwrap();

        git(&seed, &["init", "--quiet"]);
        configure_identity(&seed);
        std::fs::write(seed.join("README.md"), "# H5P.Text\n").unwrap();
        std::fs::write(
            seed.join("library.json"),
            r#"{"machineName":"H5P.Text","majorVersion":1,"minorVersion":0,"patchVersion":0,"dependencies":[]}"#,
        )
        .unwrap();
        git(&seed, &["add", "-A"]);
        git(&seed, &["commit", "--quiet", "-m", "Initial commit"]);

        let bare = temp_dir.path().join("remote.git");
        git(
            temp_dir.path(),
            &["clone", "--quiet", "--bare", "seed", "remote.git"],
        );

        Self { temp_dir, bare }
    }

    pub fn url(&self) -> String {
        self.bare.to_string_lossy().into_owned()
    }
}
