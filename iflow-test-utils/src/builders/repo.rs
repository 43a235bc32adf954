//! Temporary package repositories backed by a real git work tree

use iflow_tools_core::ToolsConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Name of the config file written by [`TestRepoBuilder::with_config`]
pub const CONFIG_FILE: &str = "iflow-tools.yaml";

/// Builder for a committed git repository with packages and iFlows
#[derive(Default)]
pub struct TestRepoBuilder {
    packages: Vec<String>,
    iflows: Vec<(String, String)>,
    files: Vec<(PathBuf, String)>,
    config: Option<String>,
    skip_commit: bool,
}

impl TestRepoBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package directory (with a `package.json` so git tracks it)
    pub fn with_package(mut self, id: &str) -> Self {
        self.packages.push(id.to_string());
        self
    }

    /// Add an iFlow, creating its package if needed
    pub fn with_iflow(mut self, package: &str, iflow: &str) -> Self {
        if !self.packages.iter().any(|p| p == package) {
            self.packages.push(package.to_string());
        }
        self.iflows.push((package.to_string(), iflow.to_string()));
        self
    }

    /// Add an arbitrary file relative to the repository root
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.push((PathBuf::from(path), content.to_string()));
        self
    }

    /// Write `iflow-tools.yaml` at the repository root
    pub fn with_config(mut self, yaml: &str) -> Self {
        self.config = Some(yaml.to_string());
        self
    }

    /// Leave the repository without any commit; files stay untracked
    pub fn without_commit(mut self) -> Self {
        self.skip_commit = true;
        self
    }

    /// Materialize the repository and commit everything
    pub fn build(self) -> TestRepo {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let repo = TestRepo { dir };

        for package in &self.packages {
            repo.write_file(
                &format!("packages/{package}/package.json"),
                &format!("{{\"id\": \"{package}\"}}\n"),
            );
        }
        for (package, iflow) in &self.iflows {
            repo.add_iflow(package, iflow);
        }
        for (path, content) in &self.files {
            repo.write_file(&path.to_string_lossy(), content);
        }
        if let Some(config) = &self.config {
            repo.write_file(CONFIG_FILE, config);
        }

        repo.git(&["init", "-q"]);
        if !self.skip_commit {
            repo.commit_all("initial");
        }
        repo
    }
}

/// A repository living in a temporary directory
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.path().join("packages")
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join(CONFIG_FILE)
    }

    /// Write a file, creating parent directories
    pub fn write_file(&self, path: &str, content: &str) {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&full, content).expect("Failed to write file");
    }

    /// Create the files that make a directory an iFlow
    pub fn add_iflow(&self, package: &str, iflow: &str) {
        let base = format!("packages/{package}/{iflow}");
        self.write_file(
            &format!("{base}/META-INF/MANIFEST.MF"),
            &format!("Manifest-Version: 1.0\nBundle-SymbolicName: {iflow}\n"),
        );
        self.write_file(
            &format!("{base}/src/main/resources/scenarioflows/integrationflow/{iflow}.iflw"),
            "<bpmn2:definitions/>\n",
        );
    }

    /// Remove a file or directory
    pub fn remove(&self, path: &str) {
        let full = self.path().join(path);
        if full.is_dir() {
            fs::remove_dir_all(&full).expect("Failed to remove directory");
        } else {
            fs::remove_file(&full).expect("Failed to remove file");
        }
    }

    /// Stage everything and commit
    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "--allow-empty", "-m", message]);
    }

    /// Hash of the current HEAD commit
    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"]).trim().to_string()
    }

    /// Run git in the repository and return stdout, panicking on failure
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Configuration pointing at this repository with default settings
    pub fn tools_config(&self) -> ToolsConfig {
        ToolsConfig {
            repo_dir: self.path().to_path_buf(),
            packages_dir: self.packages_dir(),
            ..ToolsConfig::default()
        }
    }
}
