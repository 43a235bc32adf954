//! Version-control state
//!
//! Runs the `git` binary to find out which files differ from a base ref and
//! maps them onto packages and iFlows.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

use crate::config::ToolsConfig;
use crate::error::{Error, Result};

/// Packages and iFlows touched by a set of changed paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    packages: BTreeMap<String, BTreeSet<String>>,
}

impl ChangeSet {
    /// Map repository-relative paths onto packages and iFlows
    ///
    /// `packages_rel` is the packages directory relative to the repository
    /// root. Paths outside it are ignored. A path directly inside a package
    /// directory marks the package without marking any iFlow.
    pub fn from_paths<I, P>(paths: I, packages_rel: &Path) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut packages: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for path in paths {
            let Ok(rest) = path.as_ref().strip_prefix(packages_rel) else {
                continue;
            };
            let parts: Vec<String> = rest
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();

            match parts.as_slice() {
                [package, iflow, _, ..] => {
                    packages
                        .entry(package.clone())
                        .or_default()
                        .insert(iflow.clone());
                }
                [package, _] => {
                    packages.entry(package.clone()).or_default();
                }
                _ => {}
            }
        }

        Self { packages }
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Ids of the touched packages, sorted
    pub fn package_ids(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Ids of the touched iFlows of one package
    pub fn iflow_ids(&self, package_id: &str) -> Option<&BTreeSet<String>> {
        self.packages.get(package_id)
    }
}

/// Top level of the work tree containing `dir`
pub async fn repo_root(dir: &Path) -> Result<PathBuf> {
    let output = run_git(dir, &["rev-parse", "--show-toplevel"]).await?;
    if !output.status.success() {
        return Err(Error::NotAGitRepository {
            path: dir.to_path_buf(),
        });
    }
    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(PathBuf::from(root))
}

/// Files that differ between `base` (HEAD when `None`) and the work tree
///
/// Covers commits since `base`, staged and unstaged edits, deletions and
/// untracked files not ignored by `.gitignore`. Paths are relative to the
/// repository root, deduplicated and sorted.
///
/// Without an explicit base, a repository with no commits yet reports every
/// tracked and untracked file.
pub async fn changed_paths(repo_root: &Path, base: Option<&str>) -> Result<Vec<PathBuf>> {
    let (tracked, compared_to) = if let Some(base) = base {
        verify_revision(repo_root, base).await?;
        (diff_paths(repo_root, base).await?, base)
    } else if revision_exists(repo_root, "HEAD").await? {
        (diff_paths(repo_root, "HEAD").await?, "HEAD")
    } else {
        log::debug!("{} has no commits yet", repo_root.display());
        let tracked = git_paths(repo_root, &["ls-files", "-z"], "ls-files").await?;
        (tracked, "an empty history")
    };

    let untracked = git_paths(
        repo_root,
        &["ls-files", "--others", "--exclude-standard", "-z"],
        "ls-files",
    )
    .await?;

    let paths: BTreeSet<PathBuf> = tracked.into_iter().chain(untracked).collect();
    log::debug!("{} path(s) changed relative to {compared_to}", paths.len());

    Ok(paths.into_iter().collect())
}

/// Change set of the configured repository relative to `base`
pub async fn detect_changes(config: &ToolsConfig, base: Option<&str>) -> Result<ChangeSet> {
    let root = repo_root(&config.repo_dir).await?;
    let root = canonical(&root)?;
    let packages_dir = canonical(&config.packages_dir)?;

    let packages_rel = packages_dir.strip_prefix(&root).map_err(|_| {
        Error::invalid_configuration(format!(
            "packages_dir {} is outside the repository {}",
            packages_dir.display(),
            root.display()
        ))
    })?;

    let paths = changed_paths(&root, base).await?;
    Ok(ChangeSet::from_paths(paths, packages_rel))
}

async fn verify_revision(repo_root: &Path, reference: &str) -> Result<()> {
    if revision_exists(repo_root, reference).await? {
        Ok(())
    } else {
        Err(Error::UnknownRevision {
            reference: reference.to_string(),
        })
    }
}

async fn revision_exists(repo_root: &Path, reference: &str) -> Result<bool> {
    let revision = format!("{reference}^{{commit}}");
    let output = run_git(repo_root, &["rev-parse", "--verify", "--quiet", &revision]).await?;
    Ok(output.status.success())
}

async fn diff_paths(repo_root: &Path, base: &str) -> Result<Vec<PathBuf>> {
    git_paths(
        repo_root,
        &["diff", "--name-only", "--no-renames", "-z", base, "--"],
        "diff",
    )
    .await
}

/// Run a git command printing NUL separated paths
async fn git_paths(repo_root: &Path, args: &[&str], command: &str) -> Result<Vec<PathBuf>> {
    let output = run_git(repo_root, args).await?;
    if !output.status.success() {
        return Err(Error::git(command, &output.stderr));
    }
    Ok(split_nul(&output.stdout).collect())
}

async fn run_git(dir: &Path, args: &[&str]) -> Result<Output> {
    log::debug!("Running git {} in {}", args.join(" "), dir.display());
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .map_err(|e| Error::io(dir, e))
}

fn canonical(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| Error::io(path, e))
}

fn split_nul(bytes: &[u8]) -> impl Iterator<Item = PathBuf> + '_ {
    bytes
        .split(|b| *b == 0)
        .filter(|part| !part.is_empty())
        .map(|part| PathBuf::from(String::from_utf8_lossy(part).into_owned()))
}
