//! Configuration model
//!
//! The on-disk format is YAML; loading and layering happen in the CLI crate.
//! This module owns the shape of the configuration and the rules for
//! anchoring relative paths.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::layout::PackageFilter;

/// Default linter binary
pub const DEFAULT_LINT_BINARY: &str = "cpilint";

/// Default tenant sync binary
pub const DEFAULT_SYNC_BINARY: &str = "flashpipe";

/// Complete tool configuration
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    /// Repository root, relative to the directory holding the config file
    pub repo_dir: PathBuf,
    /// Directory containing one sub-directory per package, relative to `repo_dir`
    pub packages_dir: PathBuf,
    /// Ref that "changed" commands compare against (HEAD when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_ref: Option<String>,
    /// Maximum number of jobs running at once, 0 for unbounded
    pub max_parallel: usize,
    pub packages: PackageSelection,
    pub lint: LintConfig,
    pub sync: SyncConfig,
}

/// Glob patterns selecting package ids
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PackageSelection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Governance linter settings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LintConfig {
    pub binary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<PathBuf>,
    pub extra_args: Vec<String>,
}

/// Tenant synchronization settings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    pub binary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_config: Option<PathBuf>,
    pub extra_args: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            repo_dir: PathBuf::from("."),
            packages_dir: PathBuf::from("packages"),
            base_ref: None,
            max_parallel: 0,
            packages: PackageSelection::default(),
            lint: LintConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_LINT_BINARY.to_string(),
            rules: None,
            extra_args: Vec::new(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_SYNC_BINARY.to_string(),
            tenant_config: None,
            extra_args: Vec::new(),
        }
    }
}

impl ToolsConfig {
    /// Anchor every relative path and validate the result
    ///
    /// `repo_dir` is resolved against `config_dir`; `packages_dir`, the rules
    /// file, the tenant config and binaries given as relative paths are
    /// resolved against the resulting `repo_dir`.
    pub fn resolve(mut self, config_dir: &Path) -> Result<Self> {
        self.repo_dir = anchor(config_dir, &self.repo_dir);
        self.packages_dir = anchor(&self.repo_dir, &self.packages_dir);
        self.lint.rules = self.lint.rules.map(|p| anchor(&self.repo_dir, &p));
        self.sync.tenant_config = self
            .sync
            .tenant_config
            .map(|p| anchor(&self.repo_dir, &p));
        self.lint.binary = resolve_binary(&self.repo_dir, &self.lint.binary, "lint.binary")?;
        self.sync.binary = resolve_binary(&self.repo_dir, &self.sync.binary, "sync.binary")?;

        // Compile once so bad patterns fail before any work starts
        self.package_filter()?;

        Ok(self)
    }

    /// Build the package filter from the include/exclude patterns
    pub fn package_filter(&self) -> Result<PackageFilter> {
        PackageFilter::new(&self.packages.include, &self.packages.exclude)
    }

    /// Rules file for the linter, required by every lint run
    pub fn lint_rules(&self) -> Result<&Path> {
        self.lint
            .rules
            .as_deref()
            .ok_or_else(|| Error::missing_key("lint.rules"))
    }

    /// Tenant configuration handed to the sync tool
    pub fn tenant_config(&self) -> Result<&Path> {
        self.sync
            .tenant_config
            .as_deref()
            .ok_or_else(|| Error::missing_key("sync.tenant_config"))
    }
}

/// Join `path` onto `base` unless it is already absolute, dropping `.` parts
fn anchor(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Bare names are looked up on PATH; anything with a separator is a path
fn resolve_binary(repo_dir: &Path, binary: &str, key: &str) -> Result<String> {
    let binary = binary.trim();
    if binary.is_empty() {
        return Err(Error::invalid_configuration(format!(
            "{key} must not be empty"
        )));
    }
    if binary.contains('/') || binary.contains(std::path::MAIN_SEPARATOR) {
        Ok(anchor(repo_dir, Path::new(binary)).display().to_string())
    } else {
        Ok(binary.to_string())
    }
}
