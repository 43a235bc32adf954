//! Repository layout
//!
//! A repository keeps one directory per package below the packages
//! directory, and one directory per iFlow inside each package:
//!
//! ```text
//! packages/
//!   Orders/
//!     OrderCreate/META-INF/MANIFEST.MF
//!     OrderCancel/META-INF/MANIFEST.MF
//! ```

mod filter;
mod walker;

pub use filter::PackageFilter;
pub use walker::{IFLOW_MANIFEST, discover_iflows, discover_packages};

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::ToolsConfig;
use crate::error::{Error, Result};
use crate::git::ChangeSet;

/// A package directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub id: String,
    pub path: PathBuf,
    pub iflows: Vec<IFlow>,
}

/// An iFlow directory inside a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IFlow {
    pub id: String,
    pub package_id: String,
    pub path: PathBuf,
}

/// Packages discovered in a repository
#[derive(Debug, Clone)]
pub struct Layout {
    packages_dir: PathBuf,
    packages: Vec<Package>,
}

impl Layout {
    /// Scan the packages directory named by the configuration
    pub fn discover(config: &ToolsConfig) -> Result<Self> {
        let filter = config.package_filter()?;
        let packages = discover_packages(&config.packages_dir, &filter)?;
        log::debug!(
            "Discovered {} package(s) in {}",
            packages.len(),
            config.packages_dir.display()
        );
        Ok(Self {
            packages_dir: config.packages_dir.clone(),
            packages,
        })
    }

    pub fn packages_dir(&self) -> &Path {
        &self.packages_dir
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Look up a package by id
    pub fn find(&self, id: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.id == id)
    }

    /// Every iFlow of every package
    pub fn iflows(&self) -> impl Iterator<Item = &IFlow> {
        self.packages.iter().flat_map(|p| p.iflows.iter())
    }

    /// Resolve package ids given by the user, failing on the first unknown id
    ///
    /// Repeated ids are selected once, at their first position.
    pub fn select(&self, ids: &[String]) -> Result<Vec<&Package>> {
        let mut selected: Vec<&Package> = Vec::with_capacity(ids.len());
        for id in ids {
            let package = self.find(id).ok_or_else(|| Error::UnknownPackage {
                id: id.clone(),
                known: self.packages.iter().map(|p| p.id.clone()).collect(),
            })?;
            if !selected.iter().any(|p| p.id == package.id) {
                selected.push(package);
            }
        }
        Ok(selected)
    }

    /// Packages touched by a change set
    ///
    /// Packages that only appear through deleted paths are dropped.
    pub fn changed_packages(&self, changes: &ChangeSet) -> Vec<&Package> {
        changes
            .package_ids()
            .filter_map(|id| {
                let package = self.find(id);
                if package.is_none() {
                    self.report_missing(id);
                }
                package
            })
            .collect()
    }

    /// iFlows touched by a change set
    ///
    /// Changed directories that are not (or no longer) iFlows are dropped.
    pub fn changed_iflows(&self, changes: &ChangeSet) -> Vec<&IFlow> {
        let mut iflows = Vec::new();
        for package in self.changed_packages(changes) {
            let Some(ids) = changes.iflow_ids(&package.id) else {
                continue;
            };
            for id in ids {
                match package.iflows.iter().find(|iflow| &iflow.id == id) {
                    Some(iflow) => iflows.push(iflow),
                    None if !package.path.join(id).exists() => {
                        log::warn!("Changed iFlow {}/{id} no longer exists, skipping", package.id);
                    }
                    None => log::debug!("{}/{id} is not an iFlow, skipping", package.id),
                }
            }
        }
        iflows
    }

    fn report_missing(&self, id: &str) {
        if self.packages_dir.join(id).is_dir() {
            log::debug!("Changed package {id} is excluded by the package filter");
        } else {
            log::warn!("Changed package {id} no longer exists, skipping");
        }
    }
}
