//! Directory walker for package and iFlow discovery

use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use super::{IFlow, Package, filter::PackageFilter};
use crate::error::{Error, Result};

/// Marker file every iFlow directory carries
pub const IFLOW_MANIFEST: &str = "META-INF/MANIFEST.MF";

/// Discover the packages directly below `packages_dir`
///
/// Hidden directories and packages rejected by `filter` are skipped.
/// Results are sorted by package id.
pub fn discover_packages(packages_dir: &Path, filter: &PackageFilter) -> Result<Vec<Package>> {
    if !packages_dir.is_dir() {
        return Err(Error::PackagesDirNotFound {
            path: packages_dir.to_path_buf(),
        });
    }

    let mut packages = Vec::new();
    for entry in child_dirs(packages_dir) {
        let entry = entry?;
        let id = entry_name(&entry);

        if !filter.should_include(&id) {
            log::debug!("Package {id} excluded by filter");
            continue;
        }

        let iflows = discover_iflows(entry.path(), &id)?;
        log::debug!("Discovered package {id} with {} iFlow(s)", iflows.len());
        packages.push(Package {
            id,
            path: entry.path().to_path_buf(),
            iflows,
        });
    }

    Ok(packages)
}

/// Discover the iFlows directly below a package directory
pub fn discover_iflows(package_dir: &Path, package_id: &str) -> Result<Vec<IFlow>> {
    let mut iflows = Vec::new();
    for entry in child_dirs(package_dir) {
        let entry = entry?;
        if !entry.path().join(IFLOW_MANIFEST).is_file() {
            continue;
        }
        iflows.push(IFlow {
            id: entry_name(&entry),
            package_id: package_id.to_string(),
            path: entry.path().to_path_buf(),
        });
    }
    Ok(iflows)
}

/// Non-hidden child directories of `dir`, sorted by name
fn child_dirs(dir: &Path) -> impl Iterator<Item = Result<DirEntry>> {
    let root = dir.to_path_buf();
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => Some(Ok(entry)),
            Ok(_) => None,
            Err(e) => {
                let path = e.path().unwrap_or(&root).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                Some(Err(Error::io(&path, source)))
            }
        })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}
