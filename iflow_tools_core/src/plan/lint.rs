//! Governance linter (CPILint) invocations

use std::path::Path;

use crate::config::ToolsConfig;
use crate::error::Result;
use crate::invocation::{Invocation, Job};
use crate::layout::Package;

/// Plans one linter run per package
#[derive(Debug)]
pub struct LintPlanner<'a> {
    config: &'a ToolsConfig,
    rules: &'a Path,
}

impl<'a> LintPlanner<'a> {
    /// Fails when `lint.rules` is not configured
    pub fn new(config: &'a ToolsConfig) -> Result<Self> {
        let rules = config.lint_rules()?;
        Ok(Self { config, rules })
    }

    /// `cpilint -rules <rules> -directory <package> [extra args]`
    pub fn package_job(&self, package: &Package) -> Job {
        let invocation = Invocation::new(&self.config.lint.binary, &self.config.repo_dir)
            .path_flag("-rules", self.rules)
            .path_flag("-directory", &package.path)
            .args(self.config.lint.extra_args.iter().cloned());
        Job::single(&package.id, invocation)
    }

    pub fn plan<'p, I>(&self, packages: I) -> Vec<Job>
    where
        I: IntoIterator<Item = &'p Package>,
    {
        packages.into_iter().map(|p| self.package_job(p)).collect()
    }
}
