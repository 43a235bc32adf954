//! Tenant synchronization (flashpipe) invocations

use std::path::Path;

use crate::config::ToolsConfig;
use crate::error::Result;
use crate::invocation::{Invocation, Job};
use crate::layout::{IFlow, Package};

/// Plans pulls of packages from the tenant and deployments of iFlows to it
#[derive(Debug)]
pub struct SyncPlanner<'a> {
    config: &'a ToolsConfig,
    tenant_config: &'a Path,
}

impl<'a> SyncPlanner<'a> {
    /// Fails when `sync.tenant_config` is not configured
    pub fn new(config: &'a ToolsConfig) -> Result<Self> {
        let tenant_config = config.tenant_config()?;
        Ok(Self {
            config,
            tenant_config,
        })
    }

    /// Download a package from the tenant into its directory
    pub fn pull_job(&self, package: &Package) -> Job {
        let invocation = self
            .command(&["sync"])
            .flag("--package-id", &package.id)
            .path_flag("--dir-git-repo", &self.config.repo_dir)
            .path_flag("--dir-artifacts", &package.path)
            .flag("--target", "git")
            .args(self.extra_args());
        Job::single(&package.id, invocation)
    }

    /// Upload an iFlow, then deploy it; deployment only runs after a good upload
    pub fn deploy_job(&self, iflow: &IFlow) -> Job {
        let update = self
            .command(&["update", "artifact"])
            .flag("--artifact-id", &iflow.id)
            .flag("--package-id", &iflow.package_id)
            .path_flag("--dir-artifact", &iflow.path)
            .args(self.extra_args());
        let deploy = self
            .command(&["deploy"])
            .flag("--artifact-ids", &iflow.id)
            .args(self.extra_args());

        Job::new(format!("{}/{}", iflow.package_id, iflow.id))
            .then(update)
            .then(deploy)
    }

    pub fn plan_pull<'p, I>(&self, packages: I) -> Vec<Job>
    where
        I: IntoIterator<Item = &'p Package>,
    {
        packages.into_iter().map(|p| self.pull_job(p)).collect()
    }

    pub fn plan_deploy<'f, I>(&self, iflows: I) -> Vec<Job>
    where
        I: IntoIterator<Item = &'f IFlow>,
    {
        iflows.into_iter().map(|f| self.deploy_job(f)).collect()
    }

    /// `<binary> <subcommand...> --config <tenant_config>`
    fn command(&self, subcommand: &[&str]) -> Invocation {
        Invocation::new(&self.config.sync.binary, &self.config.repo_dir)
            .args(subcommand.iter().copied())
            .path_flag("--config", self.tenant_config)
    }

    fn extra_args(&self) -> impl Iterator<Item = String> + '_ {
        self.config.sync.extra_args.iter().cloned()
    }
}
