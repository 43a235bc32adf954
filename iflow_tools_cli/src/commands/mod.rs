//! Sub-commands of both binaries
//!
//! `lint` and `sync` hold the tool-specific command sets; this module holds
//! what they share: global options, config loading, the `config` and `list`
//! commands, and running or printing a set of jobs.

pub mod lint;
pub mod sync;

use clap::{Args, Subcommand};
use iflow_tools_core::git::{self, ChangeSet};
use iflow_tools_core::{Job, Layout, ParallelRunner, ToolsConfig};
use std::path::PathBuf;

use crate::config::ConfigManager;
use crate::error::{CliError, CliResult};
use crate::output;

/// Options accepted by every sub-command
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Configuration file (YAML)
    #[arg(short, long, global = true, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Print the tool invocations instead of running them
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Maximum number of tool invocations running at once (0 = no limit)
    #[arg(short, long, global = true, value_name = "N")]
    pub jobs: Option<usize>,
}

/// Inspect the configuration
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the path of the configuration file in use
    Path,

    /// Print the resolved configuration as JSON
    Show,
}

/// Loaded configuration plus the options of this invocation
pub struct Session {
    pub manager: ConfigManager,
    pub config: ToolsConfig,
    pub dry_run: bool,
    pub max_parallel: usize,
}

impl Session {
    /// Locate and load the configuration
    pub fn load(global: &GlobalArgs) -> CliResult<Self> {
        let manager = ConfigManager::locate(global.config.as_deref())?;
        let config = manager.load_resolved()?;
        let max_parallel = global.jobs.unwrap_or(config.max_parallel);

        Ok(Self {
            manager,
            config,
            dry_run: global.dry_run,
            max_parallel,
        })
    }

    /// Discover the packages of the configured repository
    pub fn layout(&self) -> CliResult<Layout> {
        Ok(Layout::discover(&self.config)?)
    }

    /// Changes relative to `base`, falling back to the configured base ref
    pub async fn changes(&self, base: Option<&str>) -> CliResult<ChangeSet> {
        let base = base.or(self.config.base_ref.as_deref());
        Ok(git::detect_changes(&self.config, base).await?)
    }

    /// Run the jobs (or print them on a dry run) and fail if any job failed
    pub async fn execute(&self, jobs: Vec<Job>) -> CliResult<()> {
        if self.dry_run {
            output::print_plan(&jobs);
            return Ok(());
        }

        let runner = ParallelRunner::new(self.max_parallel);
        let report = runner.run_with(jobs, output::print_job_outcome).await;
        output::print_summary(&report);

        if report.is_success() {
            Ok(())
        } else {
            Err(CliError::tool_failure(&format!(
                "{} of {} job(s) failed",
                report.failed(),
                report.outcomes.len()
            )))
        }
    }
}

/// `config path` / `config show`
pub fn config_command(session: &Session, command: ConfigCommand) -> CliResult<()> {
    match command {
        ConfigCommand::Path => {
            println!("{}", session.manager.get_config_path().display());
        }
        ConfigCommand::Show => {
            output::print_json(&session.config)?;
        }
    }
    Ok(())
}

/// `list [--json]`
pub fn list_command(session: &Session, json: bool) -> CliResult<()> {
    let layout = session.layout()?;
    output::print_packages(layout.packages(), json)?;
    Ok(())
}

/// Write a completion script for the binary described by `C`
pub fn generate_completions<C: clap::CommandFactory>(shell: clap_complete::Shell) {
    let mut cmd = C::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
