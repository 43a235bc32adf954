//! `iflow-lint`: governance linting of packages with CPILint

use clap::{Parser, Subcommand};
use colored::*;
use iflow_tools_core::LintPlanner;

use super::{ConfigCommand, GlobalArgs, Session, config_command, generate_completions, list_command};
use crate::error::CliResult;

#[derive(Debug, Parser)]
#[command(name = "iflow-lint")]
#[command(version, about = "Run the CPILint governance linter over integration packages", long_about = None)]
pub struct LintCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: LintCommand,
}

#[derive(Debug, Subcommand)]
pub enum LintCommand {
    /// Lint every package
    All,

    /// Lint packages with changes relative to a base ref
    Changed {
        /// Ref to compare against (default: base_ref from config, else HEAD)
        #[arg(short, long, value_name = "REF")]
        base: Option<String>,
    },

    /// Lint the named packages
    Package {
        /// Package ids
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },

    /// List packages and their iFlows
    List {
        /// Print JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Run a parsed `iflow-lint` command line
pub async fn execute(cli: LintCli) -> CliResult<()> {
    if let LintCommand::Completions { shell } = cli.command {
        generate_completions::<LintCli>(shell);
        return Ok(());
    }

    let session = Session::load(&cli.global)?;

    match cli.command {
        LintCommand::All => {
            let layout = session.layout()?;
            let planner = LintPlanner::new(&session.config)?;
            let jobs = planner.plan(layout.packages());
            if jobs.is_empty() {
                eprintln!("{}", "No packages to lint".yellow());
                return Ok(());
            }
            session.execute(jobs).await
        }
        LintCommand::Changed { base } => {
            let planner = LintPlanner::new(&session.config)?;
            let layout = session.layout()?;
            let changes = session.changes(base.as_deref()).await?;
            let packages = layout.changed_packages(&changes);
            log::debug!("{} changed package(s)", packages.len());
            if packages.is_empty() {
                eprintln!("{}", "No changed packages to lint".yellow());
                return Ok(());
            }
            session.execute(planner.plan(packages)).await
        }
        LintCommand::Package { ids } => {
            let planner = LintPlanner::new(&session.config)?;
            let layout = session.layout()?;
            let packages = layout.select(&ids)?;
            session.execute(planner.plan(packages)).await
        }
        LintCommand::List { json } => list_command(&session, json),
        LintCommand::Config { command } => config_command(&session, command),
        LintCommand::Completions { .. } => Ok(()),
    }
}
