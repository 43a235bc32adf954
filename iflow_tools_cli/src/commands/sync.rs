//! `iflow-sync`: tenant synchronization with flashpipe

use clap::{Parser, Subcommand};
use colored::*;
use iflow_tools_core::SyncPlanner;

use super::{ConfigCommand, GlobalArgs, Session, config_command, generate_completions, list_command};
use crate::error::CliResult;

#[derive(Debug, Parser)]
#[command(name = "iflow-sync")]
#[command(version, about = "Synchronize integration packages with a tenant using flashpipe", long_about = None)]
pub struct SyncCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: SyncCommand,
}

#[derive(Debug, Subcommand)]
pub enum SyncCommand {
    /// Download every package from the tenant into the repository
    Pull {
        /// Only pull these packages
        #[arg(value_name = "ID")]
        ids: Vec<String>,
    },

    /// Upload and deploy changed iFlows to the tenant
    Deploy {
        /// Ref to compare against (default: base_ref from config, else HEAD)
        #[arg(short, long, value_name = "REF", conflicts_with = "all")]
        base: Option<String>,

        /// Deploy every iFlow, changed or not
        #[arg(long)]
        all: bool,
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

/// Run a parsed `iflow-sync` command line
pub async fn execute(cli: SyncCli) -> CliResult<()> {
    if let SyncCommand::Completions { shell } = cli.command {
        generate_completions::<SyncCli>(shell);
        return Ok(());
    }

    let session = Session::load(&cli.global)?;

    match cli.command {
        SyncCommand::Pull { ids } => {
            let planner = SyncPlanner::new(&session.config)?;
            let layout = session.layout()?;
            let packages = if ids.is_empty() {
                layout.packages().iter().collect()
            } else {
                layout.select(&ids)?
            };
            if packages.is_empty() {
                eprintln!("{}", "No packages to pull".yellow());
                return Ok(());
            }
            session.execute(planner.plan_pull(packages)).await
        }
        SyncCommand::Deploy { base, all } => {
            let planner = SyncPlanner::new(&session.config)?;
            let layout = session.layout()?;
            let iflows = if all {
                layout.iflows().collect::<Vec<_>>()
            } else {
                let changes = session.changes(base.as_deref()).await?;
                layout.changed_iflows(&changes)
            };
            log::debug!("{} iFlow(s) to deploy", iflows.len());
            if iflows.is_empty() {
                let message = if all {
                    "No iFlows to deploy"
                } else {
                    "No changed iFlows to deploy"
                };
                eprintln!("{}", message.yellow());
                return Ok(());
            }
            session.execute(planner.plan_deploy(iflows)).await
        }
        SyncCommand::List { json } => list_command(&session, json),
        SyncCommand::Config { command } => config_command(&session, command),
        SyncCommand::Completions { .. } => Ok(()),
    }
}
