use clap::Parser;
use iflow_tools_cli::commands::sync::{self, SyncCli};
use iflow_tools_cli::error::exit_with;
use iflow_tools_cli::{logging, terminal};

#[tokio::main]
async fn main() {
    let cli = SyncCli::parse();
    let debug = cli.global.debug;

    logging::init(debug);
    terminal::configure_colors();

    exit_with(sync::execute(cli).await, debug)
}
