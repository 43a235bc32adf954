use clap::Parser;
use iflow_tools_cli::commands::lint::{self, LintCli};
use iflow_tools_cli::error::exit_with;
use iflow_tools_cli::{logging, terminal};

#[tokio::main]
async fn main() {
    let cli = LintCli::parse();
    let debug = cli.global.debug;

    logging::init(debug);
    terminal::configure_colors();

    exit_with(lint::execute(cli).await, debug)
}
