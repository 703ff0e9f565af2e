mod app;
mod cli;
mod runner;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    engine_logging::initialize(cli.log_destination());
    app::run(cli)
}
