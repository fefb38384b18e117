mod cmd;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cmd::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let res = match cli.command {
        Commands::Table(a) => a.run(),
        Commands::Selfcheck(a) => a.run(),
        Commands::Counter(a) => a.run(),
        Commands::Export(a) => a.run(),
    };
    if let Err(e) = res {
        error!("{e}");
        std::process::exit(1);
    }
}
