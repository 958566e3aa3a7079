use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use devsetup_cli::cli;
use devsetup_cli::commands;
use devsetup_cli::logging;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);
    let log = Arc::new(logging::Logger::new(args.verbose));

    match args.command {
        cli::Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        cli::Command::Plugin { action } => commands::plugin::run(&args.global, &action, &log),
        cli::Command::Version => {
            let version = option_env!("DEVSETUP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("devsetup {version}");
            Ok(())
        }
    }
}
