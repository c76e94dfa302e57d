use anyhow::Result;
use clap::Parser;

use pact_cli::cli::{Cli, Command};
use pact_cli::commands;
use pact_cli::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    let name = args.command.name();
    logging::init_subscriber(args.verbose, name);
    let log = Logger::new(name);

    match &args.command {
        Command::Apply(opts) => commands::apply::run(&args.global, opts, &log),
        Command::Sync(opts) => commands::sync::run(&args.global, opts, &log),
        Command::Unlink => commands::unlink::run(&args.global, &log),
        Command::Status(opts) => commands::status::run(&args.global, opts, &log),
        Command::Import(opts) => commands::import::run(&args.global, opts, &log),
        Command::Init => commands::init::run(&args.global, &log),
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
