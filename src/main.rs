use clap::Parser;
use std::process::ExitCode;

use frostglass::{cli, logger};

fn main() -> ExitCode {
    // Initialize session log (overwrites previous session log)
    logger::init();

    let args = cli::CliArgs::parse();
    logger::set_echo(args.verbose);
    cli::run(args)
}
