mod application;

mod presentation {
    pub mod cli;
}

use std::process::ExitCode;

use clap::Parser;
use lz86_core::Lz86Error;
use tracing_subscriber::EnvFilter;

use crate::presentation::cli::Cli;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "warn,lz86_core=info,lz86dev=info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match application::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Lz86Error::Cancelled) => {
            eprintln!("lz86dev: stopped");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("lz86dev: {e}");
            ExitCode::FAILURE
        }
    }
}
