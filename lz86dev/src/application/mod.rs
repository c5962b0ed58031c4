pub mod handlers;

use crate::presentation::cli::{Cli, Commands, ModeArg};
use handlers::Surface;
use lz86_core::Mode;
use lz86_core::error::Result;

pub fn run(cli: Cli) -> Result<()> {
    let surface = Surface {
        quiet: cli.quiet,
        json: cli.json,
        interactive: cli.interactive,
    };
    match cli.command {
        Commands::Compress {
            input,
            output,
            codec,
        } => handlers::handle_job(
            Some(input),
            output,
            Some(Mode::Compress),
            codec,
            &surface,
        ),
        Commands::Decompress {
            input,
            output,
            codec,
        } => handlers::handle_job(
            Some(input),
            output,
            Some(Mode::Decompress),
            codec,
            &surface,
        ),
        Commands::Run {
            input,
            output,
            mode,
            codec,
        } => handlers::handle_job(input, output, mode.map(Mode::from), codec, &surface),
        Commands::Size { container } => handlers::handle_size(container, &surface),
        Commands::Info { container } => handlers::handle_info(container, &surface),
    }
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Compress => Mode::Compress,
            ModeArg::Decompress => Mode::Decompress,
        }
    }
}
