use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "lz86dev: single-file LZMA compressor", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// No progress line on stderr
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Print the job report as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Read single-key commands from stdin: p = pause/resume, s = stop, h = hide/show
    #[arg(long, global = true)]
    pub interactive: bool,

    /// More logging (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Args, Clone, Debug)]
pub struct CodecArgs {
    /// Compression level 0..=9
    #[arg(long, default_value_t = 7)]
    pub level: u32,

    /// Dictionary size in bytes (power of two, >= 4096)
    #[arg(long = "dict-size", default_value_t = 1 << 16)]
    pub dict_size: u32,

    /// File name suffix for compressed files (without the dot)
    #[arg(long, default_value = "lzma")]
    pub suffix: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Compress,
    Decompress,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress a file (default output: <input>.<suffix>)
    Compress {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Decompress a file (default output: input without its suffix)
    Decompress {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Compress or decompress, inferring the direction from the file names
    Run {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Print the original size stored in a compressed file's header
    Size { container: PathBuf },

    /// Show the header fields of a compressed file
    Info { container: PathBuf },
}
