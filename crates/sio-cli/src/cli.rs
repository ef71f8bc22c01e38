use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sio_types::ShiftHandlingMode;

#[derive(Parser)]
#[command(
    name = "sio",
    about = "Spatial I/O: load, inspect and convert 3D spatial data files",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./sio.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the registered file formats
    Formats,
    /// Load files or directories and summarize their content
    Load(LoadArgs),
    /// Load a file and save it in another format
    Convert(ConvertArgs),
}

#[derive(Args)]
pub struct LoadArgs {
    /// Files or directories (walked recursively)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Input filter string, e.g. "ASCII cloud (*.txt *.asc *.xyz *.pts)"
    #[arg(long, default_value = "")]
    pub filter: String,
    /// Global shift policy (always-ask, ask-if-necessary, always-apply, never, apply-and-remember)
    #[arg(long)]
    pub shift_mode: Option<ShiftHandlingMode>,
}

#[derive(Args)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    #[arg(long, default_value = "")]
    pub input_filter: String,
    /// Output filter string; guessed from the output extension when omitted
    #[arg(long)]
    pub output_filter: Option<String>,
    #[arg(long)]
    pub shift_mode: Option<ShiftHandlingMode>,
}
