mod convert;
mod dump;

pub use convert::Convert;
pub use dump::Dump;

use clap::{ColorChoice, Parser, Subcommand};

/// Remux AVC video tracks from mp4 files into flv streams.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// When to output colored text.
    #[arg(long, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Raise log verbosity to debug.
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Convert(Convert),
    Dump(Dump),
}
