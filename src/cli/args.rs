//! Command-line definition for the `zlits` binary.
//!
//! Global flags (`-v`, `-q`, `-T#`, `-r`) apply to every subcommand. Flags
//! take precedence over the `ZLITS_*` environment defaults read in
//! [`crate::cli::op_mode`].

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "zlits",
    version,
    about = "Walk Zstandard frames, inspect their literals and recompress them"
)]
pub struct Cli {
    /// Increase verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Worker threads; 0 = one per core
    #[arg(short = 'T', long = "threads", global = true, value_name = "N")]
    pub threads: Option<usize>,

    /// Expand directories recursively
    #[arg(short, long, global = true)]
    pub recursive: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every block of every frame
    Blocks {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the literals section of every Compressed block
    Literals {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Recompress extracted literals and compare sizes
    Recompress {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Hint that literals are unlikely to compress
        #[arg(long)]
        suspect_uncompressible: bool,
    },
    /// Time literals decoding and recompression
    Bench {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Passes over the data set
        #[arg(short = 'i', long, default_value_t = 3)]
        iters: u32,
    },
    /// Print table sizing probes and CPU capability
    Probe,
}

impl Cli {
    /// Display level after applying `-v`/`-q` to `base`.
    pub fn display_level(&self, base: u32) -> u32 {
        (base + u32::from(self.verbose)).saturating_sub(u32::from(self.quiet))
    }

    /// Input paths of the selected subcommand.
    pub fn files(&self) -> &[PathBuf] {
        match &self.command {
            Command::Blocks { files }
            | Command::Literals { files }
            | Command::Recompress { files, .. }
            | Command::Bench { files, .. } => files,
            Command::Probe => &[],
        }
    }
}
