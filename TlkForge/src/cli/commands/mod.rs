use clap::Subcommand;
use std::path::PathBuf;

use crate::config::TlkOptions;

pub mod convert;
pub mod info;

#[derive(Subcommand)]
pub enum Commands {
    /// Convert between TLK and XML
    Convert {
        /// Source file
        #[arg(short, long)]
        source: PathBuf,

        /// Destination file
        #[arg(short, long)]
        destination: PathBuf,

        /// Input format (auto-detected from extension if not specified)
        #[arg(short = 'i', long)]
        input_format: Option<String>,

        /// Output format (auto-detected from extension if not specified)
        #[arg(short = 'o', long)]
        output_format: Option<String>,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show header fields and string statistics
    Info {
        /// TLK or XML file
        path: PathBuf,
    },
}

impl Commands {
    pub fn execute(&self, options: &TlkOptions) -> anyhow::Result<()> {
        match self {
            Commands::Convert {
                source,
                destination,
                input_format,
                output_format,
                quiet,
            } => convert::execute(
                source,
                destination,
                input_format.as_deref(),
                output_format.as_deref(),
                options,
                !*quiet,
            ),
            Commands::Info { path } => info::execute(path, options),
        }
    }
}
