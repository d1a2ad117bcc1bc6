//! TlkForge CLI - Command-line interface for talk table tools

pub mod commands;
pub mod progress;

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use tracing_subscriber::EnvFilter;

use crate::config::{BitOrder, Endianness, TlkOptions};

#[derive(Parser)]
#[command(name = "tlkforge")]
#[command(about = "TlkForge: Mass Effect 2 talk table tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Codec options file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Integers are big-endian (console builds)
    #[arg(long, global = true)]
    big_endian: bool,

    /// Payload bits are packed from bit 0 of each byte
    #[arg(long, global = true)]
    lsb_first: bool,

    /// Prefix localizable strings with their id when encoding
    #[arg(long, global = true)]
    debug_ids: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Options file first, then flag overrides.
    fn options(&self) -> anyhow::Result<TlkOptions> {
        let mut options = match &self.config {
            Some(path) => TlkOptions::load(path)?,
            None => TlkOptions::default(),
        };
        if self.big_endian {
            options = options.with_byte_order(Endianness::Big);
        }
        if self.lsb_first {
            options = options.with_bit_order(BitOrder::LsbFirst);
        }
        if self.debug_ids {
            options = options.with_debug_ids(true);
        }
        Ok(options)
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the TlkForge CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    init_logging(cli.verbose);

    let options = cli.options()?;
    tracing::debug!("Codec options: {:?}", options);
    cli.command.execute(&options)?;

    Ok(())
}
