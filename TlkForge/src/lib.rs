//! # TlkForge
//!
//! A pure-Rust library for Mass Effect 2 talk tables (`.tlk`).
//!
//! ## Supported Formats
//!
//! - **TLK** - Binary string tables with per-file Huffman compression
//! - **XML** - Human-readable text table for editing
//!
//! ## Quick Start
//!
//! ### Decoding and Encoding
//!
//! ```no_run
//! use tlkforge::prelude::*;
//!
//! let options = TlkOptions::default();
//! let parsed = read_tlk("BIOGame_INT.tlk", &options)?;
//! println!("Found {} strings", parsed.table.len());
//!
//! let mut table = parsed.table;
//! table.update_text(0, "Edited");
//! write_tlk("BIOGame_INT.edited.tlk", &table, &options)?;
//! # Ok::<(), tlkforge::Error>(())
//! ```
//!
//! ### Converting to XML
//!
//! ```no_run
//! use tlkforge::TlkOptions;
//! use tlkforge::converter::{convert_tlk_to_xml, convert_xml_to_tlk};
//!
//! let options = TlkOptions::default();
//! convert_tlk_to_xml("BIOGame_INT.tlk", "BIOGame_INT.xml", &options)?;
//! convert_xml_to_tlk("BIOGame_INT.xml", "BIOGame_INT.tlk", &options)?;
//! # Ok::<(), tlkforge::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `tlkforge` command-line binary

pub mod config;
pub mod converter;
pub mod error;
pub mod formats;

// Re-exports for convenience
pub use config::TlkOptions;
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{BitOrder, Endianness, TlkOptions};
    pub use crate::error::{Error, Result};
    pub use crate::formats::tlk::{
        ParsedTlk, StringData, StringTable, TlkHeader, TlkString, decode_tlk, encode_tlk,
        read_tlk, write_tlk,
    };

    pub use crate::converter;
    pub use crate::converter::{ConvertPhase, ConvertProgress, FileFormat};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
