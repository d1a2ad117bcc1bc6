//! Codec options and `tlkforge.toml` loading

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tool version written into the XML root attribute.
pub const TOOL_VERSION: &str = "1.0.4";

fn default_tool_version() -> String {
    TOOL_VERSION.to_string()
}

/// Byte order of every fixed-width integer in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endianness {
    /// PC builds
    #[default]
    Little,
    /// Xbox 360 builds
    Big,
}

/// Order in which payload bits are taken out of each byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// Bit 7 of a byte is read first.
    #[default]
    MsbFirst,
    /// Bit 0 of a byte is read first (the packing shipped game files use).
    LsbFirst,
}

/// Options shared by the decode and encode pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlkOptions {
    pub byte_order: Endianness,
    pub bit_order: BitOrder,
    /// Written as `TLKToolVersion` on the XML root.
    #[serde(default = "default_tool_version")]
    pub tool_version: String,
    /// Prefix localizable strings with `(#id) ` when encoding.
    pub debug_ids: bool,
}

impl Default for TlkOptions {
    fn default() -> Self {
        Self {
            byte_order: Endianness::default(),
            bit_order: BitOrder::default(),
            tool_version: default_tool_version(),
            debug_ids: false,
        }
    }
}

impl TlkOptions {
    /// Load options from a TOML file
    ///
    /// # Errors
    /// Returns [`Error::Io`](crate::Error::Io) if the file cannot be read and
    /// [`Error::ConfigError`](crate::Error::ConfigError) if it is not valid TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let options = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded options from {:?}: {:?}", path.as_ref(), options);
        Ok(options)
    }

    /// Parse options from TOML text
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`](crate::Error::ConfigError) on invalid TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    #[must_use]
    pub fn with_byte_order(mut self, byte_order: Endianness) -> Self {
        self.byte_order = byte_order;
        self
    }

    #[must_use]
    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    #[must_use]
    pub fn with_debug_ids(mut self, debug_ids: bool) -> Self {
        self.debug_ids = debug_ids;
        self
    }
}
