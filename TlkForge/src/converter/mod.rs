//! Format conversion utilities
//!
//! This module handles conversions between the binary talk table and its
//! editable text form:
//! - TLK (binary) ↔ XML (text table)

pub mod tlk;

use std::path::Path;

// Re-export TLK conversions
pub use tlk::{
    convert_tlk_to_xml, convert_tlk_to_xml_with_progress, convert_xml_to_tlk,
    convert_xml_to_tlk_with_progress, tlk_from_xml, tlk_to_xml_string,
    tlk_to_xml_string_with_sections,
};

// ============================================================================
// Progress Types
// ============================================================================

/// Progress callback type for conversion operations
pub type ConvertProgressCallback<'a> = &'a dyn Fn(&ConvertProgress);

/// Progress information during a file conversion
#[derive(Debug, Clone)]
pub struct ConvertProgress {
    /// Current operation phase
    pub phase: ConvertPhase,
    /// Current step (1-indexed), or percent within [`ConvertPhase::Decoding`]
    /// and [`ConvertPhase::Encoding`]
    pub current: usize,
    /// Total number of steps
    pub total: usize,
    /// Description of the current step (if applicable)
    pub current_file: Option<String>,
}

impl ConvertProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: ConvertPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with a step description
    #[must_use]
    pub fn with_file(
        phase: ConvertPhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertPhase {
    /// Reading the source file
    ReadingSource,
    /// Parsing the XML text table
    Parsing,
    /// Per-entry Huffman decoding
    Decoding,
    /// Per-entry Huffman encoding
    Encoding,
    /// Building the output document
    Converting,
    /// Writing the destination file
    WritingOutput,
    /// Operation complete
    Complete,
}

impl ConvertPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadingSource => "Reading source",
            Self::Parsing => "Parsing",
            Self::Decoding => "Decoding strings",
            Self::Encoding => "Encoding strings",
            Self::Converting => "Converting",
            Self::WritingOutput => "Writing output",
            Self::Complete => "Complete",
        }
    }
}

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Binary talk table
    Tlk,
    /// XML text table
    Xml,
}

impl FileFormat {
    /// Match a file extension (case-insensitive, without the dot)
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "tlk" => Some(Self::Tlk),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    /// Detect the format of a path from its extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Tlk => "tlk",
            Self::Xml => "xml",
        }
    }
}
