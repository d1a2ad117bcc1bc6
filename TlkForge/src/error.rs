//! Error types for `TlkForge`

use thiserror::Error;

/// The error type for `TlkForge` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== TLK Format Errors ====================
    /// The file is not a TLK file (magic mismatch).
    #[error("invalid TLK magic: expected 0x006B6C54, found {found:#010X}")]
    InvalidTlkMagic {
        /// The magic value read from the file.
        found: i32,
    },

    /// The file is a TLK file written for the other byte order.
    #[error("TLK file is from another platform (magic {found:#010X}); try the opposite byte order")]
    WrongPlatform {
        /// The byte-swapped magic value read from the file.
        found: i32,
    },

    /// A section declares more data than the buffer holds, or a negative count.
    #[error("truncated TLK {section}: needs {needed} bytes, {available} available")]
    TruncatedTlk {
        /// The section being read (header, entries, tree, payload).
        section: &'static str,
        /// Bytes required by the declared counts.
        needed: u64,
        /// Bytes actually present.
        available: u64,
    },

    /// A bit index was read outside the payload.
    #[error("bit index {index} out of range (payload holds {len} bits)")]
    BitIndexOutOfRange {
        /// The requested bit index.
        index: usize,
        /// Number of bits in the stream.
        len: usize,
    },

    /// A Huffman child reference points outside the node table.
    #[error("Huffman tree references node {node}, but only {count} nodes exist")]
    InvalidTreeNode {
        /// The referenced node id.
        node: i32,
        /// Number of nodes in the table.
        count: usize,
    },

    // ==================== Encoding Errors ====================
    /// Text submitted for encoding contains the reserved NUL terminator.
    #[error("string {id} at position {position} contains an embedded NUL character")]
    NulInText {
        /// String id of the offending entry.
        id: i32,
        /// Position of the offending entry.
        position: usize,
    },

    /// A string id occurs more often than the two entry tables allow.
    #[error("string id {id} occurs more than twice (male and female tables are both taken)")]
    DuplicateStringId {
        /// The repeated string id.
        id: i32,
    },

    /// The encoded payload does not fit the format's 32-bit bit offsets.
    #[error("encoded payload of {bits} bits exceeds the 32-bit offset range")]
    PayloadTooLarge {
        /// Number of bits written when the limit was hit.
        bits: usize,
    },

    /// A literal (negative id) entry does not hold an integer.
    #[error("string {id} is a literal entry but its data {value:?} is not an integer")]
    InvalidLiteral {
        /// String id of the entry.
        id: i32,
        /// The data found.
        value: String,
    },

    // ==================== Text Table Errors ====================
    /// XML produced by a tool version known to lose the last entry.
    #[error("XML written by TLK tool {found}, versions before {minimum} are not supported")]
    UnsupportedToolVersion {
        /// Version found in the `TLKToolVersion` attribute.
        found: String,
        /// Oldest supported version.
        minimum: &'static str,
    },

    /// A numeric XML field could not be parsed.
    #[error("invalid <{field}> value: {value:?}")]
    InvalidXmlField {
        /// Element name.
        field: &'static str,
        /// The text that failed to parse.
        value: String,
    },

    /// XML parsing error.
    #[error("XML parse error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttrError(String),

    /// UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    // ==================== Configuration Errors ====================
    /// The options file could not be parsed.
    #[error("config error: {0}")]
    ConfigError(String),
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttrError(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

/// A specialized Result type for `TlkForge` operations.
pub type Result<T> = std::result::Result<T, Error>;
