//! Binary file formats
//!
//! - **TLK** - Huffman-compressed talk tables

pub mod tlk;
