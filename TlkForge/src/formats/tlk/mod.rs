//! .tlk talk table format
//!
//! Binary string tables used by Mass Effect 2. Text is compressed with a
//! per-file Huffman tree and bit-packed; every string is NUL-terminated.
//! Can be converted to/from an XML text table.
//!
//! File layout (all integers 32-bit, configurable byte order):
//!
//! | Section | Size |
//! |---|---|
//! | header | 7 × i32 |
//! | primary entries | `entry1_count` × (id, offset) |
//! | secondary entries | `entry2_count` × (id, offset) |
//! | tree | `tree_node_count` × (left, right) |
//! | payload | `data_len` bytes |

pub mod bitstream;
pub mod huffman;
pub mod layout;
mod reader;
pub mod table;
mod writer;

pub use bitstream::{BitReader, BitWriter, EncodedBits};
pub use huffman::{DecodedString, HuffmanDecoder, HuffmanEncoder};
pub use layout::{EntryRecord, TlkHeader, TreeNode};
pub use reader::{
    ParsedTlk, decode_tlk, parse_tlk_bytes, parse_tlk_bytes_with_progress, read_tlk,
};
pub use table::{StringData, StringTable, TableStats, TlkString};
pub use writer::{encode_tlk, encode_tlk_with_progress, write_tlk};

/// "Tlk\0" read as a little-endian i32
pub const TLK_MAGIC: i32 = 7040084;

/// [`TLK_MAGIC`] with its bytes swapped: a TLK file from the other platform
pub const TLK_MAGIC_SWAPPED: i32 = 1416391424;

/// Format version written by the encoder
pub const TLK_VERSION: i32 = 3;

/// Minimum reader version written by the encoder
pub const TLK_MIN_VERSION: i32 = 2;

/// Header size in bytes (7 × i32)
pub const HEADER_SIZE: usize = 28;

/// Size of one entry table record (id + offset)
pub const ENTRY_SIZE: usize = 8;

/// Size of one tree node (left + right)
pub const NODE_SIZE: usize = 8;

/// Ids with this bit set are not localizable and never get a debug prefix.
pub const NON_LOCALIZABLE_FLAG: i32 = 0x8000000;

/// Whole-percent progress callback for the per-entry decode and encode loops.
pub type PercentCallback<'a> = &'a dyn Fn(u8);

/// Reports each whole percent once.
pub(crate) struct PercentTracker<'a> {
    callback: PercentCallback<'a>,
    total: usize,
    last: Option<u8>,
}

impl<'a> PercentTracker<'a> {
    pub(crate) fn new(callback: PercentCallback<'a>, total: usize) -> Self {
        Self {
            callback,
            total,
            last: None,
        }
    }

    pub(crate) fn update(&mut self, done: usize) {
        let percent = if self.total == 0 {
            100
        } else {
            (done.min(self.total) * 100 / self.total) as u8
        };
        if self.last != Some(percent) {
            self.last = Some(percent);
            (self.callback)(percent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_magic_constants_are_byte_swapped() {
        assert_eq!(TLK_MAGIC.swap_bytes(), TLK_MAGIC_SWAPPED);
        assert_eq!(TLK_MAGIC.to_le_bytes(), *b"Tlk\0");
    }

    #[test]
    fn test_percent_tracker_reports_each_percent_once() {
        let seen = RefCell::new(Vec::new());
        let callback = |p: u8| seen.borrow_mut().push(p);
        let mut tracker = PercentTracker::new(&callback, 400);
        for done in 0..=400 {
            tracker.update(done);
        }
        let seen = seen.into_inner();
        assert_eq!(seen.len(), 101);
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
    }
}
