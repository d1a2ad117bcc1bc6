//! Structural layout of a TLK file
//!
//! Header, the two id/offset entry tables, the flattened Huffman node table
//! and the payload, in that order. Nothing here knows about text.

use super::{ENTRY_SIZE, HEADER_SIZE, NODE_SIZE, TLK_MAGIC, TLK_MAGIC_SWAPPED};
use crate::config::Endianness;
use crate::error::{Error, Result};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Fixed 28-byte file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlkHeader {
    pub magic: i32,
    pub version: i32,
    pub min_version: i32,
    /// Entries in the primary (male) table
    pub entry1_count: i32,
    /// Entries in the secondary (female) table
    pub entry2_count: i32,
    /// Internal Huffman nodes serialized after the entries
    pub tree_node_count: i32,
    /// Payload length in bytes
    pub data_len: i32,
}

/// One `(id, offset)` pair from an entry table.
///
/// `position` is the 0-based index across both tables; positions at or past
/// `entry1_count` belong to the secondary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRecord {
    pub string_id: i32,
    /// Bit offset into the payload, or a literal value when `string_id < 0`
    pub offset: i32,
    pub position: usize,
}

/// One serialized internal node of the Huffman tree.
///
/// A non-negative child is an index into the node table, a negative child
/// is a leaf carrying a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeNode {
    pub left: i32,
    pub right: i32,
}

pub(crate) fn read_i32<R: Read>(reader: &mut R, order: Endianness) -> std::io::Result<i32> {
    match order {
        Endianness::Little => reader.read_i32::<LittleEndian>(),
        Endianness::Big => reader.read_i32::<BigEndian>(),
    }
}

pub(crate) fn write_i32<W: Write>(
    writer: &mut W,
    order: Endianness,
    value: i32,
) -> std::io::Result<()> {
    match order {
        Endianness::Little => writer.write_i32::<LittleEndian>(value),
        Endianness::Big => writer.write_i32::<BigEndian>(value),
    }
}

fn count(value: i32, section: &'static str, available: u64) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::TruncatedTlk {
        section,
        needed: u64::MAX,
        available,
    })
}

impl TlkHeader {
    /// Header for freshly encoded data
    #[must_use]
    pub fn new(entry1_count: i32, entry2_count: i32, tree_node_count: i32, data_len: i32) -> Self {
        Self {
            magic: TLK_MAGIC,
            version: super::TLK_VERSION,
            min_version: super::TLK_MIN_VERSION,
            entry1_count,
            entry2_count,
            tree_node_count,
            data_len,
        }
    }

    /// Total entries across both tables
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entry1_count.max(0) as usize + self.entry2_count.max(0) as usize
    }

    /// Byte offset of the first entry
    #[must_use]
    pub fn entries_offset(&self) -> u64 {
        HEADER_SIZE as u64
    }

    /// Byte offset of the tree table (`8 * (entry1Count + entry2Count)` past the entries)
    #[must_use]
    pub fn tree_offset(&self) -> u64 {
        self.entries_offset() + (self.entry_count() * ENTRY_SIZE) as u64
    }

    /// Byte offset of the payload
    #[must_use]
    pub fn payload_offset(&self) -> u64 {
        self.tree_offset() + (self.tree_node_count.max(0) as usize * NODE_SIZE) as u64
    }

    /// Check the declared counts against the number of bytes available.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedTlk`] naming the first section that does not fit.
    pub fn validate(&self, available: usize) -> Result<()> {
        let available = available as u64;
        let mut end = HEADER_SIZE as u64;

        let entries = count(self.entry1_count, "entry table", available)?
            + count(self.entry2_count, "entry table", available)?;
        end += entries * ENTRY_SIZE as u64;
        if end > available {
            return Err(Error::TruncatedTlk {
                section: "entry table",
                needed: end,
                available,
            });
        }

        end += count(self.tree_node_count, "tree table", available)? * NODE_SIZE as u64;
        if end > available {
            return Err(Error::TruncatedTlk {
                section: "tree table",
                needed: end,
                available,
            });
        }

        end += count(self.data_len, "payload", available)?;
        if end > available {
            return Err(Error::TruncatedTlk {
                section: "payload",
                needed: end,
                available,
            });
        }
        Ok(())
    }
}

/// Read the seven header integers.
///
/// The magic is checked before anything else is read.
///
/// # Errors
/// Returns [`Error::WrongPlatform`] for a byte-swapped magic,
/// [`Error::InvalidTlkMagic`] for any other mismatch and [`Error::Io`] on a
/// short read.
pub fn parse_header<R: Read>(reader: &mut R, order: Endianness) -> Result<TlkHeader> {
    let magic = read_i32(reader, order)?;
    if magic == TLK_MAGIC_SWAPPED {
        return Err(Error::WrongPlatform { found: magic });
    }
    if magic != TLK_MAGIC {
        return Err(Error::InvalidTlkMagic { found: magic });
    }

    Ok(TlkHeader {
        magic,
        version: read_i32(reader, order)?,
        min_version: read_i32(reader, order)?,
        entry1_count: read_i32(reader, order)?,
        entry2_count: read_i32(reader, order)?,
        tree_node_count: read_i32(reader, order)?,
        data_len: read_i32(reader, order)?,
    })
}

/// Read `count` `(id, offset)` pairs in file order, numbering them from
/// `first_position`.
///
/// # Errors
/// Returns [`Error::Io`] on a short read.
pub fn parse_entries<R: Read>(
    reader: &mut R,
    count: usize,
    first_position: usize,
    order: Endianness,
) -> Result<Vec<EntryRecord>> {
    let mut entries = Vec::with_capacity(count);
    for position in first_position..first_position + count {
        let string_id = read_i32(reader, order)?;
        let offset = read_i32(reader, order)?;
        entries.push(EntryRecord {
            string_id,
            offset,
            position,
        });
    }
    Ok(entries)
}

/// Read `count` `(left, right)` pairs. Index 0 is the root.
///
/// # Errors
/// Returns [`Error::Io`] on a short read.
pub fn parse_tree<R: Read>(
    reader: &mut R,
    count: usize,
    order: Endianness,
) -> Result<Vec<TreeNode>> {
    let mut nodes = Vec::with_capacity(count);
    for _ in 0..count {
        let left = read_i32(reader, order)?;
        let right = read_i32(reader, order)?;
        nodes.push(TreeNode { left, right });
    }
    Ok(nodes)
}

pub fn write_header<W: Write>(writer: &mut W, header: &TlkHeader, order: Endianness) -> Result<()> {
    for value in [
        header.magic,
        header.version,
        header.min_version,
        header.entry1_count,
        header.entry2_count,
        header.tree_node_count,
        header.data_len,
    ] {
        write_i32(writer, order, value)?;
    }
    Ok(())
}

pub fn write_entries<W: Write>(
    writer: &mut W,
    entries: &[EntryRecord],
    order: Endianness,
) -> Result<()> {
    for entry in entries {
        write_i32(writer, order, entry.string_id)?;
        write_i32(writer, order, entry.offset)?;
    }
    Ok(())
}

pub fn write_tree<W: Write>(writer: &mut W, nodes: &[TreeNode], order: Endianness) -> Result<()> {
    for node in nodes {
        write_i32(writer, order, node.left)?;
        write_i32(writer, order, node.right)?;
    }
    Ok(())
}

/// Concatenate header, primary entries, secondary entries, tree and payload.
///
/// # Errors
/// Returns [`Error::Io`] if the writer fails.
pub fn write_layout<W: Write>(
    writer: &mut W,
    header: &TlkHeader,
    primary: &[EntryRecord],
    secondary: &[EntryRecord],
    tree: &[TreeNode],
    payload: &[u8],
    order: Endianness,
) -> Result<()> {
    write_header(writer, header, order)?;
    write_entries(writer, primary, order)?;
    write_entries(writer, secondary, order)?;
    write_tree(writer, tree, order)?;
    writer.write_all(payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_header() -> TlkHeader {
        TlkHeader::new(2, 1, 1, 3)
    }

    #[test]
    fn test_header_roundtrip_both_orders() {
        for order in [Endianness::Little, Endianness::Big] {
            let mut bytes = Vec::new();
            write_header(&mut bytes, &sample_header(), order).unwrap();
            assert_eq!(bytes.len(), HEADER_SIZE);
            let parsed = parse_header(&mut Cursor::new(&bytes), order).unwrap();
            assert_eq!(parsed, sample_header());
        }
    }

    #[test]
    fn test_magic_bytes_little_endian() {
        let mut bytes = Vec::new();
        write_header(&mut bytes, &sample_header(), Endianness::Little).unwrap();
        assert_eq!(&bytes[..4], b"Tlk\0");
    }

    #[test]
    fn test_wrong_platform_magic() {
        let mut bytes = Vec::new();
        write_header(&mut bytes, &sample_header(), Endianness::Big).unwrap();
        let result = parse_header(&mut Cursor::new(&bytes), Endianness::Little);
        assert!(matches!(result, Err(Error::WrongPlatform { .. })));
    }

    #[test]
    fn test_bad_magic() {
        let bytes = [0u8; HEADER_SIZE];
        let result = parse_header(&mut Cursor::new(&bytes[..]), Endianness::Little);
        assert!(matches!(result, Err(Error::InvalidTlkMagic { found: 0 })));
    }

    #[test]
    fn test_section_offsets() {
        let header = sample_header();
        assert_eq!(header.entries_offset(), 28);
        assert_eq!(header.tree_offset(), 28 + 3 * 8);
        assert_eq!(header.payload_offset(), 28 + 3 * 8 + 8);
    }

    #[test]
    fn test_validate_rejects_overlong_counts() {
        let header = sample_header();
        assert!(header.validate(28 + 24 + 8 + 3).is_ok());
        assert!(matches!(
            header.validate(28 + 24 + 8 + 2),
            Err(Error::TruncatedTlk { section: "payload", .. })
        ));
        assert!(matches!(
            header.validate(30),
            Err(Error::TruncatedTlk { section: "entry table", .. })
        ));

        let negative = TlkHeader::new(-1, 0, 0, 0);
        assert!(negative.validate(1000).is_err());
    }

    #[test]
    fn test_entries_keep_positions_across_tables() {
        let primary = [
            EntryRecord { string_id: 10, offset: 0, position: 0 },
            EntryRecord { string_id: -5, offset: 42, position: 1 },
        ];
        let secondary = [EntryRecord { string_id: 10, offset: 17, position: 2 }];
        let mut bytes = Vec::new();
        write_entries(&mut bytes, &primary, Endianness::Little).unwrap();
        write_entries(&mut bytes, &secondary, Endianness::Little).unwrap();

        let mut cursor = Cursor::new(&bytes);
        let first = parse_entries(&mut cursor, 2, 0, Endianness::Little).unwrap();
        let second = parse_entries(&mut cursor, 1, 2, Endianness::Little).unwrap();
        assert_eq!(first, primary);
        assert_eq!(second, secondary);
    }

    #[test]
    fn test_tree_roundtrip() {
        let nodes = [TreeNode { left: 1, right: -66 }, TreeNode { left: -1, right: -67 }];
        let mut bytes = Vec::new();
        write_tree(&mut bytes, &nodes, Endianness::Big).unwrap();
        let parsed = parse_tree(&mut Cursor::new(&bytes), 2, Endianness::Big).unwrap();
        assert_eq!(parsed, nodes);
    }
}
