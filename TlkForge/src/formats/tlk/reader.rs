//! `.tlk` file reading and decoding

use super::bitstream::BitReader;
use super::huffman::HuffmanDecoder;
use super::layout::{self, TlkHeader};
use super::table::{StringData, StringTable, TlkString};
use super::{HEADER_SIZE, PercentCallback, PercentTracker};
use crate::config::TlkOptions;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// A decoded file together with its header and scan statistics.
#[derive(Debug, Clone)]
pub struct ParsedTlk {
    pub header: TlkHeader,
    pub table: StringTable,
    /// Distinct string starts found by the linear payload scan
    pub scanned_strings: usize,
    /// Entries whose offset was not a scan start and were decoded on their own
    pub independent_decodes: usize,
}

/// Read a .tlk file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read.
/// Returns [`Error::InvalidTlkMagic`] or [`Error::WrongPlatform`] if the file
/// does not start with the TLK magic in the configured byte order.
///
/// [`Error::Io`]: crate::Error::Io
/// [`Error::InvalidTlkMagic`]: crate::Error::InvalidTlkMagic
/// [`Error::WrongPlatform`]: crate::Error::WrongPlatform
pub fn read_tlk<P: AsRef<Path>>(path: P, options: &TlkOptions) -> Result<ParsedTlk> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_tlk_bytes(&buffer, options)
}

/// Decode TLK bytes into a string table
///
/// # Errors
/// See [`parse_tlk_bytes`].
pub fn decode_tlk(data: &[u8], options: &TlkOptions) -> Result<StringTable> {
    Ok(parse_tlk_bytes(data, options)?.table)
}

/// Parse .tlk data from bytes
///
/// # Errors
/// Returns a format error for a bad magic, [`Error::TruncatedTlk`] if the
/// declared counts exceed the buffer and [`Error::InvalidTreeNode`] for a
/// corrupt tree.
pub fn parse_tlk_bytes(data: &[u8], options: &TlkOptions) -> Result<ParsedTlk> {
    parse_tlk_bytes_with_progress(data, options, &|_| {})
}

/// Parse .tlk data from bytes, reporting whole-percent progress over the entries
///
/// # Errors
/// See [`parse_tlk_bytes`].
pub fn parse_tlk_bytes_with_progress(
    data: &[u8],
    options: &TlkOptions,
    progress: PercentCallback,
) -> Result<ParsedTlk> {
    let order = options.byte_order;
    let mut cursor = Cursor::new(data);

    let header = layout::parse_header(&mut cursor, order).map_err(|err| match err {
        Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Error::TruncatedTlk {
            section: "header",
            needed: HEADER_SIZE as u64,
            available: data.len() as u64,
        },
        other => other,
    })?;
    header.validate(data.len())?;

    tracing::debug!(
        "TLK header: ver {} (min {}), {} + {} entries, {} tree nodes, {} payload bytes",
        header.version,
        header.min_version,
        header.entry1_count,
        header.entry2_count,
        header.tree_node_count,
        header.data_len
    );

    // Tree sits right after both entry tables
    cursor.seek(SeekFrom::Start(header.tree_offset()))?;
    let tree = layout::parse_tree(&mut cursor, header.tree_node_count as usize, order)?;

    let payload_start = header.payload_offset() as usize;
    let payload = &data[payload_start..payload_start + header.data_len as usize];
    let bits = BitReader::with_order(payload, options.bit_order);
    let decoder = HuffmanDecoder::new(&tree);

    // One forward pass over the payload, caching every string start it finds
    let mut scanned: HashMap<usize, Option<String>> = HashMap::new();
    let mut offset = 0;
    while offset < bits.len() {
        let decoded = decoder.decode_string_at(&bits, offset)?;
        scanned.insert(offset, decoded.text);
        offset = decoded.next;
    }

    cursor.seek(SeekFrom::Start(header.entries_offset()))?;
    let primary_len = header.entry1_count as usize;
    let mut records = layout::parse_entries(&mut cursor, primary_len, 0, order)?;
    records.extend(layout::parse_entries(
        &mut cursor,
        header.entry2_count as usize,
        primary_len,
        order,
    )?);

    let mut tracker = PercentTracker::new(progress, records.len());
    let mut entries = Vec::with_capacity(records.len());
    let mut independent_decodes = 0;

    for (done, record) in records.iter().enumerate() {
        let data = if record.string_id < 0 {
            StringData::Literal(record.offset)
        } else if let Ok(start) = usize::try_from(record.offset) {
            let text = if let Some(text) = scanned.get(&start) {
                text.clone()
            } else {
                // Starts inside another string's bits
                independent_decodes += 1;
                decoder.decode_string_at(&bits, start)?.text
            };
            text.map_or(StringData::Missing, StringData::Text)
        } else {
            StringData::Missing
        };

        if data == StringData::Missing {
            tracing::warn!(
                "No terminated string for id {} at bit offset {}",
                record.string_id,
                record.offset
            );
        }

        entries.push(TlkString {
            id: record.string_id,
            position: record.position,
            data,
        });
        tracker.update(done + 1);
    }
    tracker.update(records.len());

    tracing::debug!(
        "Decoded {} entries ({} scanned strings, {} independent decodes)",
        entries.len(),
        scanned.len(),
        independent_decodes
    );

    Ok(ParsedTlk {
        header,
        table: StringTable::from_entries(entries),
        scanned_strings: scanned.len(),
        independent_decodes,
    })
}
