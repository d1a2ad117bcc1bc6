//! `.tlk` file encoding and writing
//!
//! Every call builds a fresh Huffman tree from the table's current text.

use super::bitstream::BitWriter;
use super::huffman::{HuffmanEncoder, TERMINATOR, count_frequencies};
use super::layout::{self, EntryRecord, TlkHeader};
use super::table::{StringTable, TlkString};
use super::{NON_LOCALIZABLE_FLAG, PercentCallback, PercentTracker};
use crate::config::TlkOptions;
use crate::error::{Error, Result};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a .tlk file to disk
///
/// # Errors
/// Returns an error if encoding or file writing fails.
pub fn write_tlk<P: AsRef<Path>>(path: P, table: &StringTable, options: &TlkOptions) -> Result<()> {
    let bytes = encode_tlk(table, options)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Encode a string table into TLK bytes
///
/// # Errors
/// Returns [`Error::NulInText`] for text containing NUL,
/// [`Error::DuplicateStringId`] for an id used more than twice and
/// [`Error::InvalidLiteral`] for a literal entry without an integer value.
pub fn encode_tlk(table: &StringTable, options: &TlkOptions) -> Result<Vec<u8>> {
    encode_tlk_with_progress(table, options, &|_| {})
}

/// Text as it will be stored, with the optional `(#id) ` debug prefix.
fn stored_text<'a>(entry: &'a TlkString, options: &TlkOptions) -> Cow<'a, str> {
    let text = entry.encodable_text();
    if options.debug_ids && entry.id & NON_LOCALIZABLE_FLAG == 0 {
        Cow::Owned(format!("(#{}) {}", entry.id, text))
    } else {
        text
    }
}

/// Encode a string table, reporting whole-percent progress over the entries
///
/// # Errors
/// See [`encode_tlk`].
pub fn encode_tlk_with_progress(
    table: &StringTable,
    options: &TlkOptions,
    progress: PercentCallback,
) -> Result<Vec<u8>> {
    let placement = table.placement()?;

    let mut order: Vec<usize> = (0..table.entries.len()).collect();
    order.sort_by_key(|&i| table.entries[i].position);

    // Text per entry index; literals keep None
    let mut texts: Vec<Option<Cow<'_, str>>> = vec![None; table.entries.len()];
    for &index in &order {
        let entry = &table.entries[index];
        if entry.is_literal() {
            continue;
        }
        let text = stored_text(entry, options);
        if text.contains('\0') {
            return Err(Error::NulInText {
                id: entry.id,
                position: entry.position,
            });
        }
        texts[index] = Some(text);
    }

    let frequencies = count_frequencies(texts.iter().flatten().map(|text| &**text));
    let encoder = HuffmanEncoder::from_frequencies(&frequencies);

    let mut bits = BitWriter::with_order(options.bit_order);
    let mut offsets = vec![0i32; table.entries.len()];
    let mut tracker = PercentTracker::new(progress, order.len());

    for (done, &index) in order.iter().enumerate() {
        let entry = &table.entries[index];
        offsets[index] = match &texts[index] {
            None => entry.literal_value()?,
            Some(text) => {
                let start = i32::try_from(bits.bit_len()).map_err(|_| Error::PayloadTooLarge {
                    bits: bits.bit_len(),
                })?;
                for unit in text.encode_utf16().chain([TERMINATOR]) {
                    // Every unit was counted, so every unit has a code
                    if let Some(code) = encoder.code(unit) {
                        bits.write_bits(code);
                    }
                }
                start
            }
        };
        tracker.update(done + 1);
    }
    tracker.update(order.len());

    let payload = bits.flush();
    if i32::try_from(payload.bit_len).is_err() {
        return Err(Error::PayloadTooLarge {
            bits: payload.bit_len,
        });
    }

    let record = |index: usize, position: usize| EntryRecord {
        string_id: table.entries[index].id,
        offset: offsets[index],
        position,
    };
    let primary: Vec<EntryRecord> = placement
        .primary
        .iter()
        .enumerate()
        .map(|(position, &index)| record(index, position))
        .collect();
    let secondary: Vec<EntryRecord> = placement
        .secondary
        .iter()
        .enumerate()
        .map(|(i, &index)| record(index, primary.len() + i))
        .collect();

    let header = TlkHeader::new(
        primary.len() as i32,
        secondary.len() as i32,
        encoder.tree().len() as i32,
        payload.byte_len() as i32,
    );

    tracing::debug!(
        "Encoded {} entries: {} + {} table records, {} tree nodes, {} payload bits",
        table.len(),
        header.entry1_count,
        header.entry2_count,
        header.tree_node_count,
        payload.bit_len
    );

    let mut out = Vec::with_capacity(header.payload_offset() as usize + payload.bytes.len());
    layout::write_layout(
        &mut out,
        &header,
        &primary,
        &secondary,
        encoder.tree(),
        &payload.bytes,
        options.byte_order,
    )?;
    Ok(out)
}
