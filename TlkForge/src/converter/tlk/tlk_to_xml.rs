//! TLK to XML conversion

use crate::config::TlkOptions;
use crate::error::Result;
use crate::formats::tlk::{self, StringData, StringTable};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::borrow::Cow;
use std::path::Path;

/// Escape only the characters required in XML text content (not attributes).
fn escape_text_minimal(s: &str) -> Cow<'_, str> {
    if s.contains('&') || s.contains('<') {
        Cow::Owned(s.replace('&', "&amp;").replace('<', "&lt;"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Convert .tlk file to XML format
///
/// # Errors
/// Returns an error if reading or conversion fails.
pub fn convert_tlk_to_xml<P: AsRef<Path>>(
    source: P,
    dest: P,
    options: &TlkOptions,
) -> Result<()> {
    convert_tlk_to_xml_with_progress(source, dest, options, &|_| {})
}

/// Convert .tlk file to XML format with progress callback
///
/// # Errors
/// Returns an error if reading or conversion fails.
pub fn convert_tlk_to_xml_with_progress<P: AsRef<Path>>(
    source: P,
    dest: P,
    options: &TlkOptions,
    progress: crate::converter::ConvertProgressCallback,
) -> Result<()> {
    use crate::converter::{ConvertPhase, ConvertProgress};

    tracing::info!(
        "Converting TLK→XML: {:?} → {:?}",
        source.as_ref(),
        dest.as_ref()
    );

    progress(&ConvertProgress::with_file(
        ConvertPhase::ReadingSource,
        1,
        3,
        "Reading TLK file...",
    ));
    let data = std::fs::read(&source)?;
    let parsed = tlk::parse_tlk_bytes_with_progress(&data, options, &|percent| {
        progress(&ConvertProgress::new(
            ConvertPhase::Decoding,
            usize::from(percent),
            100,
        ));
    })?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::Converting,
        2,
        3,
        format!("Converting {} entries to XML...", parsed.table.len()),
    ));
    // Section comments follow the entry tables as stored, not a re-placement
    let primary_count = usize::try_from(parsed.header.entry1_count).unwrap_or(0);
    let xml = to_xml_with_sections(&parsed.table, primary_count, options)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::WritingOutput,
        3,
        3,
        "Writing XML file...",
    ));
    std::fs::write(dest, xml)?;

    progress(&ConvertProgress::new(ConvertPhase::Complete, 3, 3));
    tracing::info!("Conversion complete");
    Ok(())
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<()> {
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::from_escaped(escape_text_minimal(
            text,
        ))))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
    }
    Ok(())
}

/// Convert a `StringTable` to an XML string
///
/// Entries are written in position order. Comments mark where the male
/// (primary) and female (secondary) sections begin and end, using the
/// tables the encoder would build for `table`.
///
/// # Errors
/// Returns [`crate::Error::DuplicateStringId`] if an id occurs more than
/// twice, or an error if XML serialization fails.
pub fn to_xml(table: &StringTable, options: &TlkOptions) -> Result<String> {
    let primary_count = table.placement()?.primary.len();
    to_xml_with_sections(table, primary_count, options)
}

/// Convert a `StringTable` to an XML string, with the male section holding
/// the first `primary_count` positions.
///
/// Use this for tables decoded from a file, passing the header's
/// `entry1_count`.
///
/// # Errors
/// Returns an error if XML serialization fails.
pub fn to_xml_with_sections(
    table: &StringTable,
    primary_count: usize,
    options: &TlkOptions,
) -> Result<String> {
    let last_position = table.len() as i64 - 1;

    let mut output = Vec::new();
    let mut writer = Writer::new_with_indent(&mut output, b'\t', 1);

    // XML declaration
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    // <tlkFile TLKToolVersion="...">
    let mut root = BytesStart::new("tlkFile");
    root.push_attribute(("TLKToolVersion", options.tool_version.as_str()));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Comment(BytesText::new(&format!(
        "Male entries section begin (ends at position {})",
        primary_count as i64 - 1
    ))))?;

    let mut ordered: Vec<_> = table.iter().collect();
    ordered.sort_by_key(|entry| entry.position);

    for entry in ordered {
        if entry.position == primary_count {
            writer.write_event(Event::Comment(BytesText::new("Male entries section end")))?;
            writer.write_event(Event::Comment(BytesText::new(&format!(
                "Female entries section begin (ends at position {last_position})"
            ))))?;
        }

        writer.write_event(Event::Start(BytesStart::new("string")))?;
        write_text_element(&mut writer, "id", &entry.id.to_string())?;
        write_text_element(&mut writer, "position", &entry.position.to_string())?;
        let data = match &entry.data {
            StringData::Text(text) => Cow::Borrowed(text.as_str()),
            StringData::Literal(value) => Cow::Owned(value.to_string()),
            StringData::Missing => Cow::Borrowed(""),
        };
        write_text_element(&mut writer, "data", &data)?;
        writer.write_event(Event::End(BytesEnd::new("string")))?;
    }

    writer.write_event(Event::Comment(BytesText::new("Female entries section end")))?;
    writer.write_event(Event::End(BytesEnd::new("tlkFile")))?;

    let mut xml = String::from_utf8(output)?;
    // Add trailing newline
    xml.push('\n');
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endianness;
    use crate::formats::tlk::bitstream::BitWriter;
    use crate::formats::tlk::huffman::leaf_id;
    use crate::formats::tlk::layout::{self, EntryRecord, TlkHeader, TreeNode};
    use crate::formats::tlk::{TlkString, parse_tlk_bytes};

    fn sample() -> StringTable {
        StringTable::from_entries(vec![
            TlkString::text(100, 0, "Fish & <chips>"),
            TlkString::literal(-5, 1, 42),
            TlkString::text(100, 2, "Female line"),
        ])
    }

    #[test]
    fn test_document_shape() {
        let xml = to_xml(&sample(), &TlkOptions::default()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<tlkFile TLKToolVersion=\"1.0.4\">"));
        assert!(xml.contains("<!--Male entries section begin (ends at position 1)-->"));
        assert!(xml.contains("<!--Female entries section begin (ends at position 2)-->"));
        assert!(xml.trim_end().ends_with("<!--Female entries section end-->\n</tlkFile>"));
    }

    #[test]
    fn test_section_markers_precede_first_female_entry() {
        let xml = to_xml(&sample(), &TlkOptions::default()).unwrap();
        let male_end = xml.find("Male entries section end").unwrap();
        let female_position = xml.find("<position>2</position>").unwrap();
        let male_position = xml.find("<position>1</position>").unwrap();
        assert!(male_position < male_end);
        assert!(male_end < female_position);
    }

    #[test]
    fn test_text_is_minimally_escaped() {
        let table =
            StringTable::from_entries(vec![TlkString::text(1, 0, "It's \"Fish\" & <chips>")]);
        let xml = to_xml(&table, &TlkOptions::default()).unwrap();
        assert!(xml.contains("<data>It's \"Fish\" &amp; &lt;chips></data>"));
    }

    #[test]
    fn test_literal_and_empty_data() {
        let table = StringTable::from_entries(vec![
            TlkString::literal(-1, 0, -7),
            TlkString::text(2, 1, ""),
            TlkString {
                id: 3,
                position: 2,
                data: StringData::Missing,
            },
        ]);
        let xml = to_xml(&table, &TlkOptions::default()).unwrap();
        assert!(xml.contains("<data>-7</data>"));
        assert_eq!(xml.matches("<data/>").count(), 2);
    }

    #[test]
    fn test_custom_tool_version() {
        let options = TlkOptions {
            tool_version: "2.0".to_string(),
            ..TlkOptions::default()
        };
        let xml = to_xml(&StringTable::new(), &options).unwrap();
        assert!(xml.contains("TLKToolVersion=\"2.0\""));
        assert!(xml.contains("ends at position -1"));
    }

    /// Build a file whose entry tables are given as-is, over the payload
    /// "A\0" at bit 0 and "AB\0" at bit 3.
    fn file_with_tables(primary: &[EntryRecord], secondary: &[EntryRecord]) -> Vec<u8> {
        let tree = [
            TreeNode { left: leaf_id(u16::from(b'A')), right: 1 },
            TreeNode { left: leaf_id(u16::from(b'B')), right: leaf_id(0) },
        ];
        let mut bits = BitWriter::new();
        bits.write_bits(&[false, true, true, false, true, false, true, true]);
        let payload = bits.flush();

        let header = TlkHeader::new(
            primary.len() as i32,
            secondary.len() as i32,
            tree.len() as i32,
            payload.byte_len() as i32,
        );
        let mut out = Vec::new();
        layout::write_layout(
            &mut out,
            &header,
            primary,
            secondary,
            &tree,
            &payload.bytes,
            Endianness::Little,
        )
        .unwrap();
        out
    }

    fn decoded_xml(data: &[u8]) -> String {
        let options = TlkOptions::default();
        let parsed = parse_tlk_bytes(data, &options).unwrap();
        let primary_count = usize::try_from(parsed.header.entry1_count).unwrap();
        to_xml_with_sections(&parsed.table, primary_count, &options).unwrap()
    }

    #[test]
    fn test_female_only_id_starts_female_section() {
        let data = file_with_tables(
            &[EntryRecord { string_id: 1, offset: 0, position: 0 }],
            &[EntryRecord { string_id: 2, offset: 3, position: 1 }],
        );
        let xml = decoded_xml(&data);

        assert!(xml.contains("<!--Male entries section begin (ends at position 0)-->"));
        assert!(xml.contains("<!--Female entries section begin (ends at position 1)-->"));
        let first = xml.find("<position>0</position>").unwrap();
        let male_end = xml.find("<!--Male entries section end-->").unwrap();
        let second = xml.find("<position>1</position>").unwrap();
        assert!(first < male_end);
        assert!(male_end < second);
    }

    #[test]
    fn test_repeated_primary_id_stays_in_male_section() {
        let data = file_with_tables(
            &[
                EntryRecord { string_id: 1, offset: 0, position: 0 },
                EntryRecord { string_id: 1, offset: 3, position: 1 },
            ],
            &[],
        );
        let xml = decoded_xml(&data);

        assert!(xml.contains("<!--Male entries section begin (ends at position 1)-->"));
        assert!(!xml.contains("Male entries section end"));
        assert!(!xml.contains("Female entries section begin"));
        assert!(xml.contains("<!--Female entries section end-->"));
    }

    #[test]
    fn test_third_occurrence_of_an_id_is_rejected() {
        let table = StringTable::from_entries(vec![
            TlkString::text(1, 0, "one"),
            TlkString::text(1, 1, "one (F)"),
            TlkString::text(1, 2, "one again"),
        ]);
        assert!(matches!(
            to_xml(&table, &TlkOptions::default()),
            Err(crate::Error::DuplicateStringId { id: 1 })
        ));
    }
}
