use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::fs;
use tempfile::tempdir;
use tlkforge::converter::{
    ConvertPhase, convert_tlk_to_xml, convert_tlk_to_xml_with_progress, convert_xml_to_tlk,
    convert_xml_to_tlk_with_progress, tlk_from_xml,
};
use tlkforge::formats::tlk::bitstream::BitWriter;
use tlkforge::formats::tlk::huffman::leaf_id;
use tlkforge::formats::tlk::layout::{self, EntryRecord, TreeNode};
use tlkforge::prelude::*;

fn sample_table() -> StringTable {
    StringTable::from_entries(vec![
        TlkString::text(135000, 0, "Shepard, we need you on the bridge."),
        TlkString::text(135001, 1, "Understood."),
        TlkString::literal(-1, 2, 100),
        TlkString::text(135002, 3, "Tabs\tand\nnewlines & <markup>"),
        TlkString::text(135003, 4, ""),
        TlkString::text(135000, 5, "Shepard, we need you on the bridge. (F)"),
    ])
}

#[test]
fn test_tlk_file_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("BIOGame_INT.tlk");
    let options = TlkOptions::default();

    write_tlk(&path, &sample_table(), &options).unwrap();
    let parsed = read_tlk(&path, &options).unwrap();

    assert_eq!(parsed.table, sample_table());
    assert_eq!(parsed.header.entry1_count, 5);
    assert_eq!(parsed.header.entry2_count, 1);
    assert_eq!(parsed.header.version, 3);
    assert_eq!(parsed.header.min_version, 2);
}

#[test]
fn test_tlk_xml_tlk_conversion() {
    let dir = tempdir().unwrap();
    let tlk_path = dir.path().join("source.tlk");
    let xml_path = dir.path().join("source.xml");
    let rebuilt_path = dir.path().join("rebuilt.tlk");
    let options = TlkOptions::default();

    write_tlk(&tlk_path, &sample_table(), &options).unwrap();
    convert_tlk_to_xml(&tlk_path, &xml_path, &options).unwrap();
    convert_xml_to_tlk(&xml_path, &rebuilt_path, &options).unwrap();

    // Same table, same tree, same bytes
    assert_eq!(fs::read(&tlk_path).unwrap(), fs::read(&rebuilt_path).unwrap());

    let xml = fs::read_to_string(&xml_path).unwrap();
    assert_eq!(tlk_from_xml(&xml).unwrap(), sample_table());
}

#[test]
fn test_edit_and_reencode() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("edited.tlk");
    let options = TlkOptions::default();

    let mut table = sample_table();
    assert!(table.update_text(1, "Aye aye, Commander. Ünïcödé and 日本語 too."));
    table.add_text(135004, "A brand new line");
    write_tlk(&path, &table, &options).unwrap();

    // The new id joins the male table, ahead of the female entry
    let decoded = read_tlk(&path, &options).unwrap().table;
    assert_eq!(decoded.len(), 7);
    assert_eq!(decoded.get(5).unwrap().id, 135004);
    assert_eq!(
        decoded.get(5).unwrap().data,
        StringData::Text("A brand new line".into())
    );
    assert_eq!(
        decoded.get(1).unwrap().data,
        StringData::Text("Aye aye, Commander. Ünïcödé and 日本語 too.".into())
    );
    assert_eq!(decoded.get(6).unwrap().id, 135000);
}

#[test]
fn test_big_endian_lsb_first_from_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("tlkforge.toml");
    fs::write(&config_path, "byte_order = \"big\"\nbit_order = \"lsb_first\"\n").unwrap();
    let options = TlkOptions::load(&config_path).unwrap();

    let path = dir.path().join("console.tlk");
    write_tlk(&path, &sample_table(), &options).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], &[0x00, 0x6B, 0x6C, 0x54]);
    assert!(matches!(
        read_tlk(&path, &TlkOptions::default()),
        Err(Error::WrongPlatform { .. })
    ));
    assert_eq!(read_tlk(&path, &options).unwrap().table, sample_table());
}

#[test]
fn test_conversion_progress_phases() {
    let dir = tempdir().unwrap();
    let tlk_path = dir.path().join("progress.tlk");
    let xml_path = dir.path().join("progress.xml");
    let options = TlkOptions::default();
    write_tlk(&tlk_path, &sample_table(), &options).unwrap();

    let phases = RefCell::new(Vec::new());
    convert_tlk_to_xml_with_progress(&tlk_path, &xml_path, &options, &|p| {
        phases.borrow_mut().push((p.phase, p.current));
    })
    .unwrap();
    let seen = phases.take();
    assert_eq!(seen.first(), Some(&(ConvertPhase::ReadingSource, 1)));
    assert!(seen.contains(&(ConvertPhase::Decoding, 100)));
    assert_eq!(seen.last(), Some(&(ConvertPhase::Complete, 3)));

    convert_xml_to_tlk_with_progress(&xml_path, &tlk_path, &options, &|p| {
        phases.borrow_mut().push((p.phase, p.current));
    })
    .unwrap();
    let seen = phases.take();
    assert!(seen.contains(&(ConvertPhase::Parsing, 2)));
    assert!(seen.contains(&(ConvertPhase::Encoding, 100)));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let result = read_tlk(dir.path().join("absent.tlk"), &TlkOptions::default());
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_rejects_old_xml_tool_version() {
    let dir = tempdir().unwrap();
    let xml_path = dir.path().join("old.xml");
    let tlk_path = dir.path().join("old.tlk");
    fs::write(
        &xml_path,
        concat!(
            "<tlkFile TLKToolVersion=\"1.0.2\">",
            "<string><id>1</id><position>0</position><data>x</data></string>",
            "</tlkFile>",
        ),
    )
    .unwrap();

    let result = convert_xml_to_tlk(&xml_path, &tlk_path, &TlkOptions::default());
    assert!(matches!(result, Err(Error::UnsupportedToolVersion { .. })));
    assert!(!tlk_path.exists());
}

#[test]
fn test_xml_sections_follow_stored_entry_tables() {
    // Primary holds id 1 ("A"), secondary holds only id 2 ("AB")
    let tree = [
        TreeNode { left: leaf_id(u16::from(b'A')), right: 1 },
        TreeNode { left: leaf_id(u16::from(b'B')), right: leaf_id(0) },
    ];
    let mut bits = BitWriter::new();
    bits.write_bits(&[false, true, true, false, true, false, true, true]);
    let payload = bits.flush();
    let header = TlkHeader::new(1, 1, 2, payload.byte_len() as i32);
    let mut data = Vec::new();
    layout::write_layout(
        &mut data,
        &header,
        &[EntryRecord { string_id: 1, offset: 0, position: 0 }],
        &[EntryRecord { string_id: 2, offset: 3, position: 1 }],
        &tree,
        &payload.bytes,
        Endianness::Little,
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let tlk_path = dir.path().join("female_only.tlk");
    let xml_path = dir.path().join("female_only.xml");
    fs::write(&tlk_path, &data).unwrap();
    convert_tlk_to_xml(&tlk_path, &xml_path, &TlkOptions::default()).unwrap();

    let xml = fs::read_to_string(&xml_path).unwrap();
    assert!(xml.contains("<!--Male entries section begin (ends at position 0)-->"));
    let male_end = xml.find("<!--Male entries section end-->").unwrap();
    let female_begin = xml
        .find("<!--Female entries section begin (ends at position 1)-->")
        .unwrap();
    assert!(xml.find("<position>0</position>").unwrap() < male_end);
    assert!(female_begin < xml.find("<position>1</position>").unwrap());
}
