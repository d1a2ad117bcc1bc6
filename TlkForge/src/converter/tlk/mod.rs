//! TLK and XML talk table conversions
//!
//! Handles conversions between the two talk table representations:
//! - TLK (binary) - Huffman-compressed string table shipped with the game
//! - XML - Human-readable text table for editing

mod tlk_to_xml;
mod xml_to_tlk;

pub use tlk_to_xml::{
    convert_tlk_to_xml, convert_tlk_to_xml_with_progress, to_xml as tlk_to_xml_string,
    to_xml_with_sections as tlk_to_xml_string_with_sections,
};
pub use xml_to_tlk::{
    MIN_TOOL_VERSION, convert_xml_to_tlk, convert_xml_to_tlk_with_progress,
    from_xml as tlk_from_xml,
};
