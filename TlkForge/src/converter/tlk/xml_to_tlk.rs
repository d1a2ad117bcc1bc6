//! XML to TLK conversion

use crate::config::TlkOptions;
use crate::error::{Error, Result};
use crate::formats::tlk::{self, StringData, StringTable, TlkString};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs;
use std::path::Path;

/// Oldest `TLKToolVersion` accepted. Earlier tools dropped the last entry.
pub const MIN_TOOL_VERSION: &str = "1.0.3";

/// Assumed when the root element carries no `TLKToolVersion`.
const UNKNOWN_TOOL_VERSION: &str = "1.0.0.0";

/// Convert XML file to .tlk format
///
/// # Errors
/// Returns an error if reading or conversion fails.
pub fn convert_xml_to_tlk<P: AsRef<Path>>(source: P, dest: P, options: &TlkOptions) -> Result<()> {
    convert_xml_to_tlk_with_progress(source, dest, options, &|_| {})
}

/// Convert XML file to .tlk format with progress callback
///
/// # Errors
/// Returns an error if reading or conversion fails.
pub fn convert_xml_to_tlk_with_progress<P: AsRef<Path>>(
    source: P,
    dest: P,
    options: &TlkOptions,
    progress: crate::converter::ConvertProgressCallback,
) -> Result<()> {
    use crate::converter::{ConvertPhase, ConvertProgress};

    tracing::info!(
        "Converting XML→TLK: {:?} → {:?}",
        source.as_ref(),
        dest.as_ref()
    );

    progress(&ConvertProgress::with_file(
        ConvertPhase::ReadingSource,
        1,
        3,
        "Reading XML file...",
    ));
    let content = fs::read_to_string(&source)?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::Parsing,
        2,
        3,
        "Parsing XML content...",
    ));
    let table = from_xml(&content)?;

    let bytes = tlk::encode_tlk_with_progress(&table, options, &|percent| {
        progress(&ConvertProgress::new(
            ConvertPhase::Encoding,
            usize::from(percent),
            100,
        ));
    })?;

    progress(&ConvertProgress::with_file(
        ConvertPhase::WritingOutput,
        3,
        3,
        format!("Writing {} entries to TLK...", table.len()),
    ));
    fs::write(dest, bytes)?;

    progress(&ConvertProgress::new(ConvertPhase::Complete, 3, 3));
    tracing::info!("Conversion complete");
    Ok(())
}

/// Split a dotted version into numeric components.
fn version_components(version: &str) -> Result<Vec<u32>> {
    version
        .trim()
        .split('.')
        .map(|part| {
            part.parse().map_err(|_| Error::InvalidXmlField {
                field: "TLKToolVersion",
                value: version.to_string(),
            })
        })
        .collect()
}

/// Reject text tables written by tools older than [`MIN_TOOL_VERSION`].
fn check_tool_version(found: &str) -> Result<()> {
    let mut found_parts = version_components(found)?;
    let mut minimum_parts = version_components(MIN_TOOL_VERSION)?;
    let len = found_parts.len().max(minimum_parts.len());
    found_parts.resize(len, 0);
    minimum_parts.resize(len, 0);

    if found_parts < minimum_parts {
        return Err(Error::UnsupportedToolVersion {
            found: found.to_string(),
            minimum: MIN_TOOL_VERSION,
        });
    }
    Ok(())
}

fn tool_version_of(root: &BytesStart<'_>) -> Result<String> {
    for attr in root.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"TLKToolVersion" {
            return Ok(attr.unescape_value()?.into_owned());
        }
    }
    Ok(UNKNOWN_TOOL_VERSION.to_string())
}

/// Fields of the `<string>` element being read.
#[derive(Default)]
struct PendingString {
    id: Option<String>,
    position: Option<String>,
    data: String,
}

impl PendingString {
    fn finish(self) -> Result<TlkString> {
        let id: i32 = parse_field("id", self.id.as_deref())?;
        let position: usize = parse_field("position", self.position.as_deref())?;
        let text = self.data.replace("\r\n", "\n");

        let data = if id < 0 {
            StringData::Literal(text.trim().parse().map_err(|_| Error::InvalidLiteral {
                id,
                value: text.clone(),
            })?)
        } else {
            StringData::Text(text)
        };
        Ok(TlkString { id, position, data })
    }
}

/// Missing fields read as zero.
fn parse_field<T: std::str::FromStr + Default>(
    field: &'static str,
    value: Option<&str>,
) -> Result<T> {
    match value {
        None => Ok(T::default()),
        Some(value) => value.trim().parse().map_err(|_| Error::InvalidXmlField {
            field,
            value: value.to_string(),
        }),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Position,
    Data,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"id" => Some(Self::Id),
            b"position" => Some(Self::Position),
            b"data" => Some(Self::Data),
            _ => None,
        }
    }
}

fn append_field(pending: &mut PendingString, field: Field, text: &str) {
    match field {
        Field::Id => pending.id.get_or_insert_with(String::new).push_str(text),
        Field::Position => pending.position.get_or_insert_with(String::new).push_str(text),
        Field::Data => pending.data.push_str(text),
    }
}

/// Parse an XML string to a `StringTable`
///
/// Strings are returned sorted by position (stable for equal positions).
///
/// # Errors
/// Returns [`Error::UnsupportedToolVersion`] for tables from tools older than
/// [`MIN_TOOL_VERSION`], or an error if XML parsing or a field fails.
pub fn from_xml(content: &str) -> Result<StringTable> {
    let mut reader = Reader::from_str(content);
    // Don't trim text - leading/trailing whitespace is part of the string
    reader.trim_text(false);

    let mut entries = Vec::new();
    let mut buf = Vec::new();
    let mut tool_version: Option<String> = None;

    let mut pending: Option<PendingString> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"tlkFile" => {
                    let version = tool_version_of(&e)?;
                    check_tool_version(&version)?;
                    tool_version = Some(version);
                }
                b"string" => pending = Some(PendingString::default()),
                name => {
                    if pending.is_some() {
                        field = Field::from_name(name);
                        if let (Some(pending), Some(field)) = (pending.as_mut(), field) {
                            // An element that is present but empty still counts
                            append_field(pending, field, "");
                        }
                    }
                }
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"tlkFile" => {
                    let version = tool_version_of(&e)?;
                    check_tool_version(&version)?;
                    tool_version = Some(version);
                }
                b"string" => entries.push(PendingString::default().finish()?),
                name => {
                    if let (Some(pending), Some(empty)) =
                        (pending.as_mut(), Field::from_name(name))
                    {
                        append_field(pending, empty, "");
                    }
                }
            },
            Ok(Event::Text(e)) => {
                if let (Some(pending), Some(field)) = (pending.as_mut(), field) {
                    let text = e.unescape().map_err(Error::XmlError)?;
                    append_field(pending, field, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(pending), Some(field)) = (pending.as_mut(), field) {
                    let text = String::from_utf8(e.into_inner().into_owned())?;
                    append_field(pending, field, &text);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"string" => {
                    if let Some(done) = pending.take() {
                        entries.push(done.finish()?);
                    }
                    field = None;
                }
                name => {
                    if Field::from_name(name).is_some() {
                        field = None;
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    if tool_version.is_none() {
        check_tool_version(UNKNOWN_TOOL_VERSION)?;
    }

    let mut table = StringTable::from_entries(entries);
    table.sort_by_position();
    tracing::debug!("Parsed {} strings from XML", table.len());
    Ok(table)
}
