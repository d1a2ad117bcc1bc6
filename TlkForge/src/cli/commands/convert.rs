//! CLI interface for format conversion
use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{percent_bar, print_done, show_progress};
use crate::config::TlkOptions;
use crate::converter::{self, FileFormat};

fn resolve_format(explicit: Option<&str>, path: &Path, role: &str) -> anyhow::Result<FileFormat> {
    match explicit {
        Some(fmt) => FileFormat::from_extension(fmt)
            .ok_or_else(|| anyhow::anyhow!("Unknown {role} format '{fmt}' (expected tlk or xml)")),
        None => FileFormat::from_path(path).ok_or_else(|| {
            anyhow::anyhow!("Cannot detect {role} format from file extension of {}", path.display())
        }),
    }
}

pub fn execute(
    source: &Path,
    destination: &Path,
    input_format: Option<&str>,
    output_format: Option<&str>,
    options: &TlkOptions,
    progress: bool,
) -> anyhow::Result<()> {
    let input = resolve_format(input_format, source, "input")?;
    let output = resolve_format(output_format, destination, "output")?;

    println!("Converting {} to {}", source.display(), destination.display());
    let start = Instant::now();

    match (input, output) {
        (FileFormat::Tlk, FileFormat::Xml) => {
            if progress {
                let pb = percent_bar("Decoding strings");
                converter::convert_tlk_to_xml_with_progress(source, destination, options, &|p| {
                    show_progress(&pb, p);
                })?;
            } else {
                converter::convert_tlk_to_xml(source, destination, options)?;
            }
        }
        (FileFormat::Xml, FileFormat::Tlk) => {
            if progress {
                let pb = percent_bar("Encoding strings");
                converter::convert_xml_to_tlk_with_progress(source, destination, options, &|p| {
                    show_progress(&pb, p);
                })?;
            } else {
                converter::convert_xml_to_tlk(source, destination, options)?;
            }
        }
        (FileFormat::Tlk, FileFormat::Tlk) | (FileFormat::Xml, FileFormat::Xml) => {
            println!("Source and destination formats are the same, copying file...");
            std::fs::copy(source, destination)?;
        }
    }

    if progress {
        print_done(start.elapsed());
    }
    Ok(())
}
