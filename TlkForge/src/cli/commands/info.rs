//! CLI command for inspecting talk tables

use std::path::Path;

use crate::config::TlkOptions;
use crate::converter::{FileFormat, tlk_from_xml};
use crate::formats::tlk::{TableStats, read_tlk};

fn print_stats(stats: &TableStats) {
    println!("Strings:     {}", stats.entries);
    println!("  Male:      {}", stats.primary);
    println!("  Female:    {}", stats.secondary);
    println!("  Literals:  {}", stats.literals);
    println!("  Missing:   {}", stats.missing);
    println!("Characters:  {}", stats.characters);
}

/// Show header fields (TLK) and string statistics of a talk table.
pub fn execute(path: &Path, options: &TlkOptions) -> anyhow::Result<()> {
    let format = FileFormat::from_path(path)
        .ok_or_else(|| anyhow::anyhow!("Cannot detect format of {}", path.display()))?;

    println!("Inspecting: {}", path.display());
    println!();

    match format {
        FileFormat::Tlk => {
            let parsed = read_tlk(path, options)?;
            let header = &parsed.header;

            println!("TLK File Information");
            println!("====================");
            println!("Magic:       {:#010X}", header.magic);
            println!("Version:     {} (min {})", header.version, header.min_version);
            println!("Entries:     {} + {}", header.entry1_count, header.entry2_count);
            println!("Tree nodes:  {}", header.tree_node_count);
            println!("Payload:     {} bytes", header.data_len);
            println!(
                "Scan:        {} string starts, {} independent decodes",
                parsed.scanned_strings, parsed.independent_decodes
            );
            println!();
            print_stats(&parsed.table.stats());
        }
        FileFormat::Xml => {
            let content = std::fs::read_to_string(path)?;
            let table = tlk_from_xml(&content)?;

            println!("XML Text Table");
            println!("==============");
            print_stats(&table.stats());
        }
    }

    Ok(())
}
