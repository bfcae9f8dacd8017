use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use rusqlite::Connection;

use crate::error::NexusResult;
use crate::model::Contact;
use crate::queries::{contact_queries, group_queries, ContactSort};

const CSV_HEADER: [&str; 6] = ["Name", "Phone", "Email", "Alternative Numbers", "Groups", "Notes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Txt,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "txt" | "text" => Some(ExportFormat::Txt),
            _ => None,
        }
    }

    /// Picks the format from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
            .unwrap_or(ExportFormat::Csv)
    }
}

/// Writes every contact, sorted by name. Returns the number written.
pub fn export_contacts(conn: &Connection, format: ExportFormat, out: &mut impl Write) -> NexusResult<usize> {
    let mut contacts = contact_queries::all_contacts(conn)?;
    contact_queries::sort_contacts(&mut contacts, ContactSort::NameAsc);

    match format {
        ExportFormat::Csv => write_csv(conn, &contacts, out)?,
        ExportFormat::Txt => write_txt(conn, &contacts, out)?,
    }
    out.flush()?;

    log::info!("exported {} contact(s) as {:?}", contacts.len(), format);
    Ok(contacts.len())
}

pub fn export_to_path(conn: &Connection, format: ExportFormat, path: &Path) -> NexusResult<usize> {
    let mut out = BufWriter::new(File::create(path)?);
    export_contacts(conn, format, &mut out)
}

fn write_csv(conn: &Connection, contacts: &[Contact], out: &mut impl Write) -> NexusResult<()> {
    writeln!(out, "{}", CSV_HEADER.join(","))?;
    for contact in contacts {
        let groups = group_queries::group_names(conn, &contact.group_ids)?.join("; ");
        let alternatives = contact.alternative_numbers.join("; ");
        let row: [&str; 6] = [
            &contact.name,
            &contact.phone_number,
            contact.email.as_deref().unwrap_or(""),
            &alternatives,
            &groups,
            contact.notes.as_deref().unwrap_or(""),
        ];
        let fields: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
        writeln!(out, "{}", fields.join(","))?;
    }
    Ok(())
}

fn write_txt(conn: &Connection, contacts: &[Contact], out: &mut impl Write) -> NexusResult<()> {
    writeln!(out, "Contacts exported {}", Utc::now().format("%Y-%m-%d"))?;

    for contact in contacts {
        writeln!(out)?;
        writeln!(out, "Name: {}", contact.name)?;
        writeln!(out, "Phone: {}", contact.phone_number)?;
        if !contact.alternative_numbers.is_empty() {
            writeln!(out, "Alternative Numbers: {}", contact.alternative_numbers.join(", "))?;
        }
        if let Some(ref email) = contact.email {
            writeln!(out, "Email: {}", email)?;
        }
        for dn in &contact.display_names {
            writeln!(out, "Name ({}): {}", dn.lang, dn.name)?;
        }
        for address in &contact.addresses {
            match address.label.as_deref() {
                Some(label) => writeln!(out, "Address ({}): {}", label, address.one_line())?,
                None => writeln!(out, "Address: {}", address.one_line())?,
            }
        }
        let groups = group_queries::group_names(conn, &contact.group_ids)?;
        if !groups.is_empty() {
            writeln!(out, "Groups: {}", groups.join(", "))?;
        }
        if let Some(ref notes) = contact.notes {
            writeln!(out, "Notes: {}", notes)?;
        }
    }
    Ok(())
}

/// Quotes a field when it contains a delimiter, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
