use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::{NexusError, NexusResult};
use crate::model::{Contact, ContactSource, DisplayLang, DisplayName, Group, Id, LabeledAddress};

pub fn insert(conn: &Connection, contact: &Contact) -> NexusResult<()> {
    conn.execute(
        "INSERT INTO contacts (id, name, phone_number, email, notes, avatar_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            contact.id.to_string(),
            contact.name,
            contact.phone_number,
            contact.email,
            contact.notes,
            contact.avatar_url,
            contact.created_at.to_rfc3339(),
        ],
    )?;
    insert_details(conn, contact)
}

/// Replace the stored record with the same id, including every
/// multi-valued field.
pub fn update(conn: &Connection, contact: &Contact) -> NexusResult<()> {
    conn.execute(
        "UPDATE contacts SET name = ?1, phone_number = ?2, email = ?3, notes = ?4, avatar_url = ?5
         WHERE id = ?6",
        params![
            contact.name,
            contact.phone_number,
            contact.email,
            contact.notes,
            contact.avatar_url,
            contact.id.to_string(),
        ],
    )?;
    delete_details(conn, contact.id)?;
    insert_details(conn, contact)
}

pub fn delete(conn: &Connection, contact_id: Id<Contact>) -> NexusResult<()> {
    delete_details(conn, contact_id)?;
    conn.execute("DELETE FROM contacts WHERE id = ?1", params![contact_id.to_string()])?;
    Ok(())
}

pub fn set_groups(conn: &Connection, contact_id: Id<Contact>, group_ids: &[Id<Group>]) -> NexusResult<()> {
    conn.execute(
        "DELETE FROM group_memberships WHERE contact_id = ?1",
        params![contact_id.to_string()],
    )?;
    insert_groups(conn, contact_id, group_ids)
}

pub fn find_by_id(conn: &Connection, id: Id<Contact>) -> NexusResult<Option<Contact>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone_number, email, notes, avatar_url, created_at
         FROM contacts WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| Ok(row_to_contact(row)));

    match result {
        Ok(contact) => {
            let mut contact = contact?;
            load_details(conn, &mut contact)?;
            Ok(Some(contact))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_all(conn: &Connection) -> NexusResult<Vec<Contact>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone_number, email, notes, avatar_url, created_at
         FROM contacts ORDER BY name COLLATE NOCASE",
    )?;

    let mut contacts = stmt
        .query_map([], |row| Ok(row_to_contact(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    for contact in &mut contacts {
        load_details(conn, contact)?;
    }

    Ok(contacts)
}

pub fn count(conn: &Connection) -> NexusResult<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
    Ok(n as usize)
}

fn insert_details(conn: &Connection, contact: &Contact) -> NexusResult<()> {
    let id = contact.id.to_string();

    for (pos, number) in contact.alternative_numbers.iter().enumerate() {
        conn.execute(
            "INSERT INTO contact_alternative_numbers (contact_id, position, number) VALUES (?1, ?2, ?3)",
            params![id, pos as i64, number],
        )?;
    }

    for (pos, addr) in contact.addresses.iter().enumerate() {
        conn.execute(
            "INSERT INTO contact_addresses (contact_id, position, label, street, city, state, zip, country)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                pos as i64,
                addr.label,
                addr.street,
                addr.city,
                addr.state,
                addr.zip,
                addr.country,
            ],
        )?;
    }

    for dn in &contact.display_names {
        conn.execute(
            "INSERT OR REPLACE INTO contact_display_names (contact_id, lang, name) VALUES (?1, ?2, ?3)",
            params![id, dn.lang.as_str(), dn.name],
        )?;
    }

    for source in &contact.sources {
        conn.execute(
            "INSERT OR IGNORE INTO contact_sources (contact_id, source) VALUES (?1, ?2)",
            params![id, source.as_str()],
        )?;
    }

    insert_groups(conn, contact.id, &contact.group_ids)
}

fn insert_groups(conn: &Connection, contact_id: Id<Contact>, group_ids: &[Id<Group>]) -> NexusResult<()> {
    for (pos, group_id) in group_ids.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO group_memberships (contact_id, group_id, position) VALUES (?1, ?2, ?3)",
            params![contact_id.to_string(), group_id.to_string(), pos as i64],
        )?;
    }
    Ok(())
}

fn delete_details(conn: &Connection, contact_id: Id<Contact>) -> NexusResult<()> {
    let id = contact_id.to_string();
    for table in [
        "contact_alternative_numbers",
        "contact_addresses",
        "contact_display_names",
        "contact_sources",
        "group_memberships",
    ] {
        conn.execute(&format!("DELETE FROM {} WHERE contact_id = ?1", table), params![id])?;
    }
    Ok(())
}

fn load_details(conn: &Connection, contact: &mut Contact) -> NexusResult<()> {
    let id = contact.id.to_string();

    let mut stmt = conn.prepare(
        "SELECT number FROM contact_alternative_numbers WHERE contact_id = ?1 ORDER BY position",
    )?;
    contact.alternative_numbers = stmt
        .query_map(params![id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT label, street, city, state, zip, country FROM contact_addresses
         WHERE contact_id = ?1 ORDER BY position",
    )?;
    contact.addresses = stmt
        .query_map(params![id], |row| {
            Ok(LabeledAddress {
                label: row.get(0)?,
                street: row.get(1)?,
                city: row.get(2)?,
                state: row.get(3)?,
                zip: row.get(4)?,
                country: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt =
        conn.prepare("SELECT lang, name FROM contact_display_names WHERE contact_id = ?1")?;
    let mut display_names = stmt
        .query_map(params![id], |row| {
            let lang: String = row.get(0)?;
            let name: String = row.get(1)?;
            Ok((lang, name))
        })?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|(lang, name)| {
            let lang = DisplayLang::parse(&lang)
                .ok_or_else(|| NexusError::Other(format!("Unknown display language: {}", lang)))?;
            Ok(DisplayName { lang, name })
        })
        .collect::<NexusResult<Vec<_>>>()?;
    display_names.sort_by_key(|dn| dn.lang);
    contact.display_names = display_names;

    let mut stmt = conn.prepare("SELECT source FROM contact_sources WHERE contact_id = ?1 ORDER BY source")?;
    contact.sources = stmt
        .query_map(params![id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|s| {
            ContactSource::parse(&s)
                .ok_or_else(|| NexusError::Other(format!("Unknown contact source: {}", s)))
        })
        .collect::<NexusResult<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT group_id FROM group_memberships WHERE contact_id = ?1 ORDER BY position",
    )?;
    contact.group_ids = stmt
        .query_map(params![id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|s| Id::from_column(&s))
        .collect::<NexusResult<Vec<_>>>()?;

    Ok(())
}

fn row_to_contact(row: &rusqlite::Row) -> NexusResult<Contact> {
    let id_str: String = row.get(0)?;
    let created_str: String = row.get(6)?;
    let created_at = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| NexusError::Other(format!("Invalid timestamp: {}", e)))?;

    Ok(Contact {
        id: Id::from_column(&id_str)?,
        name: row.get(1)?,
        phone_number: row.get(2)?,
        email: row.get(3)?,
        notes: row.get(4)?,
        avatar_url: row.get(5)?,
        alternative_numbers: Vec::new(),
        addresses: Vec::new(),
        display_names: Vec::new(),
        group_ids: Vec::new(),
        sources: Vec::new(),
        created_at,
    })
}
