use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;
use serde::Deserialize;

use crate::error::NexusResult;
use crate::model::{ContactSource, DisplayLang, Group, Id, LabeledAddress};
use crate::ops::{contact_ops, group_ops, ContactInput};

/// Counts reported after an import.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub groups: usize,
    pub contacts: usize,
    pub skipped_groups: usize,
    pub skipped_contacts: usize,
    /// Parent or membership references to groups that were not imported.
    pub dropped_references: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    Book {
        #[serde(default)]
        groups: Vec<ImportGroup>,
        #[serde(default)]
        contacts: Vec<ImportContact>,
    },
    ContactsOnly(Vec<ImportContact>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportGroup {
    id: String,
    #[serde(default)]
    name: String,
    description: Option<String>,
    parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportContact {
    #[serde(default)]
    name: String,
    #[serde(default)]
    phone_number: String,
    email: Option<String>,
    notes: Option<String>,
    avatar_url: Option<String>,
    #[serde(default)]
    alternative_numbers: Vec<String>,
    #[serde(default)]
    addresses: Vec<LabeledAddress>,
    #[serde(default)]
    display_names: Vec<ImportDisplayName>,
    #[serde(default)]
    group_ids: Vec<String>,
    #[serde(default)]
    sources: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ImportDisplayName {
    lang: String,
    name: String,
}

pub fn import_json(conn: &Connection, path: &Path) -> NexusResult<ImportStats> {
    let json = std::fs::read_to_string(path)?;
    import_str(conn, &json)
}

/// Imports groups and contacts. Every record gets a fresh id; the source
/// ids are only used to wire up parents and memberships. Invalid records are
/// skipped and counted. Nothing is written unless the whole import succeeds.
pub fn import_str(conn: &Connection, json: &str) -> NexusResult<ImportStats> {
    let (groups, contacts) = match serde_json::from_str::<ImportDocument>(json)? {
        ImportDocument::Book { groups, contacts } => (groups, contacts),
        ImportDocument::ContactsOnly(contacts) => (Vec::new(), contacts),
    };

    let tx = conn.unchecked_transaction()?;
    let mut stats = ImportStats::default();

    let id_map = import_groups(&tx, groups, &mut stats)?;

    for source in contacts {
        let mut input = ContactInput::new(&source.name, &source.phone_number);
        input.email = source.email;
        input.notes = source.notes;
        input.avatar_url = source.avatar_url;
        input.alternative_numbers = source.alternative_numbers;
        input.addresses = source.addresses;
        input.display_names = source
            .display_names
            .into_iter()
            .filter_map(|dn| DisplayLang::parse(&dn.lang).map(|lang| (lang, dn.name)))
            .collect();
        input.sources = source
            .sources
            .iter()
            .filter_map(|s| ContactSource::parse(s))
            .collect();

        for group_ref in &source.group_ids {
            match id_map.get(group_ref.as_str()) {
                Some(id) => input.group_ids.push(*id),
                None => {
                    log::warn!("contact {} references unknown group {}", source.name, group_ref);
                    stats.dropped_references += 1;
                }
            }
        }

        match contact_ops::add_contact(&tx, input) {
            Ok(_) => stats.contacts += 1,
            Err(e) if e.kind() == crate::error::ErrorKind::Validation => {
                log::warn!("skipping contact {:?}: {}", source.name, e);
                stats.skipped_contacts += 1;
            }
            Err(e) => return Err(e),
        }
    }

    tx.commit()?;
    log::info!(
        "imported {} group(s) and {} contact(s)",
        stats.groups,
        stats.contacts
    );
    Ok(stats)
}

/// Inserts groups parents-first. A group whose parent never resolves (unknown
/// id, skipped parent, or a cycle in the source data) is imported at the top
/// level.
fn import_groups(
    conn: &Connection,
    groups: Vec<ImportGroup>,
    stats: &mut ImportStats,
) -> NexusResult<HashMap<String, Id<Group>>> {
    let known: HashMap<String, usize> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| (g.id.clone(), i))
        .collect();

    let mut id_map: HashMap<String, Id<Group>> = HashMap::new();
    let mut done = vec![false; groups.len()];

    loop {
        let mut progressed = false;

        for (i, source) in groups.iter().enumerate() {
            if done[i] {
                continue;
            }
            let parent = match source.parent_id.as_deref() {
                None => None,
                Some(pid) if !known.contains_key(pid) => {
                    log::warn!("group {} has unknown parent {}", source.id, pid);
                    stats.dropped_references += 1;
                    None
                }
                Some(pid) => match id_map.get(pid) {
                    Some(id) => Some(*id),
                    None if done[known[pid]] => {
                        stats.dropped_references += 1;
                        None
                    }
                    None => continue,
                },
            };

            insert_group(conn, source, parent, &mut id_map, stats)?;
            done[i] = true;
            progressed = true;
        }

        if done.iter().all(|d| *d) {
            break;
        }
        if !progressed {
            // Only parent cycles remain; break one by importing it at the top.
            if let Some(i) = done.iter().position(|d| !d) {
                log::warn!("group {} is part of a parent cycle, importing at top level", groups[i].id);
                stats.dropped_references += 1;
                insert_group(conn, &groups[i], None, &mut id_map, stats)?;
                done[i] = true;
            }
        }
    }

    Ok(id_map)
}

fn insert_group(
    conn: &Connection,
    source: &ImportGroup,
    parent: Option<Id<Group>>,
    id_map: &mut HashMap<String, Id<Group>>,
    stats: &mut ImportStats,
) -> NexusResult<()> {
    match group_ops::create_group(conn, &source.name, source.description.as_deref(), parent) {
        Ok(group) => {
            id_map.insert(source.id.clone(), group.id);
            stats.groups += 1;
            Ok(())
        }
        Err(e) if e.kind() == crate::error::ErrorKind::Validation => {
            log::warn!("skipping group {}: {}", source.id, e);
            stats.skipped_groups += 1;
            Ok(())
        }
        Err(e) => Err(e),
    }
}
