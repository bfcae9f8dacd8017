use rusqlite::Connection;

use crate::db::{contact_repo, group_repo};
use crate::error::NexusResult;
use crate::hierarchy::{self, GroupNode};
use crate::model::{Contact, Group, Id};

pub fn all_groups(conn: &Connection) -> NexusResult<Vec<Group>> {
    group_repo::find_all(conn)
}

/// The full forest with member and subgroup counts.
pub fn hierarchy(conn: &Connection) -> NexusResult<Vec<GroupNode>> {
    let groups = group_repo::find_all(conn)?;
    let contacts = contact_repo::find_all(conn)?;
    Ok(hierarchy::build_hierarchy(&groups, &contacts, None, 0))
}

/// The forest filtered to groups matching `term` and their ancestors.
pub fn search_hierarchy(conn: &Connection, term: &str) -> NexusResult<Vec<GroupNode>> {
    Ok(hierarchy::filter_hierarchy(&hierarchy(conn)?, term))
}

pub fn find_group_by_name(conn: &Connection, name: &str) -> NexusResult<Option<Group>> {
    group_repo::find_by_name(conn, name)
}

/// Groups whose name or description contains `query`, case-insensitively.
pub fn search_groups(conn: &Connection, query: &str) -> NexusResult<Vec<Group>> {
    let lower = query.trim().to_lowercase();
    Ok(group_repo::find_all(conn)?
        .into_iter()
        .filter(|g| {
            g.name.to_lowercase().contains(&lower)
                || g.description
                    .as_deref()
                    .map(|d| d.to_lowercase().contains(&lower))
                    .unwrap_or(false)
        })
        .collect())
}

/// The groups a contact is tagged with directly, in tagging order. Ids that
/// no longer resolve are skipped.
pub fn groups_for_contact(conn: &Connection, contact: &Contact) -> NexusResult<Vec<Group>> {
    let mut groups = Vec::new();
    for id in &contact.group_ids {
        if let Some(group) = group_repo::find_by_id(conn, *id)? {
            groups.push(group);
        }
    }
    Ok(groups)
}

/// Resolve group ids to display names, skipping unknown ids.
pub fn group_names(conn: &Connection, group_ids: &[Id<Group>]) -> NexusResult<Vec<String>> {
    let mut names = Vec::new();
    for id in group_ids {
        if let Some(group) = group_repo::find_by_id(conn, *id)? {
            names.push(group.name);
        }
    }
    Ok(names)
}

/// Breadcrumb from the root down to the group, e.g. "Patel Society > Savani Parivar".
pub fn group_path(conn: &Connection, group_id: Id<Group>) -> NexusResult<Option<String>> {
    let groups = group_repo::find_all(conn)?;
    let group = match groups.iter().find(|g| g.id == group_id) {
        Some(g) => g,
        None => return Ok(None),
    };

    let mut names: Vec<&str> = hierarchy::ancestor_ids(group_id, &groups)
        .into_iter()
        .rev()
        .filter_map(|id| groups.iter().find(|g| g.id == id))
        .map(|g| g.name.as_str())
        .collect();
    names.push(group.name.as_str());

    Ok(Some(names.join(" > ")))
}

/// Groups that `group_id` may be moved under without creating a cycle.
pub fn valid_parents(conn: &Connection, group_id: Id<Group>) -> NexusResult<Vec<Group>> {
    let groups = group_repo::find_all(conn)?;
    let excluded = hierarchy::descendant_ids(group_id, &groups);
    Ok(groups
        .into_iter()
        .filter(|g| !excluded.contains(&g.id))
        .collect())
}
