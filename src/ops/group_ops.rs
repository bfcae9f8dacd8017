use rusqlite::Connection;

use crate::db::group_repo;
use crate::error::{NexusError, NexusResult};
use crate::hierarchy::ancestor_ids;
use crate::model::{Group, Id};
use crate::validation::{self, trim_optional};

pub fn create_group(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
    parent_id: Option<Id<Group>>,
) -> NexusResult<Group> {
    let valid_name = validation::non_blank(name, "name")?;

    if let Some(parent) = parent_id {
        ensure_group_exists(conn, parent)?;
    }

    let group = Group::create(valid_name, trim_optional(description), parent_id);
    group_repo::insert(conn, &group)?;

    log::info!("created group {} ({})", group.name, group.id);
    Ok(group)
}

/// Replaces the name, description and parent of a group. A new parent must
/// exist and must not be the group itself or one of its descendants.
pub fn update_group(
    conn: &Connection,
    group_id: Id<Group>,
    name: &str,
    description: Option<&str>,
    parent_id: Option<Id<Group>>,
) -> NexusResult<Group> {
    let mut group = find_group(conn, group_id)?;
    let valid_name = validation::non_blank(name, "name")?;

    if let Some(parent) = parent_id {
        if parent == group_id {
            return Err(cycle(group_id, parent));
        }
        if group.parent_id != Some(parent) {
            ensure_group_exists(conn, parent)?;
            let groups = group_repo::find_all(conn)?;
            if ancestor_ids(parent, &groups).contains(&group_id) {
                return Err(cycle(group_id, parent));
            }
        }
    }

    let moved = group.parent_id != parent_id;
    group.name = valid_name;
    group.description = trim_optional(description);
    group.parent_id = parent_id;

    group_repo::update(conn, &group)?;

    if moved {
        log::info!(
            "moved group {} under {}",
            group.id,
            parent_id.map(|p| p.to_string()).unwrap_or_else(|| "top level".into())
        );
    } else {
        log::info!("updated group {}", group.id);
    }
    Ok(group)
}

/// Changes only the parent of a group, keeping its name and description.
pub fn move_group(
    conn: &Connection,
    group_id: Id<Group>,
    parent_id: Option<Id<Group>>,
) -> NexusResult<Group> {
    let group = find_group(conn, group_id)?;
    update_group(conn, group_id, &group.name, group.description.as_deref(), parent_id)
}

/// Removes a group. Its direct children are lifted to its former parent and
/// every membership pointing at it is dropped, all in one transaction.
pub fn delete_group(conn: &Connection, group_id: Id<Group>) -> NexusResult<()> {
    let group = find_group(conn, group_id)?;

    let tx = conn.unchecked_transaction()?;
    let moved = group_repo::reparent_children(&tx, group_id, group.parent_id)?;
    group_repo::delete(&tx, group_id)?;
    tx.commit()?;

    log::info!(
        "deleted group {} ({}), re-parented {} child group(s)",
        group.name,
        group.id,
        moved
    );
    Ok(())
}

fn find_group(conn: &Connection, group_id: Id<Group>) -> NexusResult<Group> {
    group_repo::find_by_id(conn, group_id)?.ok_or_else(|| NexusError::group_not_found(group_id))
}

pub(crate) fn ensure_group_exists(conn: &Connection, group_id: Id<Group>) -> NexusResult<()> {
    if group_repo::exists(conn, group_id)? {
        Ok(())
    } else {
        Err(NexusError::group_not_found(group_id))
    }
}

fn cycle(group_id: Id<Group>, parent_id: Id<Group>) -> NexusError {
    NexusError::Cycle {
        group_id: group_id.to_string(),
        parent_id: parent_id.to_string(),
    }
}
