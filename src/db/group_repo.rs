use rusqlite::{params, Connection};

use crate::error::NexusResult;
use crate::model::{Group, Id};

pub fn insert(conn: &Connection, group: &Group) -> NexusResult<()> {
    conn.execute(
        "INSERT INTO family_groups (id, name, description, parent_id) VALUES (?1, ?2, ?3, ?4)",
        params![
            group.id.to_string(),
            group.name,
            group.description,
            group.parent_id.map(|p| p.to_string()),
        ],
    )?;
    Ok(())
}

/// Replace the stored record with the same id.
pub fn update(conn: &Connection, group: &Group) -> NexusResult<()> {
    conn.execute(
        "UPDATE family_groups SET name = ?1, description = ?2, parent_id = ?3 WHERE id = ?4",
        params![
            group.name,
            group.description,
            group.parent_id.map(|p| p.to_string()),
            group.id.to_string(),
        ],
    )?;
    Ok(())
}

/// Point every direct child of `group_id` at `new_parent`. Returns the number
/// of children moved.
pub fn reparent_children(
    conn: &Connection,
    group_id: Id<Group>,
    new_parent: Option<Id<Group>>,
) -> NexusResult<usize> {
    let moved = conn.execute(
        "UPDATE family_groups SET parent_id = ?1 WHERE parent_id = ?2",
        params![new_parent.map(|p| p.to_string()), group_id.to_string()],
    )?;
    Ok(moved)
}

pub fn delete(conn: &Connection, group_id: Id<Group>) -> NexusResult<()> {
    conn.execute(
        "DELETE FROM group_memberships WHERE group_id = ?1",
        params![group_id.to_string()],
    )?;
    conn.execute("DELETE FROM family_groups WHERE id = ?1", params![group_id.to_string()])?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Group>) -> NexusResult<Option<Group>> {
    let mut stmt = conn.prepare("SELECT id, name, description, parent_id FROM family_groups WHERE id = ?1")?;

    let result = stmt.query_row(params![id.to_string()], |row| Ok(row_to_group(row)));

    match result {
        Ok(group) => Ok(Some(group?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn exists(conn: &Connection, id: Id<Group>) -> NexusResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM family_groups WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn find_all(conn: &Connection) -> NexusResult<Vec<Group>> {
    let mut stmt =
        conn.prepare("SELECT id, name, description, parent_id FROM family_groups ORDER BY name COLLATE NOCASE")?;

    let groups = stmt
        .query_map([], |row| Ok(row_to_group(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(groups)
}

pub fn find_children(conn: &Connection, parent_id: Id<Group>) -> NexusResult<Vec<Group>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, parent_id FROM family_groups WHERE parent_id = ?1 ORDER BY name COLLATE NOCASE",
    )?;

    let groups = stmt
        .query_map(params![parent_id.to_string()], |row| Ok(row_to_group(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(groups)
}

/// Case-insensitive exact name match. The first match by name order wins.
pub fn find_by_name(conn: &Connection, name: &str) -> NexusResult<Option<Group>> {
    let wanted = name.trim().to_lowercase();
    Ok(find_all(conn)?
        .into_iter()
        .find(|g| g.name.to_lowercase() == wanted))
}

fn row_to_group(row: &rusqlite::Row) -> NexusResult<Group> {
    let id_str: String = row.get(0)?;
    let parent_str: Option<String> = row.get(3)?;

    Ok(Group {
        id: Id::from_column(&id_str)?,
        name: row.get(1)?,
        description: row.get(2)?,
        parent_id: parent_str.as_deref().map(Id::from_column).transpose()?,
    })
}
