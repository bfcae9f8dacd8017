use rusqlite::Connection;

use crate::ai::{GroupSuggester, GroupSuggestion, SuggestionRequest};
use crate::db::{contact_repo, group_repo};
use crate::error::{NexusError, NexusResult};
use crate::model::{Contact, Group, Id};
use crate::ops::contact_ops;

const FAMILY_KEYWORDS: [&str; 4] = ["parent", "sibling", "cousin", "family"];
const FRIEND_KEYWORDS: [&str; 1] = ["friend"];

fn name_has_any(name: &str, keywords: &[&str]) -> bool {
    let lower = name.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// Gathers what the suggester needs to know. Group names are sorted into
/// family-like and friend-like buckets by keyword.
pub fn build_request(conn: &Connection, contact_name: &str) -> NexusResult<SuggestionRequest> {
    let contact_name = contact_name.trim();
    if contact_name.is_empty() {
        return Err(NexusError::BlankField {
            field: "contact name".into(),
        });
    }

    let groups = group_repo::find_all(conn)?;
    let existing_contact_names = contact_repo::find_all(conn)?
        .into_iter()
        .map(|c| c.name)
        .collect();

    Ok(SuggestionRequest {
        contact_name: contact_name.to_string(),
        existing_contact_names,
        family_group_names: groups
            .iter()
            .filter(|g| name_has_any(&g.name, &FAMILY_KEYWORDS))
            .map(|g| g.name.clone())
            .collect(),
        friend_group_names: groups
            .iter()
            .filter(|g| name_has_any(&g.name, &FRIEND_KEYWORDS))
            .map(|g| g.name.clone())
            .collect(),
    })
}

/// Builds the request from the store, then calls the suggester. No
/// transaction is open while the suggester runs.
pub fn suggest_for(
    conn: &Connection,
    suggester: &dyn GroupSuggester,
    contact_name: &str,
) -> NexusResult<GroupSuggestion> {
    let request = build_request(conn, contact_name)?;
    let suggestion = suggester.suggest(&request).map_err(NexusError::Other)?;
    log::debug!(
        "suggestion for {}: {:?} ({:.2})",
        request.contact_name,
        suggestion.suggested_group,
        suggestion.confidence
    );
    Ok(suggestion)
}

/// The group whose name equals the suggested one, ignoring case.
pub fn resolve_suggestion(conn: &Connection, suggestion: &GroupSuggestion) -> NexusResult<Option<Group>> {
    match suggestion.suggested_group.as_deref() {
        Some(name) => group_repo::find_by_name(conn, name),
        None => Ok(None),
    }
}

/// Adds the contact to the suggested group. Fails with `NotFound` when the
/// suggestion names no existing group.
pub fn accept_suggestion(
    conn: &Connection,
    contact_id: Id<Contact>,
    suggestion: &GroupSuggestion,
) -> NexusResult<(Contact, Group)> {
    let group = resolve_suggestion(conn, suggestion)?.ok_or_else(|| NexusError::NotFound {
        entity_type: "Group".into(),
        id: suggestion
            .suggested_group
            .clone()
            .unwrap_or_else(|| "(no suggestion)".into()),
    })?;

    let contact = contact_ops::add_to_group(conn, contact_id, group.id)?;
    Ok((contact, group))
}
