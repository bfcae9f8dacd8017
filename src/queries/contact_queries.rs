use std::collections::HashMap;

use rusqlite::Connection;

use crate::db::{contact_repo, group_repo};
use crate::error::NexusResult;
use crate::hierarchy;
use crate::model::{Contact, Group, Id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactSort {
    #[default]
    NameAsc,
    NameDesc,
}

impl ContactSort {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "name-asc" | "asc" | "a-z" => Some(ContactSort::NameAsc),
            "name-desc" | "desc" | "z-a" => Some(ContactSort::NameDesc),
            _ => None,
        }
    }
}

/// What the contact list should show: an optional group subtree, an
/// optional search term, and an order.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub group_id: Option<Id<Group>>,
    pub term: Option<String>,
    pub sort: ContactSort,
}

pub fn all_contacts(conn: &Connection) -> NexusResult<Vec<Contact>> {
    contact_repo::find_all(conn)
}

pub fn find_contact(conn: &Connection, contact_id: Id<Contact>) -> NexusResult<Option<Contact>> {
    contact_repo::find_by_id(conn, contact_id)
}

/// Contacts tagged with the group or any of its descendants.
pub fn contacts_in_group(conn: &Connection, group_id: Id<Group>) -> NexusResult<Vec<Contact>> {
    let groups = group_repo::find_all(conn)?;
    let contacts = contact_repo::find_all(conn)?;
    Ok(hierarchy::members(group_id, &groups, &contacts)
        .into_iter()
        .cloned()
        .collect())
}

pub fn search_contacts(conn: &Connection, term: &str) -> NexusResult<Vec<Contact>> {
    list_contacts(
        conn,
        &ContactFilter {
            term: Some(term.to_string()),
            ..Default::default()
        },
    )
}

/// Applies the group filter, then the search term, then the sort.
pub fn list_contacts(conn: &Connection, filter: &ContactFilter) -> NexusResult<Vec<Contact>> {
    let groups = group_repo::find_all(conn)?;
    let mut contacts = contact_repo::find_all(conn)?;

    if let Some(group_id) = filter.group_id {
        let closure = hierarchy::descendant_ids(group_id, &groups);
        contacts.retain(|c| c.group_ids.iter().any(|id| closure.contains(id)));
    }

    if let Some(term) = filter.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let names: HashMap<Id<Group>, &str> =
            groups.iter().map(|g| (g.id, g.name.as_str())).collect();
        contacts.retain(|c| matches_term(c, term, &names));
    }

    sort_contacts(&mut contacts, filter.sort);
    Ok(contacts)
}

/// Case-insensitive substring match over every searchable contact field,
/// including the names of the contact's groups.
pub fn matches_term(contact: &Contact, term: &str, group_names: &HashMap<Id<Group>, &str>) -> bool {
    let lower = term.to_lowercase();
    let hit = |value: &str| value.to_lowercase().contains(&lower);
    let hit_opt = |value: &Option<String>| value.as_deref().map(hit).unwrap_or(false);

    hit(&contact.name)
        || hit(&contact.phone_number)
        || contact.alternative_numbers.iter().any(|n| hit(n))
        || hit_opt(&contact.email)
        || hit_opt(&contact.notes)
        || contact.addresses.iter().any(|a| {
            hit_opt(&a.street)
                || hit_opt(&a.city)
                || hit_opt(&a.state)
                || hit_opt(&a.zip)
                || hit_opt(&a.country)
        })
        || contact.display_names.iter().any(|dn| hit(&dn.name))
        || contact
            .group_ids
            .iter()
            .filter_map(|id| group_names.get(id))
            .any(|name| hit(*name))
}

pub fn sort_contacts(contacts: &mut [Contact], sort: ContactSort) {
    contacts.sort_by(|a, b| {
        let ord = a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id));
        match sort {
            ContactSort::NameAsc => ord,
            ContactSort::NameDesc => ord.reverse(),
        }
    });
}
