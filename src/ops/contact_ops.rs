use rusqlite::Connection;

use crate::db::contact_repo;
use crate::error::{NexusError, NexusResult};
use crate::model::{
    Contact, ContactSource, DisplayLang, Group, Id, LabeledAddress, MAX_ADDRESSES,
    MAX_ALTERNATIVE_NUMBERS,
};
use crate::ops::group_ops::ensure_group_exists;
use crate::validation::{self, trim_optional};

/// Editable fields of a contact, as submitted by a form or an importer.
#[derive(Debug, Clone, Default)]
pub struct ContactInput {
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub avatar_url: Option<String>,
    pub alternative_numbers: Vec<String>,
    pub addresses: Vec<LabeledAddress>,
    pub display_names: Vec<(DisplayLang, String)>,
    pub group_ids: Vec<Id<Group>>,
    pub sources: Vec<ContactSource>,
}

impl ContactInput {
    pub fn new(name: &str, phone_number: &str) -> Self {
        Self {
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            ..Default::default()
        }
    }

    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            phone_number: contact.phone_number.clone(),
            email: contact.email.clone(),
            notes: contact.notes.clone(),
            avatar_url: contact.avatar_url.clone(),
            alternative_numbers: contact.alternative_numbers.clone(),
            addresses: contact.addresses.clone(),
            display_names: contact
                .display_names
                .iter()
                .map(|dn| (dn.lang, dn.name.clone()))
                .collect(),
            group_ids: contact.group_ids.clone(),
            sources: contact.sources.clone(),
        }
    }
}

pub fn add_contact(conn: &Connection, input: ContactInput) -> NexusResult<Contact> {
    let name = validation::non_blank(&input.name, "name")?;
    let phone = validation::non_blank(&input.phone_number, "phone number")?;

    let mut contact = Contact::create(name, phone);
    apply_input(conn, &mut contact, input)?;
    in_transaction(conn, |conn| contact_repo::insert(conn, &contact))?;

    log::info!("added contact {} ({})", contact.name, contact.id);
    Ok(contact)
}

/// Replaces every editable field of an existing contact. The id and
/// creation time are kept.
pub fn update_contact(
    conn: &Connection,
    contact_id: Id<Contact>,
    input: ContactInput,
) -> NexusResult<Contact> {
    let mut contact = find_contact(conn, contact_id)?;
    contact.name = validation::non_blank(&input.name, "name")?;
    contact.phone_number = validation::non_blank(&input.phone_number, "phone number")?;
    apply_input(conn, &mut contact, input)?;

    in_transaction(conn, |conn| contact_repo::update(conn, &contact))?;
    log::info!("updated contact {}", contact.id);
    Ok(contact)
}

pub fn delete_contact(conn: &Connection, contact_id: Id<Contact>) -> NexusResult<()> {
    let contact = find_contact(conn, contact_id)?;
    in_transaction(conn, |conn| contact_repo::delete(conn, contact_id))?;
    log::info!("deleted contact {} ({})", contact.name, contact.id);
    Ok(())
}

pub fn add_to_group(
    conn: &Connection,
    contact_id: Id<Contact>,
    group_id: Id<Group>,
) -> NexusResult<Contact> {
    let mut contact = find_contact(conn, contact_id)?;
    ensure_group_exists(conn, group_id)?;

    if contact.join(group_id) {
        in_transaction(conn, |conn| contact_repo::set_groups(conn, contact.id, &contact.group_ids))?;
    }
    Ok(contact)
}

pub fn remove_from_group(
    conn: &Connection,
    contact_id: Id<Contact>,
    group_id: Id<Group>,
) -> NexusResult<Contact> {
    let mut contact = find_contact(conn, contact_id)?;

    if contact.leave(group_id) {
        in_transaction(conn, |conn| contact_repo::set_groups(conn, contact.id, &contact.group_ids))?;
    }
    Ok(contact)
}

pub fn set_groups(
    conn: &Connection,
    contact_id: Id<Contact>,
    group_ids: Vec<Id<Group>>,
) -> NexusResult<Contact> {
    let mut contact = find_contact(conn, contact_id)?;
    contact.group_ids = checked_groups(conn, group_ids)?;
    in_transaction(conn, |conn| contact_repo::set_groups(conn, contact.id, &contact.group_ids))?;
    Ok(contact)
}

/// Runs a multi-statement write so it either lands whole or not at all.
/// Inside an enclosing transaction (an import) the write joins it instead.
fn in_transaction<F>(conn: &Connection, write: F) -> NexusResult<()>
where
    F: FnOnce(&Connection) -> NexusResult<()>,
{
    if !conn.is_autocommit() {
        return write(conn);
    }
    let tx = conn.unchecked_transaction()?;
    write(&tx)?;
    tx.commit()?;
    Ok(())
}

fn apply_input(conn: &Connection, contact: &mut Contact, input: ContactInput) -> NexusResult<()> {
    contact.email = validation::optional_email(input.email.as_deref())?;
    contact.notes = trim_optional(input.notes.as_deref());
    contact.avatar_url = trim_optional(input.avatar_url.as_deref());

    let numbers: Vec<String> = input
        .alternative_numbers
        .iter()
        .filter_map(|n| trim_optional(Some(n.as_str())))
        .collect();
    validation::at_most(&numbers, MAX_ALTERNATIVE_NUMBERS, "alternative numbers")?;
    contact.alternative_numbers = numbers;

    let addresses = input
        .addresses
        .iter()
        .map(normalize_address)
        .collect::<NexusResult<Vec<_>>>()?
        .into_iter()
        .filter(|a| !a.is_blank())
        .collect::<Vec<_>>();
    validation::at_most(&addresses, MAX_ADDRESSES, "addresses")?;
    contact.addresses = addresses;

    contact.display_names.clear();
    for (lang, name) in input.display_names {
        if let Some(name) = trim_optional(Some(name.as_str())) {
            contact.set_display_name(lang, name);
        }
    }

    let mut sources = input.sources;
    sources.sort_by_key(|s| s.as_str());
    sources.dedup();
    contact.sources = sources;

    contact.group_ids = checked_groups(conn, input.group_ids)?;
    Ok(())
}

fn normalize_address(address: &LabeledAddress) -> NexusResult<LabeledAddress> {
    Ok(LabeledAddress {
        label: trim_optional(address.label.as_deref()),
        street: trim_optional(address.street.as_deref()),
        city: trim_optional(address.city.as_deref()),
        state: trim_optional(address.state.as_deref()),
        zip: validation::optional_zip(address.zip.as_deref())?,
        country: trim_optional(address.country.as_deref()),
    })
}

/// Deduplicates group ids, keeping first-seen order, and rejects ids that
/// are not in the group store.
fn checked_groups(conn: &Connection, group_ids: Vec<Id<Group>>) -> NexusResult<Vec<Id<Group>>> {
    let mut out: Vec<Id<Group>> = Vec::with_capacity(group_ids.len());
    for id in group_ids {
        if !out.contains(&id) {
            ensure_group_exists(conn, id)?;
            out.push(id);
        }
    }
    Ok(out)
}

fn find_contact(conn: &Connection, contact_id: Id<Contact>) -> NexusResult<Contact> {
    contact_repo::find_by_id(conn, contact_id)?
        .ok_or_else(|| NexusError::contact_not_found(contact_id))
}
