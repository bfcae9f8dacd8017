use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::group::Group;
use super::ids::Id;

pub const MAX_ALTERNATIVE_NUMBERS: usize = 5;
pub const MAX_ADDRESSES: usize = 3;

/// Languages a contact's alternative display name can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLang {
    En,
    Gu,
    Hi,
}

impl DisplayLang {
    pub const ALL: [DisplayLang; 3] = [DisplayLang::En, DisplayLang::Gu, DisplayLang::Hi];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayLang::En => "en",
            DisplayLang::Gu => "gu",
            DisplayLang::Hi => "hi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" => Some(DisplayLang::En),
            "gu" => Some(DisplayLang::Gu),
            "hi" => Some(DisplayLang::Hi),
            _ => None,
        }
    }
}

impl fmt::Display for DisplayLang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contact's name written in a particular language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName {
    pub lang: DisplayLang,
    pub name: String,
}

/// Where a contact record came from. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactSource {
    Gmail,
    Sim,
    Whatsapp,
    Other,
    Csv,
}

impl ContactSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactSource::Gmail => "gmail",
            ContactSource::Sim => "sim",
            ContactSource::Whatsapp => "whatsapp",
            ContactSource::Other => "other",
            ContactSource::Csv => "csv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gmail" => Some(ContactSource::Gmail),
            "sim" => Some(ContactSource::Sim),
            "whatsapp" => Some(ContactSource::Whatsapp),
            "other" => Some(ContactSource::Other),
            "csv" => Some(ContactSource::Csv),
            _ => None,
        }
    }
}

/// A postal address with an optional label such as "Home" or "Work".
/// Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledAddress {
    pub label: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

impl LabeledAddress {
    /// True when no address part (label excluded) is filled in.
    pub fn is_blank(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.zip, &self.country]
            .iter()
            .all(|part| part.is_none())
    }

    /// Single-line rendering of the filled-in parts.
    pub fn one_line(&self) -> String {
        [&self.street, &self.city, &self.state, &self.zip, &self.country]
            .iter()
            .filter_map(|part| part.as_deref())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A person in the address book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Id<Contact>,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub avatar_url: Option<String>,
    pub alternative_numbers: Vec<String>,
    pub addresses: Vec<LabeledAddress>,
    pub display_names: Vec<DisplayName>,
    pub group_ids: Vec<Id<Group>>,
    pub sources: Vec<ContactSource>,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn create(name: String, phone_number: String) -> Self {
        Self {
            id: Id::generate(),
            name,
            phone_number,
            email: None,
            notes: None,
            avatar_url: None,
            alternative_numbers: Vec::new(),
            addresses: Vec::new(),
            display_names: Vec::new(),
            group_ids: Vec::new(),
            sources: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn in_group(&self, group_id: Id<Group>) -> bool {
        self.group_ids.contains(&group_id)
    }

    /// Adds a group id unless already present. Returns whether it was added.
    pub fn join(&mut self, group_id: Id<Group>) -> bool {
        if self.in_group(group_id) {
            false
        } else {
            self.group_ids.push(group_id);
            true
        }
    }

    /// Removes a group id. Returns whether it was present.
    pub fn leave(&mut self, group_id: Id<Group>) -> bool {
        let before = self.group_ids.len();
        self.group_ids.retain(|id| *id != group_id);
        self.group_ids.len() != before
    }

    /// Sets the display name for a language, replacing any existing one.
    pub fn set_display_name(&mut self, lang: DisplayLang, name: String) {
        self.display_names.retain(|dn| dn.lang != lang);
        self.display_names.push(DisplayName { lang, name });
        self.display_names.sort_by_key(|dn| dn.lang);
    }

    pub fn display_name(&self, lang: DisplayLang) -> Option<&str> {
        self.display_names
            .iter()
            .find(|dn| dn.lang == lang)
            .map(|dn| dn.name.as_str())
    }
}
