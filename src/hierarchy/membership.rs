use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{Contact, Group, Id};

/// Parent → children adjacency derived from the flat `parent_id` pointers.
/// Children are kept in name order so traversals are deterministic.
pub struct ChildIndex {
    children: HashMap<Id<Group>, Vec<Id<Group>>>,
}

impl ChildIndex {
    pub fn new(groups: &[Group]) -> Self {
        let mut sorted: Vec<&Group> = groups.iter().collect();
        sorted.sort_by(|a, b| by_name(a, b));

        let mut children: HashMap<Id<Group>, Vec<Id<Group>>> = HashMap::new();
        for group in sorted {
            if let Some(parent) = group.parent_id {
                children.entry(parent).or_default().push(group.id);
            }
        }
        Self { children }
    }

    pub fn children_of(&self, group_id: Id<Group>) -> &[Id<Group>] {
        self.children
            .get(&group_id)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// Breadth-first closure from `group_id`. A visited group is never
    /// queued again, so a cyclic parent chain still terminates.
    pub fn descendants(&self, group_id: Id<Group>) -> HashSet<Id<Group>> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(group_id);
        queue.push_back(group_id);

        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current) {
                if visited.insert(*child) {
                    queue.push_back(*child);
                }
            }
        }

        visited
    }
}

/// Case-insensitive name order, ties broken by id.
pub(crate) fn by_name(a: &Group, b: &Group) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}

/// The group itself plus every group reachable through child links.
pub fn descendant_ids(group_id: Id<Group>, groups: &[Group]) -> HashSet<Id<Group>> {
    ChildIndex::new(groups).descendants(group_id)
}

/// Parent chain of `group_id`, nearest first. Stops at a root, at a parent
/// that is not in `groups`, or when the chain revisits a group.
pub fn ancestor_ids(group_id: Id<Group>, groups: &[Group]) -> Vec<Id<Group>> {
    let parents: HashMap<Id<Group>, Option<Id<Group>>> =
        groups.iter().map(|g| (g.id, g.parent_id)).collect();

    let mut chain = Vec::new();
    let mut seen = HashSet::from([group_id]);
    let mut current = parents.get(&group_id).copied().flatten();

    while let Some(parent) = current {
        if !seen.insert(parent) || !parents.contains_key(&parent) {
            break;
        }
        chain.push(parent);
        current = parents.get(&parent).copied().flatten();
    }

    chain
}

/// Number of distinct contacts tagged with the group or any descendant.
/// A contact reachable through several tagged groups counts once.
pub fn member_count(group_id: Id<Group>, groups: &[Group], contacts: &[Contact]) -> usize {
    count_in_closure(&descendant_ids(group_id, groups), contacts)
}

/// The contacts counted by [`member_count`], in input order.
pub fn members<'a>(group_id: Id<Group>, groups: &[Group], contacts: &'a [Contact]) -> Vec<&'a Contact> {
    let closure = descendant_ids(group_id, groups);
    contacts
        .iter()
        .filter(|c| in_closure(c, &closure))
        .collect()
}

/// Contacts tagged with exactly this group.
pub fn direct_member_count(group_id: Id<Group>, contacts: &[Contact]) -> usize {
    contacts.iter().filter(|c| c.in_group(group_id)).count()
}

pub(crate) fn count_in_closure(closure: &HashSet<Id<Group>>, contacts: &[Contact]) -> usize {
    contacts.iter().filter(|c| in_closure(c, closure)).count()
}

fn in_closure(contact: &Contact, closure: &HashSet<Id<Group>>) -> bool {
    contact.group_ids.iter().any(|id| closure.contains(id))
}
