use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::membership::{by_name, count_in_closure, ChildIndex};
use crate::model::{Contact, Group, Id};

/// A group decorated with its position in the tree and aggregate counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupNode {
    pub id: Id<Group>,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Id<Group>>,
    pub level: usize,
    pub children: Vec<GroupNode>,
    pub sub_group_count: usize,
    pub member_count: usize,
}

impl GroupNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    fn matches(&self, lower_term: &str) -> bool {
        self.name.to_lowercase().contains(lower_term)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(lower_term))
                .unwrap_or(false)
    }
}

impl Drop for GroupNode {
    // Unlinks the subtree one node at a time so a long chain never recurses.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// A node whose children are still being built.
struct Frame<'a> {
    group: &'a Group,
    level: usize,
    child_ids: Vec<Id<Group>>,
    next: usize,
    built: Vec<GroupNode>,
}

struct Builder<'a> {
    by_id: HashMap<Id<Group>, &'a Group>,
    index: ChildIndex,
    contacts: &'a [Contact],
    visited: HashSet<Id<Group>>,
}

impl<'a> Builder<'a> {
    fn enter(&mut self, id: Id<Group>, level: usize) -> Option<Frame<'a>> {
        if !self.visited.insert(id) {
            log::debug!("group {} reached twice while building hierarchy, skipping", id);
            return None;
        }
        let group = *self.by_id.get(&id)?;
        Some(Frame {
            group,
            level,
            child_ids: self.index.children_of(id).to_vec(),
            next: 0,
            built: Vec::new(),
        })
    }

    fn finish(&self, frame: Frame<'a>) -> GroupNode {
        let group = frame.group;
        GroupNode {
            id: group.id,
            name: group.name.clone(),
            description: group.description.clone(),
            parent_id: group.parent_id,
            level: frame.level,
            sub_group_count: frame.built.len(),
            member_count: count_in_closure(&self.index.descendants(group.id), self.contacts),
            children: frame.built,
        }
    }

    /// Post-order walk from `id` with an explicit stack; a child is attached
    /// to its parent as soon as its own subtree is complete.
    fn node(&mut self, id: Id<Group>, level: usize) -> Option<GroupNode> {
        let mut stack = vec![self.enter(id, level)?];
        while let Some(top) = stack.last_mut() {
            if top.next < top.child_ids.len() {
                let child = top.child_ids[top.next];
                let child_level = top.level + 1;
                top.next += 1;
                if let Some(frame) = self.enter(child, child_level) {
                    stack.push(frame);
                }
                continue;
            }
            let frame = stack.pop()?;
            let node = self.finish(frame);
            match stack.last_mut() {
                Some(parent) => parent.built.push(node),
                None => return Some(node),
            }
        }
        None
    }
}

/// Builds the forest below `parent_id` (the top of the tree when `None`).
///
/// Children are ordered by name. Every group appears at most once; a group
/// whose parent is missing from `groups` is shown as a root, and groups on a
/// detached cycle are left out rather than looping.
pub fn build_hierarchy(
    groups: &[Group],
    contacts: &[Contact],
    parent_id: Option<Id<Group>>,
    level: usize,
) -> Vec<GroupNode> {
    let by_id: HashMap<Id<Group>, &Group> = groups.iter().map(|g| (g.id, g)).collect();
    let index = ChildIndex::new(groups);

    let starts: Vec<Id<Group>> = match parent_id {
        Some(parent) => index.children_of(parent).to_vec(),
        None => {
            let mut roots: Vec<&Group> = groups
                .iter()
                .filter(|g| g.parent_id.map_or(true, |p| !by_id.contains_key(&p)))
                .collect();
            roots.sort_by(|a, b| by_name(a, b));
            roots.into_iter().map(|g| g.id).collect()
        }
    };

    let mut builder = Builder {
        by_id,
        index,
        contacts,
        visited: HashSet::new(),
    };
    if let Some(parent) = parent_id {
        builder.visited.insert(parent);
    }

    let forest: Vec<GroupNode> = starts
        .into_iter()
        .filter_map(|id| builder.node(id, level))
        .collect();

    if parent_id.is_none() && builder.visited.len() < groups.len() {
        log::warn!(
            "{} group(s) sit on a parent cycle and are hidden from the hierarchy",
            groups.len() - builder.visited.len()
        );
    }

    forest
}

/// Keeps nodes whose name or description contains `term`, plus the ancestors
/// of any kept node. A blank term keeps everything.
pub fn filter_hierarchy(nodes: &[GroupNode], term: &str) -> Vec<GroupNode> {
    let term = term.trim();
    if term.is_empty() {
        return nodes.to_vec();
    }
    filter_lower(nodes, &term.to_lowercase())
}

fn filter_lower(nodes: &[GroupNode], lower_term: &str) -> Vec<GroupNode> {
    // (node, index of next child, kept children)
    let mut stack: Vec<(&GroupNode, usize, Vec<GroupNode>)> = Vec::new();
    let mut kept = Vec::new();
    for root in nodes {
        stack.push((root, 0, Vec::new()));
        while let Some(top) = stack.last_mut() {
            let node: &GroupNode = top.0;
            if let Some(child) = node.children.get(top.1) {
                top.1 += 1;
                stack.push((child, 0, Vec::new()));
                continue;
            }
            let Some((node, _, children)) = stack.pop() else {
                break;
            };
            if !node.matches(lower_term) && children.is_empty() {
                continue;
            }
            let pruned = GroupNode {
                id: node.id,
                name: node.name.clone(),
                description: node.description.clone(),
                parent_id: node.parent_id,
                level: node.level,
                children,
                sub_group_count: node.sub_group_count,
                member_count: node.member_count,
            };
            match stack.last_mut() {
                Some((_, _, siblings)) => siblings.push(pruned),
                None => kept.push(pruned),
            }
        }
    }
    kept
}

/// Pre-order walk of the forest, parents before their children.
pub fn flatten(nodes: &[GroupNode]) -> Vec<&GroupNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&GroupNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children.iter().rev());
    }
    out
}

pub fn find_node(nodes: &[GroupNode], id: Id<Group>) -> Option<&GroupNode> {
    flatten(nodes).into_iter().find(|n| n.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, parent: Option<&Group>) -> Group {
        Group::create(name.into(), None, parent.map(|p| p.id))
    }

    #[test]
    fn roots_sorted_by_name() {
        let b = group("beta", None);
        let a = group("Alpha", None);
        let forest = build_hierarchy(&[b.clone(), a.clone()], &[], None, 0);
        let names: Vec<&str> = forest.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta"]);
    }

    #[test]
    fn levels_increase_with_depth() {
        let a = group("A", None);
        let b = group("B", Some(&a));
        let c = group("C", Some(&b));
        let forest = build_hierarchy(&[a, b, c], &[], None, 0);
        let levels: Vec<usize> = flatten(&forest).iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![0, 1, 2]);
    }

    #[test]
    fn orphan_is_shown_as_root() {
        let orphan = Group::create("Orphan".into(), None, Some(Id::generate()));
        let forest = build_hierarchy(std::slice::from_ref(&orphan), &[], None, 0);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, orphan.id);
    }

    #[test]
    fn building_below_a_parent_uses_given_level() {
        let a = group("A", None);
        let b = group("B", Some(&a));
        let forest = build_hierarchy(&[a.clone(), b.clone()], &[], Some(a.id), 1);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, b.id);
        assert_eq!(forest[0].level, 1);
    }

    #[test]
    fn filter_keeps_ancestors_of_matches() {
        let a = group("Patel Society", None);
        let b = group("Savani Parivar", Some(&a));
        let c = group("Savani Cousins", Some(&b));
        let other = group("Sports Club", None);
        let forest = build_hierarchy(&[a, b, c, other], &[], None, 0);

        let filtered = filter_hierarchy(&forest, "cousin");
        let names: Vec<&str> = flatten(&filtered).iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Patel Society", "Savani Parivar", "Savani Cousins"]);
    }

    #[test]
    fn filter_with_blank_term_is_identity() {
        let a = group("A", None);
        let forest = build_hierarchy(&[a], &[], None, 0);
        assert_eq!(filter_hierarchy(&forest, "  "), forest);
    }
}
