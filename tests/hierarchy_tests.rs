use std::collections::HashSet;

use nexus::hierarchy::*;
use nexus::model::*;

fn group(name: &str, parent: Option<&Group>) -> Group {
    Group::create(name.into(), None, parent.map(|p| p.id))
}

fn contact_in(name: &str, groups: &[&Group]) -> Contact {
    let mut c = Contact::create(name.into(), "9825000000".into());
    c.group_ids = groups.iter().map(|g| g.id).collect();
    c
}

/// Savani Parivar
///   Mukesh Family
///   Ramesh Family
///     Ramesh Grandkids
/// Patel Society
fn family() -> Vec<Group> {
    let savani = group("Savani Parivar", None);
    let ramesh = group("Ramesh Family", Some(&savani));
    let mukesh = group("Mukesh Family", Some(&savani));
    let grandkids = group("Ramesh Grandkids", Some(&ramesh));
    let society = group("Patel Society", None);
    vec![savani, ramesh, mukesh, grandkids, society]
}

fn by_name<'a>(groups: &'a [Group], name: &str) -> &'a Group {
    groups.iter().find(|g| g.name == name).unwrap()
}

// ==========================================================================
// BUILD TESTS
// ==========================================================================

#[test]
fn roots_and_children_are_name_ordered() {
    let groups = family();
    let forest = build_hierarchy(&groups, &[], None, 0);

    let roots: Vec<&str> = forest.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(roots, vec!["Patel Society", "Savani Parivar"]);

    let savani = &forest[1];
    let children: Vec<&str> = savani.children.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(children, vec!["Mukesh Family", "Ramesh Family"]);
    assert_eq!(savani.sub_group_count, 2);
}

#[test]
fn levels_follow_depth() {
    let groups = family();
    let forest = build_hierarchy(&groups, &[], None, 0);

    for node in flatten(&forest) {
        let expected = match node.name.as_str() {
            "Savani Parivar" | "Patel Society" => 0,
            "Ramesh Family" | "Mukesh Family" => 1,
            _ => 2,
        };
        assert_eq!(node.level, expected, "{}", node.name);
    }
}

#[test]
fn every_group_appears_exactly_once() {
    let groups = family();
    let forest = build_hierarchy(&groups, &[], None, 0);
    let flat = flatten(&forest);

    assert_eq!(flat.len(), groups.len());
    let ids: HashSet<Id<Group>> = flat.iter().map(|n| n.id).collect();
    assert_eq!(ids.len(), groups.len());
}

#[test]
fn build_from_a_parent_starts_at_given_level() {
    let groups = family();
    let savani = by_name(&groups, "Savani Parivar");

    let subtree = build_hierarchy(&groups, &[], Some(savani.id), 1);
    assert_eq!(subtree.len(), 2);
    assert!(subtree.iter().all(|n| n.level == 1));
    let ramesh = subtree.iter().find(|n| n.name == "Ramesh Family").unwrap();
    assert_eq!(ramesh.children[0].level, 2);
}

#[test]
fn orphan_group_is_shown_as_root() {
    let mut groups = family();
    let missing = Id::<Group>::generate();
    groups.push(Group::create("Lost Cousins".into(), None, Some(missing)));

    let forest = build_hierarchy(&groups, &[], None, 0);
    assert!(forest.iter().any(|n| n.name == "Lost Cousins" && n.level == 0));
}

#[test]
fn detached_cycle_does_not_loop() {
    let mut groups = family();
    let mut x = group("X", None);
    let y = group("Y", Some(&x));
    x.parent_id = Some(y.id);
    groups.push(x.clone());
    groups.push(y.clone());

    let forest = build_hierarchy(&groups, &[], None, 0);
    let flat = flatten(&forest);
    assert_eq!(flat.len(), 5);
    assert!(find_node(&forest, x.id).is_none());

    let closure = descendant_ids(x.id, &groups);
    assert_eq!(closure, HashSet::from([x.id, y.id]));
    assert_eq!(ancestor_ids(x.id, &groups), vec![y.id]);
}

fn chain(depth: usize) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::with_capacity(depth);
    for i in 0..depth {
        let parent = groups.last().map(|g| g.id);
        groups.push(Group::create(format!("Generation {}", i), None, parent));
    }
    groups
}

#[test]
fn deep_chain_builds_without_exhausting_the_stack() {
    let depth = 5_000;
    let groups = chain(depth);
    let leaf = groups.last().unwrap().clone();
    let contacts = vec![contact_in("Ramesh", &[&leaf])];

    let forest = build_hierarchy(&groups, &contacts, None, 0);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].member_count, 1);

    let flat = flatten(&forest);
    assert_eq!(flat.len(), depth);
    let last = flat.last().unwrap();
    assert_eq!(last.id, leaf.id);
    assert_eq!(last.level, depth - 1);
    assert!(!last.has_children());

    let filtered = filter_hierarchy(&forest, &leaf.name);
    let kept = flatten(&filtered);
    assert_eq!(kept.len(), depth);
    assert_eq!(kept.last().unwrap().id, leaf.id);
}

// ==========================================================================
// MEMBERSHIP TESTS
// ==========================================================================

#[test]
fn member_of_leaf_counts_for_every_ancestor_once() {
    let a = group("A", None);
    let b = group("B", Some(&a));
    let c = group("C", Some(&b));
    let x = contact_in("X", &[&c]);
    let groups = vec![a.clone(), b.clone(), c.clone()];
    let contacts = vec![x];

    assert_eq!(member_count(a.id, &groups, &contacts), 1);
    assert_eq!(member_count(b.id, &groups, &contacts), 1);
    assert_eq!(member_count(c.id, &groups, &contacts), 1);

    let forest = build_hierarchy(&groups, &contacts, None, 0);
    for node in flatten(&forest) {
        assert_eq!(node.member_count, 1, "{}", node.name);
    }
}

#[test]
fn contact_in_several_subgroups_counts_once() {
    let groups = family();
    let savani = by_name(&groups, "Savani Parivar");
    let ramesh = by_name(&groups, "Ramesh Family");
    let grandkids = by_name(&groups, "Ramesh Grandkids");
    let mukesh = by_name(&groups, "Mukesh Family");

    let contacts = vec![
        contact_in("Ramesh", &[savani, ramesh, grandkids]),
        contact_in("Mukesh", &[mukesh]),
        contact_in("Neighbour", &[]),
    ];

    assert_eq!(member_count(savani.id, &groups, &contacts), 2);
    assert_eq!(member_count(ramesh.id, &groups, &contacts), 1);
    assert_eq!(direct_member_count(savani.id, &contacts), 1);

    let names: Vec<&str> = members(savani.id, &groups, &contacts)
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Ramesh", "Mukesh"]);
}

#[test]
fn descendant_ids_is_closed_under_children() {
    let groups = family();
    let index = ChildIndex::new(&groups);

    for g in &groups {
        let closure = descendant_ids(g.id, &groups);
        assert!(closure.contains(&g.id));
        for id in &closure {
            for child in index.children_of(*id) {
                assert!(closure.contains(child));
            }
        }
    }
}

#[test]
fn ancestors_nearest_first() {
    let groups = family();
    let grandkids = by_name(&groups, "Ramesh Grandkids");
    let ramesh = by_name(&groups, "Ramesh Family");
    let savani = by_name(&groups, "Savani Parivar");

    assert_eq!(ancestor_ids(grandkids.id, &groups), vec![ramesh.id, savani.id]);
    assert!(ancestor_ids(savani.id, &groups).is_empty());
}

#[test]
fn unknown_group_has_empty_membership() {
    let groups = family();
    let contacts = vec![contact_in("Ramesh", &[&groups[0]])];
    let unknown = Id::<Group>::generate();
    assert_eq!(member_count(unknown, &groups, &contacts), 0);
    assert!(members(unknown, &groups, &contacts).is_empty());
}

// ==========================================================================
// FILTER TESTS
// ==========================================================================

#[test]
fn filter_keeps_matches_and_their_ancestors() {
    let groups = family();
    let forest = build_hierarchy(&groups, &[], None, 0);

    let filtered = filter_hierarchy(&forest, "grandkids");
    assert_eq!(filtered.len(), 1);
    let savani = &filtered[0];
    assert_eq!(savani.name, "Savani Parivar");
    assert_eq!(savani.children.len(), 1);
    assert_eq!(savani.children[0].name, "Ramesh Family");
    assert_eq!(savani.children[0].children[0].name, "Ramesh Grandkids");
}

#[test]
fn filter_matches_description_case_insensitively() {
    let mut groups = family();
    groups[4].description = Some("Neighbours on Station Road".into());
    let forest = build_hierarchy(&groups, &[], None, 0);

    let filtered = filter_hierarchy(&forest, "STATION");
    let names: Vec<&str> = flatten(&filtered).iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Patel Society"]);
}

#[test]
fn blank_filter_keeps_everything() {
    let groups = family();
    let forest = build_hierarchy(&groups, &[], None, 0);
    assert_eq!(filter_hierarchy(&forest, "  "), forest);
    assert!(filter_hierarchy(&forest, "nobody").is_empty());
}
