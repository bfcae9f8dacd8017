use crate::cli::context::CLIContext;
use crate::hierarchy::{self, GroupNode};
use crate::model::*;
use crate::ops::*;
use crate::queries::*;

pub fn list(ctx: &CLIContext) {
    match group_queries::hierarchy(&ctx.conn) {
        Ok(nodes) if nodes.is_empty() => {
            println!("No groups yet. Use 'add-group <name>' to create one.");
        }
        Ok(nodes) => {
            println!("Groups:");
            print_tree(&nodes);
        }
        Err(e) => ctx.print_error(&e),
    }
}

fn print_tree(nodes: &[GroupNode]) {
    for node in hierarchy::flatten(nodes) {
        let subgroups = if node.sub_group_count > 0 {
            format!(", {} subgroup(s)", node.sub_group_count)
        } else {
            String::new()
        };
        println!(
            "  {}{} ({} member(s){})",
            "  ".repeat(node.level),
            node.name,
            node.member_count,
            subgroups
        );
    }
}

pub fn add(ctx: &CLIContext, args: &str) {
    let name = if !args.is_empty() {
        args.to_string()
    } else {
        match ctx.prompt("Group name: ") {
            Some(s) if !s.is_empty() => s,
            _ => {
                println!("Name cannot be empty.");
                return;
            }
        }
    };

    let desc = ctx.prompt("Description (optional): ").unwrap_or_default();
    let desc_opt = if desc.is_empty() { None } else { Some(desc.as_str()) };

    let candidates = group_queries::all_groups(&ctx.conn).unwrap_or_default();
    let parent_id = match choose_parent(ctx, &candidates, None) {
        Some(choice) => choice,
        None => return,
    };

    match group_ops::create_group(&ctx.conn, &name, desc_opt, parent_id) {
        Ok(group) => println!("Created group: {}", describe(ctx, &group)),
        Err(e) => ctx.print_error(&e),
    }
}

/// Lists `candidates` and asks for a parent. `Some(None)` means top level,
/// `None` means the user gave up.
fn choose_parent(
    ctx: &CLIContext,
    candidates: &[Group],
    current: Option<Id<Group>>,
) -> Option<Option<Id<Group>>> {
    if candidates.is_empty() {
        return Some(None);
    }

    println!("Parent group:");
    println!("   0. (top level)");
    for (i, group) in candidates.iter().enumerate() {
        let marker = if Some(group.id) == current { " *" } else { "" };
        println!("  {:>2}. {}{}", i + 1, describe(ctx, group), marker);
    }

    loop {
        let input = ctx.prompt("Parent number (Enter to keep): ")?;
        if input.is_empty() {
            return Some(current);
        }
        match input.parse::<usize>() {
            Ok(0) => return Some(None),
            Ok(n) if n <= candidates.len() => return Some(Some(candidates[n - 1].id)),
            _ => println!("Enter a number between 0 and {}.", candidates.len()),
        }
    }
}

fn describe(ctx: &CLIContext, group: &Group) -> String {
    group_queries::group_path(&ctx.conn, group.id)
        .ok()
        .flatten()
        .unwrap_or_else(|| group.name.clone())
}

pub fn show(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: show-group <name>");
        return;
    }
    let group = match ctx.find_group(args) {
        Some(g) => g,
        None => return,
    };

    let nodes = group_queries::hierarchy(&ctx.conn).unwrap_or_default();
    let members = contact_queries::contacts_in_group(&ctx.conn, group.id).unwrap_or_default();

    println!();
    println!("Name: {}", group.name);
    println!("Path: {}", describe(ctx, &group));
    println!("Description: {}", group.description.as_deref().unwrap_or("(none)"));

    if let Some(node) = hierarchy::find_node(&nodes, group.id) {
        if node.has_children() {
            let names: Vec<&str> = node.children.iter().map(|c| c.name.as_str()).collect();
            println!("Subgroups: {}", names.join(", "));
        }
    }

    let direct = members.iter().filter(|c| c.in_group(group.id)).count();
    if members.is_empty() {
        println!("Members: (none)");
    } else {
        println!(
            "Members: {} ({} directly, {} through subgroups)",
            members.len(),
            direct,
            members.len() - direct
        );
        for contact in &members {
            println!("  {} - {}", contact.name, contact.phone_number);
        }
    }
    println!();
}

pub fn edit(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: edit-group <name>");
        return;
    }
    let group = match ctx.find_group(args) {
        Some(g) => g,
        None => return,
    };

    println!("Editing group: {}", group.name);
    println!();

    let name = match ctx.prompt(&format!("Name [{}]: ", group.name)) {
        Some(s) if s.is_empty() => group.name.clone(),
        Some(s) => s,
        None => return,
    };

    let current_desc = group.description.as_deref().unwrap_or("");
    let description = match ctx.prompt(&format!("Description [{}] ('clear' to remove): ", current_desc)) {
        Some(s) if s.is_empty() => group.description.clone(),
        Some(s) if s.eq_ignore_ascii_case("clear") => None,
        Some(s) => Some(s),
        None => return,
    };

    let candidates = group_queries::valid_parents(&ctx.conn, group.id).unwrap_or_default();
    let parent_id = match choose_parent(ctx, &candidates, group.parent_id) {
        Some(choice) => choice,
        None => return,
    };

    match group_ops::update_group(&ctx.conn, group.id, &name, description.as_deref(), parent_id) {
        Ok(updated) => println!("Updated group: {}", describe(ctx, &updated)),
        Err(e) => ctx.print_error(&e),
    }
}

/// `move-group <group>`: only the parent changes.
pub fn move_group(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: move-group <name>");
        return;
    }
    let group = match ctx.find_group(args) {
        Some(g) => g,
        None => return,
    };

    let candidates = group_queries::valid_parents(&ctx.conn, group.id).unwrap_or_default();
    let parent_id = match choose_parent(ctx, &candidates, group.parent_id) {
        Some(choice) => choice,
        None => return,
    };
    if parent_id == group.parent_id {
        println!("Nothing changed.");
        return;
    }

    match group_ops::move_group(&ctx.conn, group.id, parent_id) {
        Ok(moved) => println!("Moved: {}", describe(ctx, &moved)),
        Err(e) => ctx.print_error(&e),
    }
}

pub fn delete(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: delete-group <name>");
        return;
    }
    let group = match ctx.find_group(args) {
        Some(g) => g,
        None => return,
    };

    let children = crate::db::group_repo::find_children(&ctx.conn, group.id).unwrap_or_default();
    if !children.is_empty() {
        let new_home = group
            .parent_id
            .and_then(|p| group_queries::group_path(&ctx.conn, p).ok().flatten())
            .unwrap_or_else(|| "the top level".into());
        println!("{} subgroup(s) will move to {}.", children.len(), new_home);
    }
    if !ctx.confirm(&format!("Delete group {}?", group.name)) {
        println!("Cancelled.");
        return;
    }

    match group_ops::delete_group(&ctx.conn, group.id) {
        Ok(()) => println!("Deleted group: {}", group.name),
        Err(e) => ctx.print_error(&e),
    }
}

/// Tree of groups matching the term, with their ancestors for context.
pub fn find(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: find-group <query>");
        return;
    }

    match group_queries::search_hierarchy(&ctx.conn, args) {
        Ok(nodes) if nodes.is_empty() => println!("No groups match '{}'", args),
        Ok(nodes) => print_tree(&nodes),
        Err(e) => ctx.print_error(&e),
    }
}
