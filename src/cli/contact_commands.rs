use crate::cli::context::CLIContext;
use crate::model::*;
use crate::ops::*;
use crate::queries::*;

pub fn list(ctx: &CLIContext, args: &str) {
    let sort = if args.is_empty() {
        ContactSort::default()
    } else {
        match ContactSort::parse(args) {
            Some(s) => s,
            None => {
                println!("Unknown sort '{}'. Use 'asc' or 'desc'.", args);
                return;
            }
        }
    };

    let filter = ContactFilter { sort, ..Default::default() };
    match contact_queries::list_contacts(&ctx.conn, &filter) {
        Ok(contacts) if contacts.is_empty() => {
            println!("No contacts yet. Use 'add-contact' to add someone.");
        }
        Ok(contacts) => {
            println!("Contacts ({}):", contacts.len());
            println!();
            print_rows(ctx, &contacts);
        }
        Err(e) => ctx.print_error(&e),
    }
}

fn print_rows(ctx: &CLIContext, contacts: &[Contact]) {
    for contact in contacts {
        let groups = ctx.group_names_for(contact);
        let group_str = if groups.is_empty() {
            String::new()
        } else {
            format!(" [{}]", groups.join(", "))
        };
        println!("  {} - {}{}", contact.name, contact.phone_number, group_str);
    }
}

pub fn add(ctx: &CLIContext, args: &str) {
    println!("Adding a new contact (press Enter to skip optional fields)");
    println!();

    let name = if !args.is_empty() {
        args.to_string()
    } else {
        match ctx.prompt("Name (required): ") {
            Some(s) if !s.is_empty() => s,
            Some(_) => {
                println!("Name is required.");
                return;
            }
            None => return,
        }
    };

    let phone = match ctx.prompt("Phone (required): ") {
        Some(s) if !s.is_empty() => s,
        Some(_) => {
            println!("Phone number is required.");
            return;
        }
        None => return,
    };

    let mut input = ContactInput::new(&name, &phone);
    if !fill_details(ctx, &mut input) {
        return;
    }

    match contact_ops::add_contact(&ctx.conn, input) {
        Ok(contact) => println!("Added {}", contact.name),
        Err(e) => ctx.print_error(&e),
    }
}

/// Prompts for every optional field. Returns false on EOF.
fn fill_details(ctx: &CLIContext, input: &mut ContactInput) -> bool {
    macro_rules! ask {
        ($prompt:expr, $current:expr) => {
            match ctx.prompt(&with_current($prompt, $current)) {
                Some(s) => s,
                None => return false,
            }
        };
    }

    let email = ask!("Email", input.email.as_deref());
    if !email.is_empty() {
        input.email = clear_or(email);
    }

    let current_numbers = input.alternative_numbers.join(", ");
    let numbers = ask!(
        &format!("Alternative numbers, comma separated (max {})", MAX_ALTERNATIVE_NUMBERS),
        Some(current_numbers.as_str()).filter(|s| !s.is_empty())
    );
    if !numbers.is_empty() {
        input.alternative_numbers = if numbers.eq_ignore_ascii_case("clear") {
            Vec::new()
        } else {
            numbers.split(',').map(|n| n.trim().to_string()).collect()
        };
    }

    for lang in [DisplayLang::Gu, DisplayLang::Hi] {
        let current = input
            .display_names
            .iter()
            .find(|(l, _)| *l == lang)
            .map(|(_, n)| n.clone());
        let label = format!("Name in {}", lang);
        let value = ask!(&label, current.as_deref());
        if !value.is_empty() {
            input.display_names.retain(|(l, _)| *l != lang);
            if !value.eq_ignore_ascii_case("clear") {
                input.display_names.push((lang, value));
            }
        }
    }

    if !input.addresses.is_empty() {
        println!("Addresses:");
        for a in &input.addresses {
            println!("  {}: {}", a.label.as_deref().unwrap_or("-"), a.one_line());
        }
        if ctx.confirm("Replace addresses?") {
            input.addresses.clear();
        }
    }
    while input.addresses.len() < MAX_ADDRESSES && ctx.confirm("Add an address?") {
        let mut address = LabeledAddress::default();
        for (field, slot) in [
            ("Label (Home, Work...)", &mut address.label),
            ("Street", &mut address.street),
            ("City", &mut address.city),
            ("State", &mut address.state),
            ("Zip", &mut address.zip),
            ("Country", &mut address.country),
        ] {
            let value = ask!(field, None);
            if !value.is_empty() {
                *slot = Some(value);
            }
        }
        input.addresses.push(address);
    }

    if let Some(ids) = pick_groups(ctx, &input.group_ids) {
        input.group_ids = ids;
    }

    let notes = ask!("Notes", input.notes.as_deref());
    if !notes.is_empty() {
        input.notes = clear_or(notes);
    }

    true
}

/// Toggle group tags by number. Returns None when nothing was changed.
fn pick_groups(ctx: &CLIContext, current: &[Id<Group>]) -> Option<Vec<Id<Group>>> {
    let nodes = group_queries::hierarchy(&ctx.conn).unwrap_or_default();
    let flat = crate::hierarchy::flatten(&nodes);
    if flat.is_empty() {
        return None;
    }

    println!("Groups (enter numbers to toggle, or press Enter to keep):");
    for (i, node) in flat.iter().enumerate() {
        let marker = if current.contains(&node.id) { "[x]" } else { "[ ]" };
        println!("  {:>2}. {} {}{}", i + 1, marker, "  ".repeat(node.level), node.name);
    }

    let picked = ctx.prompt("Groups: ")?;
    if picked.is_empty() {
        return None;
    }

    let mut selected = current.to_vec();
    for token in picked.split_whitespace() {
        if let Some(node) = token.parse::<usize>().ok().and_then(|i| flat.get(i.wrapping_sub(1))) {
            if let Some(pos) = selected.iter().position(|id| *id == node.id) {
                selected.remove(pos);
            } else {
                selected.push(node.id);
            }
        }
    }
    Some(selected)
}

fn with_current(label: &str, current: Option<&str>) -> String {
    match current {
        Some(c) => format!("{} [{}] ('clear' to remove): ", label, c),
        None => format!("{}: ", label),
    }
}

fn clear_or(value: String) -> Option<String> {
    if value.eq_ignore_ascii_case("clear") {
        None
    } else {
        Some(value)
    }
}

pub fn show(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: show-contact <name>");
        return;
    }
    let contact = match ctx.find_contact(args) {
        Some(c) => c,
        None => return,
    };

    println!();
    println!("Name: {}", contact.name);
    for dn in &contact.display_names {
        println!("  ({}) {}", dn.lang, dn.name);
    }
    println!("Phone: {}", contact.phone_number);
    if !contact.alternative_numbers.is_empty() {
        println!("Other numbers: {}", contact.alternative_numbers.join(", "));
    }
    println!("Email: {}", contact.email.as_deref().unwrap_or("(none)"));
    for address in &contact.addresses {
        println!(
            "Address ({}): {}",
            address.label.as_deref().unwrap_or("-"),
            address.one_line()
        );
    }

    let paths: Vec<String> = contact
        .group_ids
        .iter()
        .filter_map(|id| group_queries::group_path(&ctx.conn, *id).ok().flatten())
        .collect();
    if paths.is_empty() {
        println!("Groups: (none)");
    } else {
        println!("Groups:");
        for path in &paths {
            println!("  {}", path);
        }
    }

    if !contact.sources.is_empty() {
        let sources: Vec<&str> = contact.sources.iter().map(|s| s.as_str()).collect();
        println!("Sources: {}", sources.join(", "));
    }
    if let Some(ref notes) = contact.notes {
        println!("Notes: {}", notes);
    }
    println!("Added: {}", contact.created_at.format("%Y-%m-%d"));
    println!();
}

pub fn edit(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: edit-contact <name>");
        return;
    }
    let contact = match ctx.find_contact(args) {
        Some(c) => c,
        None => return,
    };

    println!("Editing {} (press Enter to keep the current value)", contact.name);
    println!();

    let mut input = ContactInput::from_contact(&contact);

    match ctx.prompt(&format!("Name [{}]: ", contact.name)) {
        Some(s) if !s.is_empty() => input.name = s,
        Some(_) => {}
        None => return,
    }
    match ctx.prompt(&format!("Phone [{}]: ", contact.phone_number)) {
        Some(s) if !s.is_empty() => input.phone_number = s,
        Some(_) => {}
        None => return,
    }

    if !fill_details(ctx, &mut input) {
        return;
    }

    match contact_ops::update_contact(&ctx.conn, contact.id, input) {
        Ok(updated) => println!("Updated {}", updated.name),
        Err(e) => ctx.print_error(&e),
    }
}

pub fn delete(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: delete-contact <name>");
        return;
    }
    let contact = match ctx.find_contact(args) {
        Some(c) => c,
        None => return,
    };

    if !ctx.confirm(&format!("Delete {}?", contact.name)) {
        println!("Cancelled.");
        return;
    }
    match contact_ops::delete_contact(&ctx.conn, contact.id) {
        Ok(()) => println!("Deleted {}", contact.name),
        Err(e) => ctx.print_error(&e),
    }
}

pub fn find(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: find <query>");
        return;
    }

    match contact_queries::search_contacts(&ctx.conn, args) {
        Ok(contacts) if contacts.is_empty() => println!("No contacts match '{}'", args),
        Ok(contacts) => {
            println!("Found {} contact(s):", contacts.len());
            print_rows(ctx, &contacts);
        }
        Err(e) => ctx.print_error(&e),
    }
}

/// `filter <group> [/ term]`: members of a group subtree, optionally narrowed
/// by a search term.
pub fn filter(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: filter <group> [/ search term]");
        return;
    }

    let (group_query, term) = match args.split_once('/') {
        Some((g, t)) => (g.trim(), Some(t.trim().to_string()).filter(|t| !t.is_empty())),
        None => (args, None),
    };
    let group = match ctx.find_group(group_query) {
        Some(g) => g,
        None => return,
    };

    let filter = ContactFilter {
        group_id: Some(group.id),
        term,
        ..Default::default()
    };
    match contact_queries::list_contacts(&ctx.conn, &filter) {
        Ok(contacts) if contacts.is_empty() => println!("No contacts in {}", group.name),
        Ok(contacts) => {
            println!("{} ({} contact(s), including subgroups):", group.name, contacts.len());
            print_rows(ctx, &contacts);
        }
        Err(e) => ctx.print_error(&e),
    }
}

/// `join <contact>`, then prompts for the group.
pub fn join(ctx: &CLIContext, args: &str) {
    let (contact, group) = match contact_and_group(ctx, args, "join") {
        Some(pair) => pair,
        None => return,
    };
    match contact_ops::add_to_group(&ctx.conn, contact.id, group.id) {
        Ok(_) => println!("{} is now in {}", contact.name, group.name),
        Err(e) => ctx.print_error(&e),
    }
}

pub fn leave(ctx: &CLIContext, args: &str) {
    let (contact, group) = match contact_and_group(ctx, args, "leave") {
        Some(pair) => pair,
        None => return,
    };
    if !contact.in_group(group.id) {
        println!("{} is not directly in {}", contact.name, group.name);
        return;
    }
    match contact_ops::remove_from_group(&ctx.conn, contact.id, group.id) {
        Ok(_) => println!("{} left {}", contact.name, group.name),
        Err(e) => ctx.print_error(&e),
    }
}

fn contact_and_group(ctx: &CLIContext, args: &str, command: &str) -> Option<(Contact, Group)> {
    if args.is_empty() {
        println!("Usage: {} <contact>", command);
        return None;
    }
    let contact = ctx.find_contact(args)?;
    let group_query = ctx.prompt("Group: ")?;
    let group = ctx.find_group(&group_query)?;
    Some((contact, group))
}
