use crate::ai::OllamaSuggester;
use crate::cli::context::CLIContext;
use crate::ops::*;

pub fn suggest(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: suggest <contact name>");
        println!("Example: suggest Ramesh Savani");
        return;
    }

    let suggester = OllamaSuggester::from_config(&ctx.config);
    if let Err(err) = suggester.check() {
        println!("Error: {}", err);
        return;
    }

    println!("Asking {} for a group...", ctx.config.model);
    let suggestion = match suggestion_ops::suggest_for(&ctx.conn, &suggester, args) {
        Ok(s) => s,
        Err(e) => {
            ctx.print_error(&e);
            return;
        }
    };

    let group = match suggestion_ops::resolve_suggestion(&ctx.conn, &suggestion) {
        Ok(Some(g)) => g,
        Ok(None) => {
            match suggestion.suggested_group {
                Some(name) => println!("Suggested '{}', but no such group exists.", name),
                None => println!("No group suggested."),
            }
            return;
        }
        Err(e) => {
            ctx.print_error(&e);
            return;
        }
    };

    println!(
        "Suggested group: {} (confidence {:.0}%)",
        group.name,
        suggestion.confidence * 100.0
    );

    let contact = match ctx.find_contact(args) {
        Some(c) => c,
        None => return,
    };
    if contact.in_group(group.id) {
        println!("{} is already in {}", contact.name, group.name);
        return;
    }
    if !ctx.confirm(&format!("Add {} to {}?", contact.name, group.name)) {
        return;
    }

    match suggestion_ops::accept_suggestion(&ctx.conn, contact.id, &suggestion) {
        Ok((contact, group)) => println!("{} is now in {}", contact.name, group.name),
        Err(e) => ctx.print_error(&e),
    }
}
