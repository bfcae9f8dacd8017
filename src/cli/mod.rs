pub mod context;
pub mod contact_commands;
pub mod group_commands;
pub mod suggest_command;
pub mod transfer_commands;

use rusqlite::Connection;

use crate::config::Config;
use crate::db::{contact_repo, schema};
use crate::error::NexusResult;
use crate::queries::group_queries;
use context::CLIContext;

/// Open the address book named by `config`, in memory when no file is set.
pub fn open(config: &Config) -> NexusResult<Connection> {
    match config.db_path {
        Some(ref path) => schema::open(path),
        None => schema::open_in_memory(),
    }
}

/// Run the interactive REPL.
pub fn run(conn: Connection, config: Config) {
    println!("Nexus contact book");
    match config.db_path {
        Some(ref path) => println!("Using {}", path.display()),
        None => println!("Working in memory; use --file to keep your contacts."),
    }
    println!("Type 'help' for commands, 'exit' to quit.");
    println!();

    let ctx = CLIContext::new(conn, config);
    print_summary(&ctx);
    repl_loop(&ctx);
}

fn print_summary(ctx: &CLIContext) {
    match book_counts(&ctx.conn) {
        Ok((0, 0)) => {}
        Ok((contacts, groups)) => {
            println!("Loaded {} contact(s) in {} group(s).", contacts, groups);
            println!();
        }
        Err(e) => ctx.print_error(&e),
    }
}

/// Number of contacts and groups currently stored.
fn book_counts(conn: &Connection) -> NexusResult<(usize, usize)> {
    let contacts = contact_repo::count(conn)?;
    let groups = group_queries::all_groups(conn)?.len();
    Ok((contacts, groups))
}

fn repl_loop(ctx: &CLIContext) {
    loop {
        let input = match ctx.read_line("> ") {
            Some(s) => s,
            None => break,
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let (command, args) = parse_command(input);

        match command {
            "help" | "?" => print_help(),
            "quit" | "exit" | "q" => break,

            // Contact commands
            "contacts" | "list" | "ls" => contact_commands::list(ctx, args),
            "add-contact" | "add" => contact_commands::add(ctx, args),
            "show-contact" | "show" => contact_commands::show(ctx, args),
            "edit-contact" => contact_commands::edit(ctx, args),
            "delete-contact" => contact_commands::delete(ctx, args),
            "find" => contact_commands::find(ctx, args),
            "filter" => contact_commands::filter(ctx, args),
            "join" => contact_commands::join(ctx, args),
            "leave" => contact_commands::leave(ctx, args),

            // Group commands
            "groups" | "tree" => group_commands::list(ctx),
            "add-group" => group_commands::add(ctx, args),
            "show-group" => group_commands::show(ctx, args),
            "edit-group" => group_commands::edit(ctx, args),
            "move-group" => group_commands::move_group(ctx, args),
            "delete-group" => group_commands::delete(ctx, args),
            "find-group" => group_commands::find(ctx, args),

            // AI-assisted
            "suggest" => suggest_command::suggest(ctx, args),

            // Import / export
            "import" => transfer_commands::import(ctx, args),
            "export" => transfer_commands::export(ctx, args),

            _ => println!("Unknown command: {}. Type 'help' for commands.", command),
        }
    }
}

/// Split input into the command word and the rest of the line.
pub fn parse_command(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.find(|c: char| c == ' ' || c == '\t') {
        Some(pos) => (&input[..pos], input[pos..].trim()),
        None => (input, ""),
    }
}

fn print_help() {
    println!(r#"
COMMANDS:

  Contacts:
    contacts [asc|desc]       List all contacts
    add-contact [name]        Add a new contact (interactive)
    show-contact <name>       Show contact details
    edit-contact <name>       Edit a contact
    delete-contact <name>     Delete a contact
    find <query>              Search name, numbers, email, address, notes and groups
    filter <group> [/ query]  Contacts in a group or any of its subgroups
    join <name>               Add a contact to a group
    leave <name>              Remove a contact from a group

  Groups:
    groups                    Show the group tree with member counts
    add-group [name]          Create a group, optionally under a parent
    show-group <name>         Show group details and members
    edit-group <name>         Edit name, description and parent
    move-group <name>         Move a group under another parent
    delete-group <name>       Delete a group; its subgroups move up one level
    find-group <query>        Search groups, keeping their parents for context

  AI-assisted:
    suggest <name>            Ask the local model which group fits a contact

  Import / export:
    import <file.json>        Import groups and contacts
    export <path> [csv|txt]   Export all contacts

  Other:
    help                      Show this help
    exit / quit / q           Exit

TIPS:
  - Names are case-insensitive and partial matches work
  - Members of a subgroup count towards every group above it"#);
}
