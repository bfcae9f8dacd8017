use rusqlite::Connection;
use std::io::{self, Write};

use crate::config::Config;
use crate::error::NexusError;
use crate::model::*;
use crate::queries::*;

pub struct CLIContext {
    pub conn: Connection,
    pub config: Config,
}

impl CLIContext {
    pub fn new(conn: Connection, config: Config) -> Self {
        Self { conn, config }
    }

    /// Prompt and read a line from stdin. Returns None on EOF.
    pub fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        io::stdout().flush().ok();
        let mut buf = String::new();
        match io::stdin().read_line(&mut buf) {
            Ok(0) => None,
            Ok(_) => Some(buf.trim_end_matches('\n').trim_end_matches('\r').to_string()),
            Err(_) => None,
        }
    }

    /// Read a line, trimmed.
    pub fn prompt(&self, prompt: &str) -> Option<String> {
        self.read_line(prompt).map(|s| s.trim().to_string())
    }

    /// Ask a yes/no question. Anything but "y"/"yes" is a no.
    pub fn confirm(&self, question: &str) -> bool {
        self.prompt(&format!("{} (y/N): ", question))
            .map(|a| a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes"))
            .unwrap_or(false)
    }

    /// Find a contact by name or phone fragment. Prints a message if nothing
    /// or more than one contact matches.
    pub fn find_contact(&self, args: &str) -> Option<Contact> {
        let query = args.trim();
        if query.is_empty() {
            return None;
        }

        let contacts = contact_queries::all_contacts(&self.conn).unwrap_or_default();
        let lower = query.to_lowercase();
        let matches: Vec<&Contact> = contacts
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&lower) || c.phone_number.contains(query))
            .collect();

        pick_one(query, "contact", matches, |c| &c.name, |c| {
            format!("{} ({})", c.name, c.phone_number)
        })
    }

    /// Find a group by name fragment.
    pub fn find_group(&self, args: &str) -> Option<Group> {
        let query = args.trim();
        if query.is_empty() {
            return None;
        }

        let groups = group_queries::all_groups(&self.conn).unwrap_or_default();
        let lower = query.to_lowercase();
        let matches: Vec<&Group> = groups
            .iter()
            .filter(|g| g.name.to_lowercase().contains(&lower))
            .collect();

        pick_one(query, "group", matches, |g| &g.name, |g| {
            group_queries::group_path(&self.conn, g.id)
                .ok()
                .flatten()
                .unwrap_or_else(|| g.name.clone())
        })
    }

    /// Names of the groups a contact is tagged with.
    pub fn group_names_for(&self, contact: &Contact) -> Vec<String> {
        group_queries::group_names(&self.conn, &contact.group_ids).unwrap_or_default()
    }

    /// Print an error.
    pub fn print_error(&self, e: &NexusError) {
        println!("Error: {}", e);
    }
}

fn pick_one<T: Clone>(
    query: &str,
    what: &str,
    matches: Vec<&T>,
    name: impl Fn(&T) -> &String,
    describe: impl Fn(&T) -> String,
) -> Option<T> {
    match matches.len() {
        0 => {
            println!("No {} found matching '{}'", what, query);
            None
        }
        1 => Some(matches[0].clone()),
        _ => {
            if let Some(exact) = matches.iter().find(|m| name(**m).eq_ignore_ascii_case(query)) {
                return Some((*exact).clone());
            }
            println!("Multiple matches found:");
            for m in &matches {
                println!("  {}", describe(*m));
            }
            println!("Please be more specific.");
            None
        }
    }
}
