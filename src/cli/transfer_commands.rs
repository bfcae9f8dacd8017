use std::path::Path;

use crate::cli::context::CLIContext;
use crate::transfer::{self, ExportFormat, ImportStats};

pub fn import(ctx: &CLIContext, args: &str) {
    if args.is_empty() {
        println!("Usage: import <file.json>");
        return;
    }

    match transfer::import_json(&ctx.conn, Path::new(args)) {
        Ok(stats) => print_import_stats(&stats),
        Err(e) => ctx.print_error(&e),
    }
}

pub fn print_import_stats(stats: &ImportStats) {
    println!("Import complete!");
    println!("  Groups: {}", stats.groups);
    println!("  Contacts: {}", stats.contacts);
    if stats.skipped_groups + stats.skipped_contacts > 0 {
        println!(
            "  Skipped: {} group(s), {} contact(s)",
            stats.skipped_groups, stats.skipped_contacts
        );
    }
    if stats.dropped_references > 0 {
        println!("  Dropped references: {}", stats.dropped_references);
    }
}

/// `export <path> [csv|txt]`. The format defaults to the file extension.
pub fn export(ctx: &CLIContext, args: &str) {
    let mut parts = args.split_whitespace();
    let path = match parts.next() {
        Some(p) => Path::new(p),
        None => {
            println!("Usage: export <path> [csv|txt]");
            return;
        }
    };

    let format = match parts.next() {
        Some(f) => match ExportFormat::parse(f) {
            Some(format) => format,
            None => {
                println!("Unknown format '{}'. Use csv or txt.", f);
                return;
            }
        },
        None => ExportFormat::from_path(path),
    };

    match transfer::export_to_path(&ctx.conn, format, path) {
        Ok(n) => println!("Exported {} contact(s) to {}", n, path.display()),
        Err(e) => ctx.print_error(&e),
    }
}
