use std::path::PathBuf;

use nexus::config::{Config, DEFAULT_LOG_FILTER};
use nexus::transfer::{self, ExportFormat};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .target(env_logger::Target::Stderr)
        .init();

    let mut config = Config::from_env();
    let mut args = std::env::args().skip(1);
    let mut import_path: Option<PathBuf> = None;
    let mut export_path: Option<PathBuf> = None;
    let mut format: Option<ExportFormat> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--file" | "-f" => {
                config.db_path = Some(required(args.next(), "--file requires a path argument"));
            }
            "--import" => {
                import_path = Some(required(args.next(), "--import requires a JSON file path"));
            }
            "--export" => {
                export_path = Some(required(args.next(), "--export requires an output path"));
            }
            "--format" => {
                let value = args.next().unwrap_or_default();
                format = ExportFormat::parse(&value);
                if format.is_none() {
                    eprintln!("Error: --format must be csv or txt");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Use --help for usage information.");
                std::process::exit(1);
            }
        }
    }

    if let Some(ref path) = config.db_path {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(dir) {
                eprintln!("Error creating {}: {}", dir.display(), e);
                std::process::exit(1);
            }
        }
    }

    let conn = match nexus::cli::open(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error opening database: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(json_path) = import_path {
        println!("Importing from {}...", json_path.display());
        match transfer::import_json(&conn, &json_path) {
            Ok(stats) => nexus::cli::transfer_commands::print_import_stats(&stats),
            Err(e) => {
                eprintln!("Import failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Some(out_path) = export_path {
        let format = format.unwrap_or_else(|| ExportFormat::from_path(&out_path));
        match transfer::export_to_path(&conn, format, &out_path) {
            Ok(n) => println!("Exported {} contact(s) to {}", n, out_path.display()),
            Err(e) => {
                eprintln!("Export failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    nexus::cli::run(conn, config);
}

fn required(value: Option<String>, message: &str) -> PathBuf {
    match value {
        Some(v) => PathBuf::from(v),
        None => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Nexus - contact book with nested family groups");
    println!();
    println!("Usage: nexus [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -f, --file <PATH>      SQLite file to use (default: $NEXUS_DB, else in memory)");
    println!("  --import <JSON_PATH>   Import groups and contacts before starting");
    println!("  --export <PATH>        Export contacts and exit");
    println!("  --format <csv|txt>     Export format (default: from the file extension)");
    println!("  -h, --help             Show this help");
    println!();
    println!("Environment:");
    println!("  NEXUS_DB               Default database file");
    println!("  OLLAMA_HOST            Ollama URL for 'suggest' (default: http://localhost:11434)");
    println!("  NEXUS_MODEL            Model used for 'suggest'");
    println!("  RUST_LOG               Log filter (default: warn)");
}
