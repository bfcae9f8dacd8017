//! Moving contacts in and out of the address book.

pub mod export;
pub mod import;

pub use export::{export_contacts, export_to_path, ExportFormat};
pub use import::{import_json, import_str, ImportStats};
