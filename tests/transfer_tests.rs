use nexus::db::*;
use nexus::error::ErrorKind;
use nexus::model::*;
use nexus::ops::*;
use nexus::queries::*;
use nexus::transfer::{self, ExportFormat, ImportStats};

const BOOK: &str = r#"{
    "groups": [
        { "id": "g1", "name": "Savani Parivar", "description": "Nanasurka" },
        { "id": "g3", "name": "Cousins", "parentId": "g2" },
        { "id": "g2", "name": "Ramesh Family", "parentId": "g1" },
        { "id": "g4", "name": "Lost Branch", "parentId": "missing" }
    ],
    "contacts": [
        {
            "id": "c1",
            "name": "Ramesh Savani",
            "phoneNumber": "9825011111",
            "email": "ramesh@example.com",
            "alternativeNumbers": ["9825022222"],
            "addresses": [{ "label": "Home", "city": "Bhavnagar" }],
            "displayNames": [{ "lang": "gu", "name": "રમેશ" }, { "lang": "xx", "name": "?" }],
            "groupIds": ["g3", "unknown"],
            "sources": ["sim", "fax"]
        },
        { "id": "c2", "name": "Mukesh Savani", "phoneNumber": "9925022222", "groupIds": ["g1"] },
        { "id": "c3", "name": "   ", "phoneNumber": "1" }
    ]
}"#;

fn setup() -> rusqlite::Connection {
    schema::test_connection()
}

// ==========================================================================
// IMPORT TESTS
// ==========================================================================

#[test]
fn import_reports_counts() {
    let conn = setup();
    let stats = transfer::import_str(&conn, BOOK).unwrap();
    assert_eq!(
        stats,
        ImportStats {
            groups: 4,
            contacts: 2,
            skipped_groups: 0,
            skipped_contacts: 1,
            dropped_references: 2,
        }
    );
}

#[test]
fn import_preserves_hierarchy_with_fresh_ids() {
    let conn = setup();
    transfer::import_str(&conn, BOOK).unwrap();

    let cousins = group_repo::find_by_name(&conn, "Cousins").unwrap().unwrap();
    let path = group_queries::group_path(&conn, cousins.id).unwrap().unwrap();
    assert_eq!(path, "Savani Parivar > Ramesh Family > Cousins");

    let lost = group_repo::find_by_name(&conn, "Lost Branch").unwrap().unwrap();
    assert!(lost.is_root());

    let savani = group_repo::find_by_name(&conn, "Savani Parivar").unwrap().unwrap();
    assert_eq!(savani.description.as_deref(), Some("Nanasurka"));
}

#[test]
fn import_preserves_membership() {
    let conn = setup();
    transfer::import_str(&conn, BOOK).unwrap();

    let savani = group_repo::find_by_name(&conn, "Savani Parivar").unwrap().unwrap();
    let cousins = group_repo::find_by_name(&conn, "Cousins").unwrap().unwrap();

    let members = contact_queries::contacts_in_group(&conn, savani.id).unwrap();
    assert_eq!(members.len(), 2);

    let ramesh = members.iter().find(|c| c.name == "Ramesh Savani").unwrap();
    assert_eq!(ramesh.group_ids, vec![cousins.id]);
    assert_eq!(ramesh.alternative_numbers, vec!["9825022222"]);
    assert_eq!(ramesh.addresses[0].city.as_deref(), Some("Bhavnagar"));
    assert_eq!(ramesh.display_names.len(), 1);
    assert_eq!(ramesh.display_name(DisplayLang::Gu), Some("રમેશ"));
    assert_eq!(ramesh.sources, vec![ContactSource::Sim]);
}

#[test]
fn import_accepts_bare_contact_list() {
    let conn = setup();
    let stats = transfer::import_str(
        &conn,
        r#"[{ "name": "Jay", "phoneNumber": "9925033333" }]"#,
    )
    .unwrap();
    assert_eq!(stats.contacts, 1);
    assert_eq!(stats.groups, 0);
    assert_eq!(contact_repo::count(&conn).unwrap(), 1);
}

#[test]
fn import_breaks_parent_cycles() {
    let conn = setup();
    let stats = transfer::import_str(
        &conn,
        r#"{ "groups": [
            { "id": "a", "name": "A", "parentId": "b" },
            { "id": "b", "name": "B", "parentId": "a" }
        ] }"#,
    )
    .unwrap();
    assert_eq!(stats.groups, 2);
    assert_eq!(stats.dropped_references, 1);

    let forest = group_queries::hierarchy(&conn).unwrap();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].children.len(), 1);
}

#[test]
fn import_skips_blank_group_and_lifts_its_children() {
    let conn = setup();
    let stats = transfer::import_str(
        &conn,
        r#"{ "groups": [
            { "id": "a", "name": " " },
            { "id": "b", "name": "B", "parentId": "a" }
        ] }"#,
    )
    .unwrap();
    assert_eq!(stats.groups, 1);
    assert_eq!(stats.skipped_groups, 1);
    assert_eq!(stats.dropped_references, 1);
    assert!(group_repo::find_by_name(&conn, "B").unwrap().unwrap().is_root());
}

#[test]
fn import_skips_records_without_a_name() {
    let conn = setup();
    let stats = transfer::import_str(
        &conn,
        r#"{
            "groups": [{ "id": "g1" }, { "id": "g2", "name": "Elders" }],
            "contacts": [
                { "phoneNumber": "9825011111" },
                { "name": "Mukesh", "phoneNumber": "9925022222", "groupIds": ["g2"] }
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(stats.groups, 1);
    assert_eq!(stats.skipped_groups, 1);
    assert_eq!(stats.contacts, 1);
    assert_eq!(stats.skipped_contacts, 1);

    let all = contact_repo::find_all(&conn).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Mukesh");
}

#[test]
fn import_invalid_json_writes_nothing() {
    let conn = setup();
    let err = transfer::import_str(&conn, r#"{ "groups": [ { "id": 1 } ] "#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(group_repo::find_all(&conn).unwrap().is_empty());
}

#[test]
fn import_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");
    std::fs::write(&path, BOOK).unwrap();

    let conn = setup();
    let stats = transfer::import_json(&conn, &path).unwrap();
    assert_eq!(stats.contacts, 2);

    let missing = dir.path().join("missing.json");
    let err = transfer::import_json(&conn, &missing).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
}

// ==========================================================================
// EXPORT TESTS
// ==========================================================================

fn export(conn: &rusqlite::Connection, format: ExportFormat) -> String {
    let mut out = Vec::new();
    transfer::export_contacts(conn, format, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn csv_export_has_header_and_resolved_groups() {
    let conn = setup();
    let elders = group_ops::create_group(&conn, "Elders", None, None).unwrap();
    let mut input = ContactInput::new("Ramesh", "9825011111");
    input.group_ids = vec![elders.id];
    input.alternative_numbers = vec!["1".into(), "2".into()];
    contact_ops::add_contact(&conn, input).unwrap();

    let csv = export(&conn, ExportFormat::Csv);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Name,Phone,Email,Alternative Numbers,Groups,Notes");
    assert_eq!(lines[1], "Ramesh,9825011111,,1; 2,Elders,");
}

#[test]
fn csv_export_quotes_special_fields() {
    let conn = setup();
    let mut input = ContactInput::new("Savani, Ramesh", "9825011111");
    input.notes = Some("Says \"hello\"\nevery morning".into());
    contact_ops::add_contact(&conn, input).unwrap();

    let csv = export(&conn, ExportFormat::Csv);
    assert!(csv.contains("\"Savani, Ramesh\",9825011111,"));
    assert!(csv.contains("\"Says \"\"hello\"\"\nevery morning\""));
}

#[test]
fn txt_export_writes_one_block_per_contact() {
    let conn = setup();
    let mut input = ContactInput::new("Ramesh", "9825011111");
    input.email = Some("ramesh@example.com".into());
    contact_ops::add_contact(&conn, input).unwrap();
    contact_ops::add_contact(&conn, ContactInput::new("Mukesh", "9925022222")).unwrap();

    let txt = export(&conn, ExportFormat::Txt);
    let blocks: Vec<&str> = txt.split("\n\n").collect();
    assert_eq!(blocks.len(), 3);
    assert!(blocks[0].starts_with("Contacts exported"));
    assert!(blocks[1].starts_with("Name: Mukesh"));
    assert!(blocks[2].contains("Email: ramesh@example.com"));
}

#[test]
fn export_to_path_returns_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.csv");

    let conn = setup();
    contact_ops::add_contact(&conn, ContactInput::new("Ramesh", "1")).unwrap();
    let n = transfer::export_to_path(&conn, ExportFormat::from_path(&path), &path).unwrap();
    assert_eq!(n, 1);

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("Name,Phone"));
}

#[test]
fn export_round_trips_through_import_counts() {
    let source = setup();
    transfer::import_str(&source, BOOK).unwrap();
    let csv = export(&source, ExportFormat::Csv);
    // header plus one line per contact
    assert_eq!(csv.lines().count(), 3);
}
