use nexus::model::*;

// ==========================================================================
// ID TESTS
// ==========================================================================

#[test]
fn id_generate_creates_unique_ids() {
    let id1 = Id::<Group>::generate();
    let id2 = Id::<Group>::generate();
    assert_ne!(id1, id2);
}

#[test]
fn id_round_trips_through_string() {
    let id = Id::<Contact>::generate();
    let parsed: Id<Contact> = format!(" {} ", id).parse().unwrap();
    assert_eq!(parsed, id);
    assert!(Id::<Contact>::parse("not-a-uuid").is_err());
}

#[test]
fn id_serializes_as_plain_string() {
    let id = Id::<Group>::generate();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", id));
}

// ==========================================================================
// GROUP TESTS
// ==========================================================================

#[test]
fn group_create_generates_id() {
    let g = Group::create("Savani Parivar".into(), None, None);
    assert_eq!(g.name, "Savani Parivar");
    assert!(g.is_root());
    assert_ne!(g.id, Group::create("Savani Parivar".into(), None, None).id);
}

#[test]
fn group_with_parent_is_not_root() {
    let parent = Group::create("Patel Society".into(), None, None);
    let child = Group::create("Savani Parivar".into(), Some("Nanasurka".into()), Some(parent.id));
    assert!(!child.is_root());
    assert_eq!(child.parent_id, Some(parent.id));
}

// ==========================================================================
// CONTACT TESTS
// ==========================================================================

#[test]
fn contact_create_defaults() {
    let c = Contact::create("Ramesh".into(), "9825011111".into());
    assert_eq!(c.name, "Ramesh");
    assert_eq!(c.phone_number, "9825011111");
    assert!(c.email.is_none());
    assert!(c.group_ids.is_empty());
    assert!(c.alternative_numbers.is_empty());
    assert!(c.sources.is_empty());
}

#[test]
fn contact_join_is_idempotent() {
    let mut c = Contact::create("Ramesh".into(), "1".into());
    let g = Id::<Group>::generate();

    assert!(c.join(g));
    assert!(!c.join(g));
    assert_eq!(c.group_ids, vec![g]);
    assert!(c.in_group(g));
}

#[test]
fn contact_leave_reports_presence() {
    let mut c = Contact::create("Ramesh".into(), "1".into());
    let g = Id::<Group>::generate();
    c.join(g);

    assert!(c.leave(g));
    assert!(!c.leave(g));
    assert!(!c.in_group(g));
}

#[test]
fn display_names_one_per_language_in_order() {
    let mut c = Contact::create("Ramesh".into(), "1".into());
    c.set_display_name(DisplayLang::Hi, "रमेश".into());
    c.set_display_name(DisplayLang::Gu, "રમેશ".into());
    c.set_display_name(DisplayLang::Gu, "રમેશભાઈ".into());

    assert_eq!(c.display_names.len(), 2);
    assert_eq!(c.display_names[0].lang, DisplayLang::Gu);
    assert_eq!(c.display_name(DisplayLang::Gu), Some("રમેશભાઈ"));
    assert_eq!(c.display_name(DisplayLang::En), None);
}

#[test]
fn display_lang_parse() {
    assert_eq!(DisplayLang::parse(" GU "), Some(DisplayLang::Gu));
    assert_eq!(DisplayLang::parse("fr"), None);
    assert_eq!(DisplayLang::ALL.len(), 3);
}

#[test]
fn contact_source_parse_and_str() {
    for source in [
        ContactSource::Gmail,
        ContactSource::Sim,
        ContactSource::Whatsapp,
        ContactSource::Other,
        ContactSource::Csv,
    ] {
        assert_eq!(ContactSource::parse(source.as_str()), Some(source));
    }
    assert_eq!(ContactSource::parse("WhatsApp"), Some(ContactSource::Whatsapp));
    assert_eq!(ContactSource::parse("fax"), None);
}

#[test]
fn address_blank_ignores_label() {
    let labelled_only = LabeledAddress {
        label: Some("Home".into()),
        ..Default::default()
    };
    assert!(labelled_only.is_blank());

    let with_city = LabeledAddress {
        city: Some("Bhavnagar".into()),
        ..labelled_only
    };
    assert!(!with_city.is_blank());
}

#[test]
fn address_one_line_skips_missing_parts() {
    let a = LabeledAddress {
        label: Some("Home".into()),
        street: Some("12 Station Road".into()),
        city: Some("Bhavnagar".into()),
        country: Some("India".into()),
        ..Default::default()
    };
    assert_eq!(a.one_line(), "12 Station Road, Bhavnagar, India");
}

#[test]
fn contact_json_uses_field_names() {
    let mut c = Contact::create("Ramesh".into(), "9825011111".into());
    c.sources.push(ContactSource::Whatsapp);
    let json = serde_json::to_value(&c).unwrap();
    assert_eq!(json["name"], "Ramesh");
    assert_eq!(json["sources"][0], "whatsapp");
}
