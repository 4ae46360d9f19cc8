use super::*;
use chrono::{TimeZone, Utc};
use reference::parse_reference_csv;

#[test]
fn empty_selection_is_invalid() {
    let selection = Selection::new("A", "100");
    assert_eq!(validate(&selection), Err(ValidationError::NoPositiveQuantity));
    assert!(!is_valid(&selection));
}

#[test]
fn all_zero_quantities_are_invalid() {
    let selection = Selection::new("A", "100")
        .with_item("Bolt", 0)
        .with_item("Nut", 0);
    assert!(!is_valid(&selection));
}

#[test]
fn one_positive_quantity_is_valid() {
    let selection = Selection::new("A", "100")
        .with_item("Bolt", 0)
        .with_item("Nut", 2);
    assert!(is_valid(&selection));
}

#[test]
fn reselecting_an_item_overwrites_its_quantity() {
    let mut selection = Selection::new("A", "100").with_item("Bolt", 1);
    selection.set_quantity("Nut", 4);
    selection.set_quantity("Bolt", 0);
    assert_eq!(selection.quantity("Bolt"), Some(0));
    let items: Vec<&str> = selection.items().map(|item| item.as_str()).collect();
    assert_eq!(items, vec!["Bolt", "Nut"]);

    selection.deselect("Nut");
    assert!(!is_valid(&selection));
}

#[test]
fn folder_name_joins_database_po_and_timestamp() {
    assert_eq!(
        build_folder_name("A", "100", "2024-01-02_03-04-05"),
        "A_100_2024-01-02_03-04-05"
    );
}

#[test]
fn timestamp_uses_jakarta_time() {
    let instant = Utc.with_ymd_and_hms(2024, 1, 1, 20, 4, 5).unwrap();
    assert_eq!(format_timestamp(instant), "2024-01-02_03-04-05");
}

#[test]
fn records_skip_zero_quantities_and_keep_selection_order() {
    let selection = Selection::new("WH-A", "100")
        .with_item("Nut", 5)
        .with_item("Bolt", 0)
        .with_item("Washer", 1);
    let records = build_records(&selection, "2024-01-02_03-04-05", "https://x/y");

    let items: Vec<(&str, u32)> = records
        .iter()
        .map(|record| (record.item.as_str(), record.quantity))
        .collect();
    assert_eq!(items, vec![("Nut", 5), ("Washer", 1)]);
    assert!(records.iter().all(|record| record.folder_url == "https://x/y"
        && record.database.as_str() == "WH-A"
        && record.po_number.as_str() == "100"
        && record.timestamp == "2024-01-02_03-04-05"));
}

#[test]
fn selection_is_checked_against_reference_index() {
    let index = parse_reference_csv("Database,Nomor PO,Item\nA,1,x\nA,1,y\nB,2,z\n")
        .expect("index");

    let ok = Selection::new("A", "1").with_item("y", 1);
    assert_eq!(ok.check_against(&index), Ok(()));

    let unknown_db = Selection::new("C", "1").with_item("x", 1);
    assert_eq!(
        unknown_db.check_against(&index),
        Err(ValidationError::UnknownDatabase("C".to_string()))
    );

    let wrong_po = Selection::new("A", "2").with_item("x", 1);
    assert!(matches!(
        wrong_po.check_against(&index),
        Err(ValidationError::UnknownPurchaseOrder { .. })
    ));

    let wrong_item = Selection::new("A", "1").with_item("z", 1);
    assert_eq!(
        wrong_item.check_against(&index),
        Err(ValidationError::UnknownItem {
            po_number: "1".to_string(),
            item: "z".to_string(),
        })
    );
}

#[test]
fn user_messages_follow_form_wording() {
    let validation = SubmissionError::from(ValidationError::NoPositiveQuantity);
    assert_eq!(
        validation.user_message(),
        "Please enter quantity for at least one item."
    );

    let upload = SubmissionError::from(UploadError::Status {
        status: 500,
        body: "boom".to_string(),
    });
    assert_eq!(upload.user_message(), "Drive Error: 500 - boom");

    let append = SubmissionError::from(AppendError::Status {
        status: 403,
        body: "denied".to_string(),
    });
    assert_eq!(append.user_message(), "Sheet Error: 403 - denied");

    let transport = SubmissionError::from(UploadError::Transport("refused".to_string()));
    assert_eq!(
        transport.user_message(),
        "Submission failed: upload request failed: refused"
    );
}

#[test]
fn quantity_fields_parse_as_whole_numbers() {
    assert_eq!(parse_quantity("Bolt", "3"), Ok(3));
    assert_eq!(parse_quantity("Bolt", " "), Ok(0));
    assert_eq!(
        parse_quantity("Bolt", "-1"),
        Err(ValidationError::InvalidQuantity {
            item: "Bolt".to_string(),
            value: "-1".to_string(),
        })
    );
    assert!(parse_quantity("Bolt", "2.5").is_err());
}
