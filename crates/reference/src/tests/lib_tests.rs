use super::*;
use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;

const SHEET: &str = "\
Database,Nomor PO,Item,Supplier
WH-A,100,Bolt M8,Acme
WH-A,100,Nut M8,Acme
WH-B,200,Cable,Wirex
WH-A,101,Washer,Acme
WH-A,100,Bracket,Acme
WH-B,200,Cable,Wirex
";

#[test]
fn index_keeps_distinct_pairs_with_items_in_first_seen_order() {
    let index = parse_reference_csv(SHEET).expect("index");

    let databases: Vec<&str> = index.databases().map(|db| db.as_str()).collect();
    assert_eq!(databases, vec!["WH-A", "WH-B"]);
    assert_eq!(index.pair_count(), 3);

    let pos: Vec<&str> = index
        .po_numbers("WH-A")
        .expect("WH-A")
        .into_iter()
        .map(|po| po.as_str())
        .collect();
    assert_eq!(pos, vec!["100", "101"]);

    let items: Vec<&str> = index
        .items("WH-A", "100")
        .expect("items")
        .iter()
        .map(|item| item.as_str())
        .collect();
    assert_eq!(items, vec!["Bolt M8", "Nut M8", "Bracket"]);

    let cables = index.items("WH-B", "200").expect("items");
    assert_eq!(cables.len(), 1);
}

#[test]
fn same_po_number_under_two_databases_stays_separate() {
    let csv = "Database,Nomor PO,Item\nA,1,x\nB,1,y\n";
    let index = parse_reference_csv(csv).expect("index");
    assert_eq!(index.pair_count(), 2);
    assert!(index.contains_item("A", "1", "x"));
    assert!(!index.contains_item("A", "1", "y"));
    assert!(index.contains_item("B", "1", "y"));
}

#[test]
fn columns_are_found_by_header_name() {
    let csv = "\"Item\",\"Database\",\"Nomor PO\"\n\"Pipe\",\"WH-C\",\"300\"\n";
    let index = parse_reference_csv(csv).expect("index");
    assert!(index.contains_item("WH-C", "300", "Pipe"));
}

#[test]
fn missing_column_is_reported() {
    let csv = "Database,PO,Item\nA,1,x\n";
    let err = parse_reference_csv(csv).expect_err("missing column");
    assert_eq!(err, DataFetchError::MissingColumn(PO_NUMBER_COLUMN));
}

#[test]
fn empty_body_is_missing_columns() {
    let err = parse_reference_csv("").expect_err("empty");
    assert_eq!(err, DataFetchError::MissingColumn(DATABASE_COLUMN));
}

#[test]
fn ragged_rows_are_malformed() {
    let csv = "Database,Nomor PO,Item\nA,1\n";
    let err = parse_reference_csv(csv).expect_err("ragged");
    assert!(matches!(err, DataFetchError::Malformed(_)));
}

#[test]
fn blank_rows_are_skipped() {
    let csv = "Database,Nomor PO,Item\nA,1,x\n,,\nA,,y\nA, 1 , z \n";
    let table = ReferenceTable::from_csv(csv).expect("table");
    assert_eq!(table.len(), 2);
    let index = table.into_index();
    let items: Vec<&str> = index
        .items("A", "1")
        .expect("items")
        .iter()
        .map(|item| item.as_str())
        .collect();
    assert_eq!(items, vec!["x", "z"]);
}

#[test]
fn float_rendered_po_numbers_are_normalized() {
    assert_eq!(normalize_po_number("100.0"), "100");
    assert_eq!(normalize_po_number("4500012.00"), "4500012");
    assert_eq!(normalize_po_number("PO-7.0"), "PO-7.0");
    assert_eq!(normalize_po_number("100.5"), "100.5");
    assert_eq!(normalize_po_number("100"), "100");

    let index = parse_reference_csv("Database,Nomor PO,Item\nA,100.0,x\n").expect("index");
    assert!(index.contains_item("A", "100", "x"));
}

#[test]
fn gviz_url_carries_sheet_name() {
    let url = gviz_csv_url("sheet-123", "Master").expect("url");
    assert_eq!(url.path(), "/spreadsheets/d/sheet-123/gviz/tq");
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(pairs.contains(&("tqx".to_string(), "out:csv".to_string())));
    assert!(pairs.contains(&("sheet".to_string(), "Master".to_string())));
}

async fn spawn_sheet_server(status: StatusCode, body: &'static str) -> url::Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route("/sheet.csv", get(move || async move { (status, body) }));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    url::Url::parse(&format!("http://{addr}/sheet.csv")).expect("url")
}

#[tokio::test]
async fn http_source_loads_index() {
    let url = spawn_sheet_server(StatusCode::OK, SHEET).await;
    let index = load(&HttpReferenceSource::new(url)).await.expect("load");
    assert_eq!(index.pair_count(), 3);
}

#[tokio::test]
async fn http_source_error_status_is_unreachable() {
    let url = spawn_sheet_server(StatusCode::NOT_FOUND, "gone").await;
    let err = load(&HttpReferenceSource::new(url))
        .await
        .expect_err("404");
    assert!(matches!(err, DataFetchError::Unreachable(_)));
}

#[tokio::test]
async fn http_source_connection_refused_is_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let url = url::Url::parse(&format!("http://{addr}/sheet.csv")).expect("url");
    let err = load(&HttpReferenceSource::new(url))
        .await
        .expect_err("refused");
    assert!(matches!(err, DataFetchError::Unreachable(_)));
}
