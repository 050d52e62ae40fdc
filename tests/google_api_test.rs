//! Drive / Sheets クライアントのテスト（モックサーバ使用）

use drive_linker::auth::Authenticator;
use drive_linker::error::LinkerError;
use drive_linker::google::{DriveClient, GoogleClient, SheetsClient};
use drive_linker_common::CellRef;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn client() -> GoogleClient {
    let auth = Arc::new(Authenticator::Static("test-token".into()));
    GoogleClient::new(auth, Duration::from_secs(5)).unwrap()
}

fn drive(server: &MockServer) -> DriveClient {
    DriveClient::with_base_url(client(), server.base_url()).with_page_size(2)
}

fn sheets(server: &MockServer) -> SheetsClient {
    SheetsClient::with_base_url(client(), server.base_url())
}

#[tokio::test]
async fn test_list_folders_follows_pages() {
    let server = MockServer::start_async().await;

    let page1 = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/files")
                .header("authorization", "Bearer test-token")
                .query_param(
                    "q",
                    "mimeType = 'application/vnd.google-apps.folder' and trashed = false",
                )
                .query_param("pageSize", "2")
                .query_param_missing("pageToken");
            then.status(200).json_body(json!({
                "files": [{"id": "f1", "name": "Receipts"}, {"id": "f2", "name": "Scans"}],
                "nextPageToken": "next-1"
            }));
        })
        .await;

    let page2 = server
        .mock_async(|when, then| {
            when.method(GET).path("/files").query_param("pageToken", "next-1");
            then.status(200)
                .json_body(json!({"files": [{"id": "f3", "name": "Archive"}]}));
        })
        .await;

    let folders = drive(&server).list_folders().await.unwrap();

    page1.assert_async().await;
    page2.assert_async().await;
    let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Receipts", "Scans", "Archive"]);
}

#[tokio::test]
async fn test_list_children_page_query() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/files").query_param(
                "q",
                "'folder-1' in parents and mimeType != 'application/vnd.google-apps.folder' and trashed = false",
            );
            then.status(200).json_body(json!({
                "files": [{
                    "id": "a",
                    "name": "Scan 45 (2).pdf",
                    "parents": ["folder-1"],
                    "webViewLink": "https://drive.google.com/file/d/a/view",
                    "mimeType": "application/pdf"
                }]
            }));
        })
        .await;

    let page = drive(&server).list_children_page("folder-1", None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.files.len(), 1);
    assert_eq!(page.files[0].parents, vec!["folder-1"]);
    assert_eq!(
        page.files[0].web_view_link.as_deref(),
        Some("https://drive.google.com/file/d/a/view")
    );
    assert!(page.next_page_token.is_none());
}

#[tokio::test]
async fn test_file_name() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/files/parent-9").query_param("fields", "name");
            then.status(200).json_body(json!({"name": "2024 Receipts"}));
        })
        .await;

    let name = drive(&server).file_name("parent-9").await.unwrap();
    mock.assert_async().await;
    assert_eq!(name, "2024 Receipts");
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/files");
            then.status(403).json_body(json!({
                "error": {"code": 403, "message": "Insufficient Permission"}
            }));
        })
        .await;

    let err = drive(&server).list_spreadsheets().await.unwrap_err();
    match err {
        LinkerError::ApiCall(msg) => {
            assert!(msg.starts_with("403"));
            assert!(msg.contains("Insufficient Permission"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_list_tabs() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/spreadsheets/sheet-1");
            then.status(200).json_body(json!({
                "sheets": [
                    {"properties": {"title": "Ledger", "gridProperties": {"rowCount": 500, "columnCount": 20}}},
                    {"properties": {"title": "Notes", "gridProperties": {"rowCount": 10, "columnCount": 3}}}
                ]
            }));
        })
        .await;

    let tabs = sheets(&server).list_tabs("sheet-1").await.unwrap();
    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[0].title, "Ledger");
    assert_eq!(tabs[0].column_count, 20);
}

#[tokio::test]
async fn test_header_columns_reads_first_row() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/spreadsheets/sheet-1");
            then.status(200).json_body(json!({
                "sheets": [{"properties": {"title": "Ledger", "gridProperties": {"rowCount": 100, "columnCount": 3}}}]
            }));
        })
        .await;

    let header = server
        .mock_async(|when, then| {
            when.method(GET).path("/spreadsheets/sheet-1/values/'Ledger'!A1:C1");
            then.status(200).json_body(json!({
                "range": "Ledger!A1:C1",
                "values": [["Date", "Number", "Link"]]
            }));
        })
        .await;

    let columns = sheets(&server).header_columns("sheet-1", "Ledger").await.unwrap();
    header.assert_async().await;

    assert_eq!(columns.len(), 3);
    assert_eq!(columns[1].name, "Number");
    assert_eq!(columns[1].letter, "B");
    assert_eq!(columns[2].to_string(), "Link (C)");
}

#[tokio::test]
async fn test_header_columns_missing_tab() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/spreadsheets/sheet-1");
            then.status(200)
                .json_body(json!({"sheets": [{"properties": {"title": "Ledger"}}]}));
        })
        .await;

    let err = sheets(&server).header_columns("sheet-1", "Nope").await.unwrap_err();
    assert!(matches!(err, LinkerError::TabNotFound(t) if t == "Nope"));
}

#[tokio::test]
async fn test_column_values_stringifies_numbers() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/spreadsheets/sheet-1/values/'Ledger'!B:B");
            then.status(200).json_body(json!({
                "values": [["Number"], [101], ["102"], [], ["x"]]
            }));
        })
        .await;

    let values = sheets(&server)
        .column_values("sheet-1", "Ledger", "B")
        .await
        .unwrap();
    assert_eq!(values.len(), 5);
    assert_eq!(values[1], vec!["101"]);
    assert_eq!(values[2], vec!["102"]);
    assert!(values[3].is_empty());
}

#[tokio::test]
async fn test_update_cell_writes_raw_value() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/spreadsheets/sheet-1/values/'Ledger'!T5:T5")
                .query_param("valueInputOption", "RAW")
                .header("authorization", "Bearer test-token")
                .json_body(json!({
                    "majorDimension": "ROWS",
                    "values": [["https://drive.google.com/file/d/a/view"]]
                }));
            then.status(200).json_body(json!({
                "spreadsheetId": "sheet-1",
                "updatedRange": "Ledger!T5",
                "updatedCells": 1
            }));
        })
        .await;

    let cell = CellRef::parse("T5").unwrap();
    let updated = sheets(&server)
        .update_cell("sheet-1", "Ledger", &cell, "https://drive.google.com/file/d/a/view")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(updated, 1);
}
