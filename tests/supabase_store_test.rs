use httpmock::prelude::*;
use report_import::core::introspector::SchemaIntrospector;
use report_import::domain::model::{ImportContext, InsertRow, ReportPayload};
use report_import::domain::ports::ReportStore;
use report_import::{standard_registry, ImportError, ImportOrchestrator, SupabaseStore};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const KEY: &str = "service-key";
const SCHEMA: &str = "neta_ops";

fn store(server: &MockServer) -> SupabaseStore {
    SupabaseStore::new(&server.base_url(), KEY, SCHEMA, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_table_columns_wire_format() {
    let server = MockServer::start_async().await;
    let rpc = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/rpc/get_table_columns")
                .header("apikey", KEY)
                .header("Authorization", format!("Bearer {}", KEY))
                .header("Accept-Profile", SCHEMA)
                .header("Content-Profile", SCHEMA)
                .json_body(json!({"table_name": "switchgear_reports"}));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([
                    {"column_name": "id", "data_type": "uuid"},
                    {"column_name": "data", "data_type": "jsonb"}
                ]));
        })
        .await;

    let response = store(&server).table_columns("switchgear_reports").await.unwrap();

    rpc.assert_async().await;
    assert_eq!(response[1]["column_name"], "data");
}

#[tokio::test]
async fn test_insert_asks_for_representation() {
    let server = MockServer::start_async().await;
    let insert = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/panelboard_reports")
                .header("Prefer", "return=representation")
                .header("Content-Profile", SCHEMA)
                .json_body(json!({"data": {"reportInfo": {}}, "job_id": "job-1"}));
            then.status(201).json_body(json!([{"id": "r-1"}]));
        })
        .await;

    let mut row = InsertRow::new();
    row.insert("data".to_string(), json!({"reportInfo": {}}));
    row.insert("job_id".to_string(), json!("job-1"));

    let stored = store(&server).insert("panelboard_reports", &row).await.unwrap();

    insert.assert_async().await;
    assert_eq!(stored, json!([{"id": "r-1"}]));
}

#[tokio::test]
async fn test_error_statuses() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/panelboard_reports");
            then.status(409).body(r#"{"message":"duplicate key"}"#);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/rpc/get_table_columns");
            then.status(404).body(r#"{"message":"function not found"}"#);
        })
        .await;

    let store = Arc::new(store(&server));

    let err = store.insert("panelboard_reports", &InsertRow::new()).await.unwrap_err();
    match err {
        ImportError::InsertError { table, message } => {
            assert_eq!(table, "panelboard_reports");
            assert!(message.contains("409"));
        }
        other => panic!("expected insert error, got {:?}", other),
    }

    let introspector = SchemaIntrospector::new(store);
    let err = introspector.describe("panelboard_reports").await.unwrap_err();
    assert!(matches!(err, ImportError::SchemaUnavailable { .. }));
}

#[tokio::test]
async fn test_end_to_end_import_against_rest_api() {
    let server = MockServer::start_async().await;
    let rpc = server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/rpc/get_table_columns");
            then.status(200).json_body(json!([
                {"column_name": "id", "data_type": "uuid"},
                {"column_name": "job_id", "data_type": "uuid"},
                {"column_name": "user_id", "data_type": "uuid"},
                {"column_name": "report_info", "data_type": "jsonb"},
                {"column_name": "visual_inspection", "data_type": "jsonb"}
            ]));
        })
        .await;
    let report = server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/metal_enclosed_busway_reports");
            then.status(201).json_body(json!([{"id": "r-42"}]));
        })
        .await;
    let asset = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/assets")
                .json_body(json!({
                    "name": "Metal Enclosed Busway Report",
                    "file_url": "report:/jobs/job-1/metal-enclosed-busway/r-42",
                    "user_id": "user-1"
                }));
            then.status(201).json_body(json!([{"id": "a-7"}]));
        })
        .await;
    let link = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/job_assets")
                .json_body(json!({"job_id": "job-1", "asset_id": "a-7", "user_id": "user-1"}));
            then.status(201);
        })
        .await;

    let orchestrator = ImportOrchestrator::new(standard_registry(), Arc::new(store(&server)));
    let payload: ReportPayload = serde_json::from_value(json!({
        "reportType": "metal-enclosed-busway",
        "data": {"fields": {"customer": "Acme"}}
    }))
    .unwrap();

    let result = orchestrator
        .import(&payload, &ImportContext::new("job-1", "user-1"))
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.report_id.as_deref(), Some("r-42"));
    rpc.assert_async().await;
    report.assert_async().await;
    asset.assert_async().await;
    link.assert_async().await;
}
