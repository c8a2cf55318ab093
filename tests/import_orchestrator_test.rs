use async_trait::async_trait;
use report_import::domain::model::{ImportContext, InsertRow, ReportPayload};
use report_import::domain::ports::ReportStore;
use report_import::utils::error::{ImportError, Result};
use report_import::{standard_registry, ImportOrchestrator};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory store: every table has `id, job_id, user_id, data` unless overridden.
#[derive(Default)]
struct MockStore {
    layouts: HashMap<String, Value>,
    failing_tables: Vec<String>,
    describe_calls: Mutex<usize>,
    inserts: Mutex<Vec<(String, InsertRow)>>,
}

impl MockStore {
    fn with_layout(mut self, table: &str, layout: Value) -> Self {
        self.layouts.insert(table.to_string(), layout);
        self
    }

    fn failing(mut self, table: &str) -> Self {
        self.failing_tables.push(table.to_string());
        self
    }

    async fn inserted_tables(&self) -> Vec<String> {
        self.inserts.lock().await.iter().map(|(t, _)| t.clone()).collect()
    }
}

#[async_trait]
impl ReportStore for MockStore {
    async fn table_columns(&self, table: &str) -> Result<Value> {
        *self.describe_calls.lock().await += 1;
        Ok(self.layouts.get(table).cloned().unwrap_or_else(|| {
            json!([
                {"column_name": "id", "data_type": "uuid"},
                {"column_name": "job_id", "data_type": "uuid"},
                {"column_name": "user_id", "data_type": "uuid"},
                {"column_name": "data", "data_type": "jsonb"}
            ])
        }))
    }

    async fn insert(&self, table: &str, row: &InsertRow) -> Result<Value> {
        if self.failing_tables.iter().any(|t| t == table) {
            return Err(ImportError::ApiStatusError {
                status: 409,
                body: "duplicate key".to_string(),
            });
        }
        let mut inserts = self.inserts.lock().await;
        inserts.push((table.to_string(), row.clone()));
        Ok(json!([{"id": format!("{}-{}", table, inserts.len())}]))
    }
}

fn payload(report_type: &str) -> ReportPayload {
    ReportPayload {
        report_type: report_type.to_string(),
        ..Default::default()
    }
}

fn context() -> ImportContext {
    ImportContext::new("job-7", "user-3")
}

#[tokio::test]
async fn test_import_inserts_report_and_links_asset() {
    let store = Arc::new(MockStore::default());
    let orchestrator = ImportOrchestrator::new(standard_registry(), store.clone());

    let result = orchestrator.import(&payload("panelboard-report"), &context()).await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.report_id.as_deref(), Some("panelboard_reports-1"));
    assert_eq!(result.report_type.as_deref(), Some("panelboard"));
    assert_eq!(
        store.inserted_tables().await,
        vec!["panelboard_reports", "assets", "job_assets"]
    );

    let inserts = store.inserts.lock().await;
    let (_, report) = &inserts[0];
    assert_eq!(report["job_id"], "job-7");
    assert!(report["data"]["reportInfo"].is_object());

    let (_, asset) = &inserts[1];
    assert_eq!(asset["name"], "Panelboard Report");
    assert_eq!(asset["file_url"], "report:/jobs/job-7/panelboard/panelboard_reports-1");
    assert_eq!(asset["user_id"], "user-3");

    let (_, link) = &inserts[2];
    assert_eq!(link["job_id"], "job-7");
    assert_eq!(link["asset_id"], "assets-2");
}

#[tokio::test]
async fn test_link_failure_keeps_success() {
    let store = Arc::new(MockStore::default().failing("assets"));
    let orchestrator = ImportOrchestrator::new(standard_registry(), store.clone());

    let result = orchestrator.import(&payload("switchgear-report"), &context()).await;

    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(store.inserted_tables().await, vec!["switchgear_reports"]);
}

#[tokio::test]
async fn test_linking_can_be_disabled() {
    let store = Arc::new(MockStore::default());
    let orchestrator =
        ImportOrchestrator::new(standard_registry(), store.clone()).with_link_assets(false);

    let result = orchestrator.import(&payload("switchgear-report"), &context()).await;

    assert!(result.success);
    assert_eq!(store.inserted_tables().await, vec!["switchgear_reports"]);
}

#[tokio::test]
async fn test_missing_relational_columns_is_validation_error() {
    let store = Arc::new(MockStore::default().with_layout(
        "panelboard_reports",
        json!([
            {"column_name": "id", "data_type": "uuid"},
            {"column_name": "data", "data_type": "jsonb"}
        ]),
    ));
    let orchestrator = ImportOrchestrator::new(standard_registry(), store.clone());

    let result = orchestrator.import(&payload("panelboard-report"), &context()).await;

    assert!(!result.success);
    let error = result.error.unwrap_or_default();
    assert!(error.contains("job_id") && error.contains("user_id"), "{}", error);
    assert!(store.inserted_tables().await.is_empty());
}

#[tokio::test]
async fn test_insert_failure_and_unknown_type() {
    let store = Arc::new(MockStore::default().failing("panelboard_reports"));
    let orchestrator = ImportOrchestrator::new(standard_registry(), store.clone());

    let result = orchestrator.import(&payload("panelboard-report"), &context()).await;
    assert!(!result.success);
    assert_eq!(result.report_type.as_deref(), Some("panelboard-report"));
    assert!(result.error.unwrap_or_default().contains("Insert into"));

    let result = orchestrator.import(&payload("capacitor-bank"), &context()).await;
    assert!(!result.success);
    assert!(result.error.unwrap_or_default().contains("capacitor-bank"));

    let result = orchestrator.import(&ReportPayload::default(), &context()).await;
    assert!(!result.success);
    assert_eq!(result.report_type, None);
}

#[tokio::test]
async fn test_empty_schema_is_unavailable() {
    let store = Arc::new(MockStore::default().with_layout("switchgear_reports", json!([])));
    let orchestrator = ImportOrchestrator::new(standard_registry(), store);

    let result = orchestrator.import(&payload("switchgear-report"), &context()).await;
    assert!(!result.success);
    assert!(result.error.unwrap_or_default().contains("switchgear_reports"));
}

#[tokio::test]
async fn test_batch_preserves_order_and_caches_schema() {
    let store = Arc::new(MockStore::default());
    let orchestrator = Arc::new(
        ImportOrchestrator::new(standard_registry(), store.clone()).with_link_assets(false),
    );

    let payloads = vec![
        payload("switchgear-report"),
        payload("capacitor-bank"),
        payload("switchgear-report"),
        payload("panelboard-report"),
    ];
    let results = orchestrator.import_batch(payloads, &context(), 2).await;

    assert_eq!(results.len(), 4);
    assert!(results[0].success);
    assert!(!results[1].success);
    assert!(results[2].success);
    assert_eq!(results[3].report_type.as_deref(), Some("panelboard"));

    // 同一批次內每張表最多查詢一次（並行時可能重複，但不會超過匯入數）
    let calls = *store.describe_calls.lock().await;
    assert!((2..=3).contains(&calls), "describe called {} times", calls);
}
