use crate::core::assembler::{RecordAssembler, JOB_ID_COLUMN, USER_ID_COLUMN};
use crate::core::introspector::SchemaIntrospector;
use crate::core::registry::{Importer, ImporterRegistry};
use crate::domain::model::{ImportContext, ImportResult, InsertRow, ReportPayload};
use crate::domain::ports::ReportStore;
use crate::utils::error::{ImportError, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const REQUIRED_COLUMNS: [&str; 2] = [JOB_ID_COLUMN, USER_ID_COLUMN];
pub const ASSETS_TABLE: &str = "assets";
pub const JOB_ASSETS_TABLE: &str = "job_assets";

/// 單筆匯入流程：分派 → 萃取 → 查詢欄位 → 驗證 → 組裝 → 新增 → 關聯
pub struct ImportOrchestrator {
    registry: ImporterRegistry,
    store: Arc<dyn ReportStore>,
    introspector: SchemaIntrospector,
    link_assets: bool,
}

impl ImportOrchestrator {
    pub fn new(registry: ImporterRegistry, store: Arc<dyn ReportStore>) -> Self {
        Self {
            registry,
            introspector: SchemaIntrospector::with_cache(store.clone()),
            store,
            link_assets: true,
        }
    }

    pub fn with_link_assets(mut self, enabled: bool) -> Self {
        self.link_assets = enabled;
        self
    }

    pub fn registry(&self) -> &ImporterRegistry {
        &self.registry
    }

    /// Terminal failures come back as `success: false`; link warnings are only logged.
    pub async fn import(&self, payload: &ReportPayload, context: &ImportContext) -> ImportResult {
        match self.try_import(payload, context).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("❌ Import of '{}' failed: {}", payload.effective_report_type(), e);
                let report_type = Some(payload.effective_report_type())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string);
                ImportResult::failed(report_type, e)
            }
        }
    }

    async fn try_import(&self, payload: &ReportPayload, context: &ImportContext) -> Result<ImportResult> {
        let importer = self.registry.dispatch(payload)?;
        let table = importer.table();
        tracing::debug!("🔶 '{}' → {} ({})", payload.effective_report_type(), importer.name(), table);

        let record = importer.extract(payload);
        let schema = self.introspector.describe(table).await?;

        let missing = schema.missing_columns(&REQUIRED_COLUMNS);
        if !missing.is_empty() {
            return Err(ImportError::ValidationError {
                table: table.to_string(),
                missing,
            });
        }

        let row = RecordAssembler::assemble(table, &record, &schema, &importer.spec().columns, context)?;
        let stored = self
            .store
            .insert(table, &row)
            .await
            .map_err(|e| match e {
                ImportError::InsertError { .. } => e,
                other => ImportError::InsertError {
                    table: table.to_string(),
                    message: other.to_string(),
                },
            })?;

        let report_id = inserted_id(&stored);
        match &report_id {
            Some(id) => {
                tracing::info!("✅ Imported {} report {}", importer.name(), id);
                if self.link_assets {
                    if let Err(warning) = self.link(importer, id, context).await {
                        tracing::warn!("⚠️ {}", warning);
                    }
                }
            }
            None => {
                tracing::warn!(
                    "⚠️ Insert into '{}' returned no id; skipping asset link",
                    table
                );
            }
        }

        Ok(ImportResult::succeeded(report_id, importer.name()))
    }

    /// Best effort: an asset pointing at the report, then the job link.
    async fn link(&self, importer: &Importer, report_id: &str, context: &ImportContext) -> Result<()> {
        let warning = |step: &str, e: ImportError| ImportError::SecondaryLinkWarning {
            message: format!("{} for report {} failed: {}", step, report_id, e),
        };

        let mut asset = InsertRow::new();
        asset.insert("name".to_string(), Value::String(importer.display_name()));
        asset.insert(
            "file_url".to_string(),
            Value::String(report_url(&context.job_id, importer.name(), report_id)),
        );
        asset.insert("user_id".to_string(), Value::String(context.user_id.clone()));

        let stored = self
            .store
            .insert(ASSETS_TABLE, &asset)
            .await
            .map_err(|e| warning("asset insert", e))?;
        let asset_id = inserted_id(&stored).ok_or_else(|| ImportError::SecondaryLinkWarning {
            message: format!("asset insert for report {} returned no id", report_id),
        })?;

        let mut link = InsertRow::new();
        link.insert("job_id".to_string(), Value::String(context.job_id.clone()));
        link.insert("asset_id".to_string(), Value::String(asset_id));
        link.insert("user_id".to_string(), Value::String(context.user_id.clone()));

        self.store
            .insert(JOB_ASSETS_TABLE, &link)
            .await
            .map_err(|e| warning("job asset link", e))?;

        tracing::debug!("📎 Linked report {} to job {}", report_id, context.job_id);
        Ok(())
    }

    /// Runs imports concurrently and returns results in input order.
    pub async fn import_batch(
        self: &Arc<Self>,
        payloads: Vec<ReportPayload>,
        context: &ImportContext,
        concurrency: usize,
    ) -> Vec<ImportResult> {
        self.introspector.clear_cache().await;

        let total = payloads.len();
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, payload) in payloads.into_iter().enumerate() {
            let orchestrator = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let context = context.clone();
            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => orchestrator.import(&payload, &context).await,
                    Err(e) => ImportResult::failed(None, e),
                };
                (index, result)
            });
        }

        let mut results: Vec<Option<ImportResult>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::error!("❌ Import task failed: {}", e),
            }
        }

        self.introspector.clear_cache().await;

        results
            .into_iter()
            .map(|result| result.unwrap_or_else(|| ImportResult::failed(None, "import task aborted")))
            .collect()
    }
}

/// Reads `id` from a PostgREST representation (a one-element array or an object).
pub fn inserted_id(stored: &Value) -> Option<String> {
    let row = match stored {
        Value::Array(rows) => rows.first()?,
        other => other,
    };
    match row.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

pub fn report_url(job_id: &str, slug: &str, report_id: &str) -> String {
    format!("report:/jobs/{}/{}/{}", job_id, slug, report_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inserted_id_shapes() {
        assert_eq!(inserted_id(&json!([{"id": "abc"}])), Some("abc".to_string()));
        assert_eq!(inserted_id(&json!({"id": 42})), Some("42".to_string()));
        assert_eq!(inserted_id(&json!([])), None);
        assert_eq!(inserted_id(&json!([{"id": ""}])), None);
    }

    #[test]
    fn test_report_url() {
        assert_eq!(
            report_url("job-1", "panelboard", "r-9"),
            "report:/jobs/job-1/panelboard/r-9"
        );
    }
}
