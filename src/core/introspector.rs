use crate::domain::model::TargetSchema;
use crate::domain::ports::ReportStore;
use crate::utils::error::{ImportError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const JSON_TYPES: [&str; 2] = ["json", "jsonb"];

/// 在匯入當下查詢資料表的實體欄位配置
pub struct SchemaIntrospector {
    store: Arc<dyn ReportStore>,
    cache: Option<RwLock<HashMap<String, TargetSchema>>>,
}

impl SchemaIntrospector {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store, cache: None }
    }

    /// Memoises layouts per table until [`SchemaIntrospector::clear_cache`].
    pub fn with_cache(store: Arc<dyn ReportStore>) -> Self {
        Self {
            store,
            cache: Some(RwLock::new(HashMap::new())),
        }
    }

    pub async fn describe(&self, table: &str) -> Result<TargetSchema> {
        if let Some(cache) = &self.cache {
            if let Some(schema) = cache.read().await.get(table) {
                tracing::trace!("Schema cache hit for '{}'", table);
                return Ok(schema.clone());
            }
        }

        let response = self
            .store
            .table_columns(table)
            .await
            .map_err(|e| ImportError::SchemaUnavailable {
                table: table.to_string(),
                message: e.to_string(),
            })?;
        let schema = parse_columns(table, &response)?;

        tracing::debug!(
            "📋 '{}': {} columns, json columns {:?}",
            table,
            schema.columns.len(),
            schema.jsonb_columns
        );

        if let Some(cache) = &self.cache {
            cache.write().await.insert(table.to_string(), schema.clone());
        }
        Ok(schema)
    }

    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.write().await.clear();
        }
    }
}

/// Parses a `get_table_columns` response: `[{column_name, data_type}]`.
pub fn parse_columns(table: &str, response: &Value) -> Result<TargetSchema> {
    let unavailable = |message: &str| ImportError::SchemaUnavailable {
        table: table.to_string(),
        message: message.to_string(),
    };

    let Value::Array(rows) = response else {
        return Err(unavailable("get_table_columns did not return a list"));
    };
    if rows.is_empty() {
        return Err(unavailable("get_table_columns returned no columns"));
    }

    let mut schema = TargetSchema::default();
    for row in rows {
        let Some(name) = row.get("column_name").and_then(Value::as_str) else {
            continue;
        };
        let data_type = row
            .get("data_type")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_lowercase();

        schema.columns.push(name.to_string());
        if JSON_TYPES.contains(&data_type.as_str()) {
            schema.jsonb_columns.push(name.to_string());
        }
    }

    if schema.columns.is_empty() {
        return Err(unavailable("get_table_columns returned rows without column names"));
    }
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_columns_classifies_json() {
        let schema = parse_columns(
            "switchgear_reports",
            &json!([
                {"column_name": "id", "data_type": "uuid"},
                {"column_name": "job_id", "data_type": "uuid"},
                {"column_name": "report_info", "data_type": "JSONB"},
                {"column_name": "comments", "data_type": "json"},
                {"data_type": "text"}
            ]),
        )
        .unwrap();

        assert_eq!(schema.columns, vec!["id", "job_id", "report_info", "comments"]);
        assert_eq!(schema.jsonb_columns, vec!["report_info", "comments"]);
    }

    #[test]
    fn test_parse_columns_rejects_non_list_and_empty() {
        assert!(matches!(
            parse_columns("t", &json!({"error": "function not found"})),
            Err(ImportError::SchemaUnavailable { .. })
        ));
        assert!(matches!(
            parse_columns("t", &json!([])),
            Err(ImportError::SchemaUnavailable { .. })
        ));
        assert!(parse_columns("t", &json!(null)).is_err());
    }
}
