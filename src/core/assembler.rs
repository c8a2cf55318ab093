use crate::core::mapping::ColumnRule;
use crate::domain::model::{CanonicalRecord, ImportContext, InsertRow, TargetSchema};
use crate::utils::error::{ImportError, Result};
use serde_json::Value;

/// Generic blob columns, in lookup order.
pub const BLOB_COLUMNS: [&str; 2] = ["data", "report_data"];
pub const JOB_ID_COLUMN: &str = "job_id";
pub const USER_ID_COLUMN: &str = "user_id";

/// 將標準化紀錄依實際欄位配置組成單筆新增資料
pub struct RecordAssembler;

impl RecordAssembler {
    pub fn assemble(
        table: &str,
        record: &CanonicalRecord,
        schema: &TargetSchema,
        columns: &[ColumnRule],
        context: &ImportContext,
    ) -> Result<InsertRow> {
        let mut row = InsertRow::new();

        if let Some(blob) = BLOB_COLUMNS.iter().find(|c| schema.is_json_column(c)) {
            tracing::debug!("'{}' stores the whole record in '{}'", table, blob);
            row.insert(blob.to_string(), record.as_value().clone());
        } else {
            for rule in columns {
                if !schema.is_json_column(&rule.column) {
                    continue;
                }
                row.insert(rule.column.clone(), rule.build(record.as_value()));
            }
            if row.is_empty() {
                return Err(ImportError::SchemaMismatch {
                    table: table.to_string(),
                    message: format!(
                        "no blob column ({}) and none of the report columns {:?}",
                        BLOB_COLUMNS.join(", "),
                        columns.iter().map(|c| c.column.as_str()).collect::<Vec<_>>()
                    ),
                });
            }
            tracing::debug!("'{}' partitioned over {} columns", table, row.len());
        }

        if schema.has_column(JOB_ID_COLUMN) {
            row.insert(JOB_ID_COLUMN.to_string(), Value::String(context.job_id.clone()));
        }
        if schema.has_column(USER_ID_COLUMN) {
            row.insert(USER_ID_COLUMN.to_string(), Value::String(context.user_id.clone()));
        }
        Ok(row)
    }
}
