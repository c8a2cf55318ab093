use crate::core::orchestrator::ImportOrchestrator;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{BatchEntry, BatchReport, ImportContext, ImportResult, ReportPayload};
use crate::utils::error::{ImportError, Result};
use serde_json::Value;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use zip::ZipArchive;

pub const SUMMARY_CSV: &str = "import_summary.csv";
pub const RESULTS_JSON: &str = "import_results.json";

/// 單一匯入來源；無法解析的內容保留錯誤訊息，在轉換階段記為失敗
#[derive(Debug, Clone)]
pub struct PayloadEnvelope {
    pub source: String,
    pub payload: std::result::Result<ReportPayload, String>,
}

pub struct BatchImportPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    orchestrator: Arc<ImportOrchestrator>,
}

impl<S: Storage, C: ConfigProvider> BatchImportPipeline<S, C> {
    pub fn new(storage: S, config: C, orchestrator: Arc<ImportOrchestrator>) -> Self {
        Self {
            storage,
            config,
            orchestrator,
        }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }
}

/// Splits one JSON document into payload envelopes: an object is one report, an array is many.
pub fn parse_payloads(source: &str, content: &[u8]) -> Vec<PayloadEnvelope> {
    let document: Value = match serde_json::from_slice(content) {
        Ok(document) => document,
        Err(e) => {
            return vec![PayloadEnvelope {
                source: source.to_string(),
                payload: Err(format!("invalid JSON: {}", e)),
            }]
        }
    };

    let to_payload = |value: Value| -> std::result::Result<ReportPayload, String> {
        match value {
            Value::Object(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
            other => Err(format!("expected a report object, found {}", json_kind(&other))),
        }
    };

    match document {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| PayloadEnvelope {
                source: format!("{}#{}", source, i),
                payload: to_payload(item),
            })
            .collect(),
        other => vec![PayloadEnvelope {
            source: source.to_string(),
            payload: to_payload(other),
        }],
    }
}

/// 讀取壓縮檔內所有 `.json` 項目
pub fn parse_archive(source: &str, content: Vec<u8>) -> Result<Vec<PayloadEnvelope>> {
    let mut archive = ZipArchive::new(Cursor::new(content))?;
    let mut envelopes = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() || !has_extension(entry.name(), "json") {
            continue;
        }

        let entry_source = format!("{}:{}", source, entry.name());
        let mut buffer = Vec::new();
        entry.read_to_end(&mut buffer)?;
        envelopes.extend(parse_payloads(&entry_source, &buffer));
    }

    tracing::debug!("📎 {} payloads found in {}", envelopes.len(), source);
    Ok(envelopes)
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn csv_summary(report: &BatchReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["source", "success", "report_type", "report_id", "error"])?;

    for entry in &report.entries {
        let result = &entry.result;
        writer.write_record([
            entry.source.as_str(),
            if result.success { "true" } else { "false" },
            result.report_type.as_deref().unwrap_or(""),
            result.report_id.as_deref().unwrap_or(""),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ImportError::IoError(e.into_error()))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BatchImportPipeline<S, C> {
    type Input = PayloadEnvelope;
    type Output = BatchReport;

    async fn extract(&self) -> Result<Vec<PayloadEnvelope>> {
        let mut envelopes = Vec::new();

        for input in self.config.input_files() {
            tracing::debug!("📁 Reading {}", input);
            let content = self.storage.read_file(input).await?;

            if has_extension(input, "zip") {
                match parse_archive(input, content) {
                    Ok(found) => envelopes.extend(found),
                    Err(e) => {
                        tracing::warn!("❌ Could not open archive {}: {}", input, e);
                        envelopes.push(PayloadEnvelope {
                            source: input.clone(),
                            payload: Err(e.to_string()),
                        });
                    }
                }
            } else {
                envelopes.extend(parse_payloads(input, &content));
            }
        }

        tracing::info!("📊 Extracted {} payloads from {} inputs", envelopes.len(), self.config.input_files().len());
        Ok(envelopes)
    }

    async fn transform(&self, data: Vec<PayloadEnvelope>) -> Result<BatchReport> {
        let context = ImportContext::new(self.config.job_id(), self.config.user_id());

        let mut sources = Vec::with_capacity(data.len());
        let mut slots: Vec<Option<ImportResult>> = Vec::with_capacity(data.len());
        let mut payloads = Vec::new();

        for envelope in data {
            sources.push(envelope.source.clone());
            match envelope.payload {
                Ok(payload) => {
                    slots.push(None);
                    payloads.push(payload);
                }
                Err(message) => {
                    let error = ImportError::PayloadError {
                        source_name: envelope.source,
                        message,
                    };
                    tracing::warn!("❌ {}", error);
                    slots.push(Some(ImportResult::failed(None, error)));
                }
            }
        }

        let mut imported = self
            .orchestrator
            .import_batch(payloads, &context, self.config.concurrent_imports())
            .await
            .into_iter();

        let entries = sources
            .into_iter()
            .zip(slots)
            .map(|(source, slot)| {
                let result = slot
                    .or_else(|| imported.next())
                    .unwrap_or_else(|| ImportResult::failed(None, "import result missing"));
                BatchEntry::new(source, result)
            })
            .collect();

        let report = BatchReport { entries };
        tracing::info!(
            "✅ Batch complete: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        Ok(report)
    }

    async fn load(&self, result: BatchReport) -> Result<String> {
        let formats = self.config.output_formats();

        if formats.iter().any(|f| f == "csv") {
            let csv_data = csv_summary(&result)?;
            self.storage
                .write_file(&self.output_file(SUMMARY_CSV), &csv_data)
                .await?;
            tracing::debug!("💾 Wrote {}", SUMMARY_CSV);
        }

        if formats.iter().any(|f| f == "json") {
            let json_data = serde_json::to_string_pretty(&result.entries)?;
            self.storage
                .write_file(&self.output_file(RESULTS_JSON), json_data.as_bytes())
                .await?;
            tracing::debug!("💾 Wrote {}", RESULTS_JSON);
        }

        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_payloads_object_and_array() {
        let single = parse_payloads("a.json", br#"{"reportType": "panelboard"}"#);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].source, "a.json");
        assert_eq!(single[0].payload.as_ref().unwrap().report_type, "panelboard");

        let many = parse_payloads(
            "b.json",
            json!([{"reportType": "switchgear"}, 42]).to_string().as_bytes(),
        );
        assert_eq!(many.len(), 2);
        assert_eq!(many[0].source, "b.json#0");
        assert!(many[0].payload.is_ok());
        assert!(many[1].payload.as_ref().unwrap_err().contains("a number"));
    }

    #[test]
    fn test_parse_payloads_invalid_json() {
        let envelopes = parse_payloads("broken.json", b"{not json");
        assert_eq!(envelopes.len(), 1);
        assert!(envelopes[0].payload.as_ref().unwrap_err().starts_with("invalid JSON"));
    }

    #[test]
    fn test_csv_summary_columns() {
        let report = BatchReport {
            entries: vec![BatchEntry::new(
                "a.json",
                ImportResult::succeeded(Some("r-1".to_string()), "panelboard"),
            )],
        };
        let csv_text = String::from_utf8(csv_summary(&report).unwrap()).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(lines.next(), Some("source,success,report_type,report_id,error"));
        assert_eq!(lines.next(), Some("a.json,true,panelboard,r-1,"));
    }
}
