use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 外部匯出功能產生的報告內容，兩種形狀可同時存在
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    #[serde(default)]
    pub report_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PayloadData>,
}

impl ReportPayload {
    /// `reportType`, falling back to `data.reportType`.
    pub fn effective_report_type(&self) -> &str {
        let primary = self.report_type.trim();
        if !primary.is_empty() {
            return primary;
        }
        self.data
            .as_ref()
            .and_then(|data| data.report_type.as_deref())
            .map(str::trim)
            .unwrap_or("")
    }

    pub fn sections(&self) -> &[Section] {
        self.sections.as_deref().unwrap_or(&[])
    }

    pub fn flat_fields(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref().map(|data| &data.fields)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadData {
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub value: FieldValue,
}

fn default_field_type() -> String {
    "text".to_string()
}

impl Field {
    pub fn is_table(&self) -> bool {
        self.field_type.eq_ignore_ascii_case("table") || matches!(self.value, FieldValue::Table(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(n) => n.as_f64().map(Scalar::Number).unwrap_or(Scalar::Null),
            Value::String(s) => Scalar::Text(s.clone()),
            Value::Null | Value::Array(_) | Value::Object(_) => Scalar::Null,
        }
    }

    /// 空字串與 null 視為「沒有值」
    pub fn is_absent(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Text(s) => s.trim().is_empty(),
            Scalar::Bool(_) | Scalar::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Number(n) => Some(format_number(*n)),
            Scalar::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) if n.is_finite() => Some(*n),
            Scalar::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

/// Table-shaped field value: `rows` plus shared metadata (`testVoltage`, `unit`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableValue {
    pub rows: Vec<Value>,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(Scalar),
    Table(TableValue),
    Struct(Map<String, Value>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Scalar(Scalar::Null)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(rows) => FieldValue::Table(TableValue {
                rows,
                metadata: Map::new(),
            }),
            Value::Object(mut map) => match map.remove("rows") {
                Some(Value::Array(rows)) => FieldValue::Table(TableValue {
                    rows,
                    metadata: map,
                }),
                Some(other) => {
                    map.insert("rows".to_string(), other);
                    FieldValue::Struct(map)
                }
                None => FieldValue::Struct(map),
            },
            other => FieldValue::Scalar(Scalar::from_json(&other)),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Scalar(Scalar::Null) => Value::Null,
            FieldValue::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            FieldValue::Scalar(Scalar::Number(n)) => number_value(n),
            FieldValue::Scalar(Scalar::Text(s)) => Value::String(s),
            FieldValue::Table(table) => {
                let mut map = table.metadata;
                map.insert("rows".to_string(), Value::Array(table.rows));
                Value::Object(map)
            }
            FieldValue::Struct(map) => Value::Object(map),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(FieldValue::from)
    }
}

/// Whole numbers are stored as integers so `68` stays `68` in the written JSON.
pub fn number_value(n: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0))
    }
}

pub fn format_number(n: f64) -> String {
    match number_value(n) {
        Value::Number(num) => num.to_string(),
        other => other.to_string(),
    }
}

/// 目標資料表的實體欄位配置，每次匯入時動態取得
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSchema {
    pub columns: Vec<String>,
    pub jsonb_columns: Vec<String>,
}

impl TargetSchema {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn is_json_column(&self, column: &str) -> bool {
        self.has_column(column) && self.jsonb_columns.iter().any(|c| c == column)
    }

    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|column| !self.has_column(column))
            .map(|column| column.to_string())
            .collect()
    }
}

/// 萃取後的標準化報告內容
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord(Value);

impl CanonicalRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        crate::utils::json_path::get(&self.0, path)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }
}

/// Column name → value, ready for a single insert.
pub type InsertRow = Map<String, Value>;

/// Opaque identifiers passed through to relational columns and links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportContext {
    pub job_id: String,
    pub user_id: String,
}

impl ImportContext {
    pub fn new(job_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportResult {
    pub fn succeeded(report_id: Option<String>, report_type: impl Into<String>) -> Self {
        Self {
            success: true,
            report_id,
            report_type: Some(report_type.into()),
            error: None,
        }
    }

    pub fn failed(report_type: Option<String>, error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            report_id: None,
            report_type,
            error: Some(error.to_string()),
        }
    }
}

/// 批次中單一來源（檔案或壓縮檔內的項目）的匯入結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub source: String,
    #[serde(flatten)]
    pub result: ImportResult,
}

impl BatchEntry {
    pub fn new(source: impl Into<String>, result: ImportResult) -> Self {
        Self {
            source: source.into(),
            result,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.success).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_shapes() {
        let table: FieldValue = json!({"rows": [{"a": 1}], "unit": "MΩ"}).into();
        match table {
            FieldValue::Table(t) => {
                assert_eq!(t.rows.len(), 1);
                assert_eq!(t.metadata.get("unit"), Some(&json!("MΩ")));
            }
            other => panic!("expected table, got {:?}", other),
        }

        assert!(matches!(FieldValue::from(json!([1, 2])), FieldValue::Table(_)));
        assert!(matches!(FieldValue::from(json!({"make": "GE"})), FieldValue::Struct(_)));
        assert!(matches!(
            FieldValue::from(json!("68")),
            FieldValue::Scalar(Scalar::Text(_))
        ));
    }

    #[test]
    fn test_effective_report_type_falls_back_to_data() {
        let payload: ReportPayload = serde_json::from_value(json!({
            "data": {"fields": {}, "reportType": "panelboard-report"}
        }))
        .unwrap();
        assert_eq!(payload.effective_report_type(), "panelboard-report");
    }

    #[test]
    fn test_number_value_keeps_integers() {
        assert_eq!(number_value(68.0), json!(68));
        assert_eq!(number_value(2.5), json!(2.5));
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn test_import_result_serializes_camel_case() {
        let result = ImportResult::succeeded(Some("r-1".to_string()), "panelboard");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["reportId"], "r-1");
        assert_eq!(value["reportType"], "panelboard");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_batch_report_counts_and_flattens() {
        let report = BatchReport {
            entries: vec![
                BatchEntry::new("a.json", ImportResult::succeeded(Some("1".into()), "panelboard")),
                BatchEntry::new("b.json", ImportResult::failed(None, "no importer")),
            ],
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);

        let value = serde_json::to_value(&report.entries[1]).unwrap();
        assert_eq!(value["source"], "b.json");
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "no importer");
    }
}
