use crate::core::extractor::FieldExtractor;
use crate::core::mapping::ReportSpec;
use crate::domain::model::{CanonicalRecord, ReportPayload};
use crate::utils::error::{ImportError, Result};
use std::sync::Arc;

/// 只保留小寫英數字，讓 camelCase 與 kebab-case 的類型字串可以互相比對
pub fn normalize_type(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Every `all` pattern must occur in the normalised type, no `none` pattern may.
#[derive(Debug, Clone, Default)]
pub struct TypePredicate {
    all: Vec<String>,
    none: Vec<String>,
}

impl TypePredicate {
    pub fn all(patterns: &[&str]) -> Self {
        Self {
            all: patterns.iter().map(|p| normalize_type(p)).collect(),
            none: Vec::new(),
        }
    }

    pub fn none(mut self, patterns: &[&str]) -> Self {
        self.none.extend(patterns.iter().map(|p| normalize_type(p)));
        self
    }

    pub fn matches(&self, report_type: &str) -> bool {
        let normalized = normalize_type(report_type);
        if normalized.is_empty() {
            return false;
        }
        self.all.iter().all(|p| normalized.contains(p.as_str()))
            && !self.none.iter().any(|p| normalized.contains(p.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct Importer {
    name: String,
    predicate: TypePredicate,
    table: String,
    spec: Arc<ReportSpec>,
}

impl Importer {
    pub fn new(name: &str, predicate: TypePredicate, table: &str, spec: Arc<ReportSpec>) -> Self {
        Self {
            name: name.to_string(),
            predicate,
            table: table.to_string(),
            spec,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `low-voltage-switch` → `Low Voltage Switch Report`
    pub fn display_name(&self) -> String {
        let words: Vec<String> = self
            .name
            .split('-')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect();
        format!("{} Report", words.join(" "))
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn spec(&self) -> &ReportSpec {
        &self.spec
    }

    pub fn can_import(&self, payload: &ReportPayload) -> bool {
        self.predicate.matches(payload.effective_report_type())
    }

    pub fn extract(&self, payload: &ReportPayload) -> CanonicalRecord {
        FieldExtractor::new(&self.spec).extract(payload)
    }
}

/// 依註冊順序比對，第一個符合者勝出
#[derive(Debug, Clone, Default)]
pub struct ImporterRegistry {
    importers: Vec<Importer>,
}

impl ImporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, importer: Importer) -> Self {
        self.importers.push(importer);
        self
    }

    pub fn importers(&self) -> &[Importer] {
        &self.importers
    }

    pub fn len(&self) -> usize {
        self.importers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }

    pub fn dispatch(&self, payload: &ReportPayload) -> Result<&Importer> {
        let report_type = payload.effective_report_type();
        let mut matching = self.importers.iter().filter(|i| i.can_import(payload));

        let Some(selected) = matching.next() else {
            return Err(ImportError::NoMatchingImporter {
                report_type: report_type.to_string(),
            });
        };

        let shadowed: Vec<&str> = matching.map(Importer::name).collect();
        if !shadowed.is_empty() {
            tracing::debug!(
                "Report type '{}' also matches {:?}; using '{}'",
                report_type,
                shadowed,
                selected.name()
            );
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(report_type: &str) -> ReportPayload {
        ReportPayload {
            report_type: report_type.to_string(),
            ..Default::default()
        }
    }

    fn registry() -> ImporterRegistry {
        let spec = Arc::new(ReportSpec::new(json!({})));
        ImporterRegistry::new()
            .register(Importer::new(
                "secondary",
                TypePredicate::all(&["electronic-trip", "ats", "secondary"]),
                "secondary_reports",
                spec.clone(),
            ))
            .register(Importer::new(
                "plain",
                TypePredicate::all(&["electronic-trip"]),
                "plain_reports",
                spec,
            ))
    }

    #[test]
    fn test_normalize_type() {
        assert_eq!(
            normalize_type("lowVoltageSwitchMultiDeviceTest"),
            normalize_type("low-voltage-switch-multi-device-test")
        );
        assert_eq!(normalize_type("12-Sets_Cable"), "12setscable");
    }

    #[test]
    fn test_first_registered_match_wins() {
        let registry = registry();
        let selected = registry
            .dispatch(&payload("low-voltage-circuit-breaker-electronic-trip-ats-secondary-injection"))
            .unwrap();
        assert_eq!(selected.table(), "secondary_reports");

        let selected = registry
            .dispatch(&payload("low-voltage-circuit-breaker-electronic-trip"))
            .unwrap();
        assert_eq!(selected.table(), "plain_reports");
    }

    #[test]
    fn test_no_match_and_empty_type() {
        let registry = registry();
        assert!(matches!(
            registry.dispatch(&payload("oil-analysis")),
            Err(ImportError::NoMatchingImporter { .. })
        ));
        assert!(registry.dispatch(&payload("")).is_err());
    }

    #[test]
    fn test_exclusions() {
        let predicate = TypePredicate::all(&["lowvoltageswitch"]).none(&["multi"]);
        assert!(predicate.matches("low-voltage-switch-report"));
        assert!(!predicate.matches("low-voltage-switch-multi-device"));
    }
}
