//! Declarative per-report-type mapping specs interpreted by [`crate::core::extractor`].
//!
//! A spec says where every value of a report lives in the canonical record: which section
//! titles form which logical group, which field labels and flat keys fill which dotted path,
//! which tables exist and how long they are, what gets derived, and how the record is split
//! over named JSON columns.

use serde_json::{Map, Value};

/// How a source scalar is coerced before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Trimmed text.
    Text,
    /// Parse-or-zero number; whole numbers are stored as integers.
    Number,
    /// Enumerated text; absent values keep the template's canonical default.
    Choice,
    /// yes/no style boolean.
    Flag,
    /// Object merged leaf by leaf into the template subtree at the path.
    Struct,
}

/// Case-insensitive substring matcher with exclusions.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    includes: Vec<String>,
    excludes: Vec<String>,
}

impl Matcher {
    pub fn new(includes: &[&str]) -> Self {
        Self {
            includes: includes.iter().map(|s| s.to_lowercase()).collect(),
            excludes: Vec::new(),
        }
    }

    pub fn excluding(mut self, excludes: &[&str]) -> Self {
        self.excludes
            .extend(excludes.iter().map(|s| s.to_lowercase()));
        self
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.includes.iter().any(|p| text.contains(p.as_str()))
            && !self.excludes.iter().any(|p| text.contains(p.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub label: Matcher,
    pub path: String,
    pub kind: ValueKind,
}

impl FieldRule {
    pub fn new(labels: &[&str], path: &str, kind: ValueKind) -> Self {
        Self {
            label: Matcher::new(labels),
            path: path.to_string(),
            kind,
        }
    }

    pub fn excluding(mut self, labels: &[&str]) -> Self {
        self.label = self.label.excluding(labels);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FlatRule {
    pub key: String,
    pub path: String,
    pub kind: ValueKind,
}

impl FlatRule {
    pub fn new(key: &str, path: &str, kind: ValueKind) -> Self {
        Self {
            key: key.to_string(),
            path: path.to_string(),
            kind,
        }
    }
}

/// Sections whose title matches form one logical group.
#[derive(Debug, Clone)]
pub struct SectionGroup {
    pub name: String,
    pub title: Matcher,
    pub fields: Vec<FieldRule>,
}

impl SectionGroup {
    pub fn new(name: &str, titles: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            title: Matcher::new(titles),
            fields: Vec::new(),
        }
    }

    pub fn excluding(mut self, titles: &[&str]) -> Self {
        self.title = self.title.excluding(titles);
        self
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    pub fn fields(mut self, rules: impl IntoIterator<Item = FieldRule>) -> Self {
        self.fields.extend(rules);
        self
    }

    /// First rule whose label matches and whose kind fits the value shape; rule order is precedence.
    pub fn rule_for(&self, label: &str, structured: bool) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| {
            (rule.kind == ValueKind::Struct) == structured && rule.label.matches(label)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCount {
    Fixed(usize),
    Variable { min: usize },
}

/// Scalar fields of a group whose label contains a row's `key` cell fill that row's `cell`.
#[derive(Debug, Clone)]
pub struct Itemized {
    pub group: String,
    pub key: String,
    pub cell: String,
}

#[derive(Debug, Clone)]
pub struct TableRule {
    pub label: Matcher,
    pub flat_keys: Vec<String>,
    pub path: String,
    pub rows: RowCount,
    pub template: Value,
    pub seeds: Vec<Value>,
    pub aliases: Vec<(String, String)>,
    pub meta: Vec<FlatRule>,
    pub itemized: Option<Itemized>,
}

impl TableRule {
    pub fn fixed(path: &str, labels: &[&str], count: usize, template: Value) -> Self {
        Self::with_rows(path, labels, RowCount::Fixed(count), template)
    }

    pub fn variable(path: &str, labels: &[&str], min: usize, template: Value) -> Self {
        Self::with_rows(path, labels, RowCount::Variable { min }, template)
    }

    fn with_rows(path: &str, labels: &[&str], rows: RowCount, template: Value) -> Self {
        Self {
            label: Matcher::new(labels),
            flat_keys: Vec::new(),
            path: path.to_string(),
            rows,
            template,
            seeds: Vec::new(),
            aliases: Vec::new(),
            meta: Vec::new(),
            itemized: None,
        }
    }

    pub fn excluding(mut self, labels: &[&str]) -> Self {
        self.label = self.label.excluding(labels);
        self
    }

    pub fn flat_keys(mut self, keys: &[&str]) -> Self {
        self.flat_keys.extend(keys.iter().map(|k| k.to_string()));
        self
    }

    /// Per-index values layered over the template (row labels, positions).
    pub fn seeds(mut self, seeds: Vec<Value>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn alias(mut self, source: &str, canonical: &str) -> Self {
        self.aliases
            .push((source.to_string(), canonical.to_string()));
        self
    }

    pub fn meta(mut self, key: &str, path: &str, kind: ValueKind) -> Self {
        self.meta.push(FlatRule::new(key, path, kind));
        self
    }

    pub fn itemized(mut self, group: &str, key: &str, cell: &str) -> Self {
        self.itemized = Some(Itemized {
            group: group.to_string(),
            key: key.to_string(),
            cell: cell.to_string(),
        });
        self
    }

    /// Row factory: a fresh value on every call, never a shared default.
    pub fn empty_row(&self, index: usize) -> Value {
        let mut row = self.template.clone();
        if let (Value::Object(target), Some(Value::Object(seed))) = (&mut row, self.seeds.get(index)) {
            for (key, value) in seed {
                target.insert(key.clone(), value.clone());
            }
        }
        row
    }

    pub fn initial_rows(&self) -> usize {
        match self.rows {
            RowCount::Fixed(count) => count,
            RowCount::Variable { min } => min,
        }
    }

    pub fn max_rows(&self) -> Option<usize> {
        match self.rows {
            RowCount::Fixed(count) => Some(count),
            RowCount::Variable { .. } => None,
        }
    }

    pub fn source_keys_for<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        std::iter::once(canonical).chain(
            self.aliases
                .iter()
                .filter(move |(_, target)| target == canonical)
                .map(|(source, _)| source.as_str()),
        )
    }
}

/// Raw table → temperature-corrected table over the listed cells.
#[derive(Debug, Clone)]
pub struct CorrectionRule {
    pub source: String,
    pub target: String,
    pub cells: Vec<String>,
}

impl CorrectionRule {
    pub fn new(source: &str, target: &str, cells: &[&str]) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            cells: cells.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Per-row `target = numerator / denominator` on a (usually corrected) table.
#[derive(Debug, Clone)]
pub struct RatioRule {
    pub table: String,
    pub numerator: String,
    pub denominator: String,
    pub target: String,
}

impl RatioRule {
    pub fn new(table: &str, numerator: &str, denominator: &str, target: &str) -> Self {
        Self {
            table: table.to_string(),
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
            target: target.to_string(),
        }
    }
}

/// One named JSON column: the `base` sub-object with `nested` sub-objects added under their own keys.
#[derive(Debug, Clone)]
pub struct ColumnRule {
    pub column: String,
    pub base: Option<String>,
    pub nested: Vec<String>,
}

impl ColumnRule {
    pub fn base(column: &str, base: &str) -> Self {
        Self {
            column: column.to_string(),
            base: Some(base.to_string()),
            nested: Vec::new(),
        }
    }

    pub fn nested(column: &str, keys: &[&str]) -> Self {
        Self {
            column: column.to_string(),
            base: None,
            nested: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn with(mut self, keys: &[&str]) -> Self {
        self.nested.extend(keys.iter().map(|k| k.to_string()));
        self
    }

    pub fn build(&self, record: &Value) -> Value {
        let mut value = match self.base.as_deref().and_then(|key| record.get(key)) {
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                if self.nested.is_empty() {
                    return other.clone();
                }
                let mut map = Map::new();
                if let Some(key) = &self.base {
                    map.insert(key.clone(), other.clone());
                }
                map
            }
            None => Map::new(),
        };
        for key in &self.nested {
            if let Some(sub) = record.get(key) {
                value.insert(key.clone(), sub.clone());
            }
        }
        Value::Object(value)
    }
}

#[derive(Debug, Clone)]
pub struct ReportSpec {
    pub template: Value,
    pub groups: Vec<SectionGroup>,
    pub flat: Vec<FlatRule>,
    pub tables: Vec<TableRule>,
    pub corrections: Vec<CorrectionRule>,
    pub ratios: Vec<RatioRule>,
    pub columns: Vec<ColumnRule>,
}

impl ReportSpec {
    pub fn new(template: Value) -> Self {
        Self {
            template,
            groups: Vec::new(),
            flat: Vec::new(),
            tables: Vec::new(),
            corrections: Vec::new(),
            ratios: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn group(mut self, group: SectionGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn flat(mut self, rules: impl IntoIterator<Item = FlatRule>) -> Self {
        self.flat.extend(rules);
        self
    }

    pub fn table(mut self, rule: TableRule) -> Self {
        self.tables.push(rule);
        self
    }

    pub fn correction(mut self, rule: CorrectionRule) -> Self {
        self.corrections.push(rule);
        self
    }

    pub fn ratio(mut self, rule: RatioRule) -> Self {
        self.ratios.push(rule);
        self
    }

    pub fn columns(mut self, rules: impl IntoIterator<Item = ColumnRule>) -> Self {
        self.columns.extend(rules);
        self
    }

    /// Template with every table present at its initial length.
    pub fn skeleton(&self) -> Value {
        let mut skeleton = self.template.clone();
        for table in &self.tables {
            let rows = (0..table.initial_rows()).map(|i| table.empty_row(i)).collect();
            crate::utils::json_path::set(&mut skeleton, &table.path, Value::Array(rows));
        }
        for correction in &self.corrections {
            if crate::utils::json_path::get(&skeleton, &correction.target).is_none() {
                crate::utils::json_path::set(&mut skeleton, &correction.target, Value::Array(Vec::new()));
            }
        }
        skeleton
    }

    pub fn group_for(&self, title: &str) -> Option<&SectionGroup> {
        self.groups.iter().find(|group| group.title.matches(title))
    }

    pub fn table_for_label(&self, label: &str) -> Option<&TableRule> {
        self.tables.iter().find(|table| table.label.matches(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matcher_respects_exclusions() {
        let matcher = Matcher::new(&["insulation resistance"]).excluding(&["corrected"]);
        assert!(matcher.matches("Insulation Resistance Values"));
        assert!(!matcher.matches("Temperature Corrected Insulation Resistance"));
    }

    #[test]
    fn test_empty_row_is_a_fresh_value_per_slot() {
        let table = TableRule::fixed("ir.rows", &["insulation"], 3, json!({"condition": "", "p1": ""}))
            .seeds(vec![json!({"condition": "Pole to Pole"}), json!({"condition": "Pole to Frame"})]);

        let mut first = table.empty_row(0);
        first["p1"] = json!("99");
        let again = table.empty_row(0);

        assert_eq!(again["p1"], "");
        assert_eq!(again["condition"], "Pole to Pole");
        assert_eq!(table.empty_row(2)["condition"], "");
    }

    #[test]
    fn test_skeleton_materialises_fixed_tables() {
        let spec = ReportSpec::new(json!({"ir": {"unit": "MΩ"}}))
            .table(TableRule::fixed("ir.rows", &["ir"], 4, json!({"p1": ""})))
            .table(TableRule::variable("breakers", &["breaker"], 0, json!({"circuit": ""})))
            .correction(CorrectionRule::new("ir.rows", "irCorrected.rows", &["p1"]));

        let skeleton = spec.skeleton();
        assert_eq!(skeleton["ir"]["rows"].as_array().map(Vec::len), Some(4));
        assert_eq!(skeleton["ir"]["unit"], "MΩ");
        assert_eq!(skeleton["breakers"], json!([]));
        assert_eq!(skeleton["irCorrected"]["rows"], json!([]));
    }

    #[test]
    fn test_column_rule_build() {
        let record = json!({
            "reportInfo": {"customer": "Acme"},
            "temperature": {"celsius": 20},
            "comments": {"general": ""}
        });
        let info = ColumnRule::base("report_info", "reportInfo").with(&["temperature"]);
        assert_eq!(
            info.build(&record),
            json!({"customer": "Acme", "temperature": {"celsius": 20}})
        );
        let nested = ColumnRule::nested("extra", &["comments", "missing"]);
        assert_eq!(nested.build(&record), json!({"comments": {"general": ""}}));
    }
}
