use crate::core::derived;
use crate::core::mapping::{Itemized, ReportSpec, SectionGroup, TableRule, ValueKind};
use crate::domain::model::{
    number_value, CanonicalRecord, Field, FieldValue, ReportPayload, Scalar, Section, TableValue,
};
use crate::utils::json_path;
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const FAHRENHEIT_PATH: &str = "temperature.fahrenheit";
pub const CELSIUS_PATH: &str = "temperature.celsius";
pub const TCF_PATH: &str = "temperature.tcf";
const REFERENCE_CELSIUS: i64 = 20;

/// 依照報告類型的映射規格，將兩種來源形狀轉為同一份標準化紀錄
///
/// Extraction never fails: malformed input degrades to the spec's defaults. It is a pure
/// function of `(spec, payload)`.
pub struct FieldExtractor<'a> {
    spec: &'a ReportSpec,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(spec: &'a ReportSpec) -> Self {
        Self { spec }
    }

    pub fn extract(&self, payload: &ReportPayload) -> CanonicalRecord {
        let mut draft = Draft::new(self.spec);

        // 1. sections 優先
        draft.apply_sections(payload.sections());
        draft.lock_temperature();

        // 2. flat fields 只補尚未填入的值
        if let Some(fields) = payload.flat_fields() {
            draft.apply_flat(fields);
        }

        // 3. 衍生值每次重新計算
        draft.derive();

        tracing::trace!(
            "Extracted {} values for '{}'",
            draft.populated.len(),
            payload.effective_report_type()
        );
        CanonicalRecord::new(draft.record)
    }
}

struct Draft<'a> {
    spec: &'a ReportSpec,
    shape: Value,
    record: Value,
    populated: HashSet<String>,
    temperature_locked: bool,
}

impl<'a> Draft<'a> {
    fn new(spec: &'a ReportSpec) -> Self {
        let shape = spec.skeleton();
        Self {
            spec,
            record: shape.clone(),
            shape,
            populated: HashSet::new(),
            temperature_locked: false,
        }
    }

    /// Fahrenheit and Celsius are one reading: once sections supply either, flat fields supply neither.
    fn lock_temperature(&mut self) {
        self.temperature_locked =
            self.populated.contains(FAHRENHEIT_PATH) || self.populated.contains(CELSIUS_PATH);
    }

    /// Writes a leaf unless an earlier pass already populated it.
    fn offer(&mut self, path: &str, value: Value) -> bool {
        if self.populated.contains(path) {
            return false;
        }
        if self.temperature_locked && (path == FAHRENHEIT_PATH || path == CELSIUS_PATH) {
            return false;
        }
        if json_path::set(&mut self.record, path, value) {
            self.populated.insert(path.to_string());
            true
        } else {
            false
        }
    }

    fn apply_sections(&mut self, sections: &[Section]) {
        let spec = self.spec;
        for section in sections {
            let group = spec.group_for(&section.title);
            if group.is_none() {
                tracing::trace!("No group for section '{}', reading tables only", section.title);
            }
            for field in &section.fields {
                self.apply_section_field(group, field);
            }
        }
    }

    fn apply_section_field(&mut self, group: Option<&SectionGroup>, field: &Field) {
        let spec = self.spec;
        match &field.value {
            FieldValue::Table(table) => {
                if let Some(rule) = spec.table_for_label(&field.label) {
                    self.apply_table(rule, table);
                }
            }
            FieldValue::Struct(map) => {
                if let Some(rule) = group.and_then(|g| g.rule_for(&field.label, true)) {
                    self.apply_value(&rule.path, rule.kind, &Value::Object(map.clone()));
                } else if let Some(rule) = spec.table_for_label(&field.label) {
                    self.apply_itemized_map(rule, map);
                }
            }
            FieldValue::Scalar(scalar) => {
                let Some(group) = group else {
                    return;
                };
                if field.is_table() {
                    return;
                }
                if let Some(rule) = group.rule_for(&field.label, false) {
                    self.apply_scalar(&rule.path, rule.kind, scalar);
                } else {
                    self.apply_itemized(&group.name, &field.label, scalar);
                }
            }
        }
    }

    fn apply_flat(&mut self, fields: &Map<String, Value>) {
        let spec = self.spec;
        for rule in &spec.flat {
            if let Some(value) = fields.get(&rule.key) {
                self.apply_value(&rule.path, rule.kind, value);
            }
        }

        for table in &spec.tables {
            for key in &table.flat_keys {
                let Some(value) = fields.get(key) else {
                    continue;
                };
                match FieldValue::from(value.clone()) {
                    FieldValue::Table(rows) => self.apply_table(table, &rows),
                    FieldValue::Struct(map) => self.apply_itemized_map(table, &map),
                    FieldValue::Scalar(_) => {
                        tracing::trace!("Flat key '{}' is not table-shaped", key);
                    }
                }
            }
        }
    }

    fn apply_value(&mut self, path: &str, kind: ValueKind, value: &Value) {
        match (kind, value) {
            (ValueKind::Struct, Value::Object(map)) => {
                if let Some(shape) = json_path::get(&self.shape, path).cloned() {
                    self.merge_object(&shape, map, path, None);
                }
            }
            (ValueKind::Struct, _) => {}
            (kind, value) => self.apply_scalar(path, kind, &Scalar::from_json(value)),
        }
    }

    fn apply_scalar(&mut self, path: &str, kind: ValueKind, scalar: &Scalar) {
        if let Some(value) = coerce(kind, scalar) {
            self.offer(path, value);
        }
    }

    /// Shape-directed merge: only keys present in `shape` are read, each coerced to the
    /// type of its default.
    fn merge_object(
        &mut self,
        shape: &Value,
        source: &Map<String, Value>,
        base: &str,
        table: Option<&TableRule>,
    ) {
        let Value::Object(shape_map) = shape else {
            return;
        };
        for (key, default) in shape_map {
            let incoming = match table {
                Some(rule) => rule.source_keys_for(key).find_map(|k| source.get(k)),
                None => source.get(key),
            };
            let Some(incoming) = incoming else {
                continue;
            };
            let path = format!("{}.{}", base, key);
            match (default, incoming) {
                (Value::Object(_), Value::Object(inner)) => {
                    self.merge_object(default, inner, &path, None)
                }
                (Value::Object(_), _) => {}
                (Value::Array(_), Value::Array(_)) => {
                    self.offer(&path, incoming.clone());
                }
                (Value::Array(_), _) => {}
                (default, incoming) => {
                    self.apply_scalar(&path, kind_for_default(default), &Scalar::from_json(incoming))
                }
            }
        }
    }

    fn apply_table(&mut self, rule: &TableRule, table: &TableValue) {
        let limit = rule
            .max_rows()
            .map_or(table.rows.len(), |max| max.min(table.rows.len()));
        if table.rows.len() > limit {
            tracing::debug!(
                "Table '{}' holds {} rows, keeping the first {}",
                rule.path,
                table.rows.len(),
                limit
            );
        }
        self.ensure_rows(rule, limit);

        for (index, row) in table.rows.iter().take(limit).enumerate() {
            let Value::Object(source) = row else {
                continue;
            };
            let shape = rule.empty_row(index);
            let path = format!("{}.{}", rule.path, index);
            self.merge_object(&shape, source, &path, Some(rule));
        }

        for meta in &rule.meta {
            if let Some(value) = table.metadata.get(&meta.key) {
                self.apply_value(&meta.path, meta.kind, value);
            }
        }
    }

    fn ensure_rows(&mut self, rule: &TableRule, count: usize) {
        if let Some(Value::Array(rows)) = json_path::get_mut(&mut self.record, &rule.path) {
            while rows.len() < count {
                rows.push(rule.empty_row(rows.len()));
            }
        }
    }

    fn apply_itemized(&mut self, group: &str, label: &str, scalar: &Scalar) {
        let spec = self.spec;
        for table in &spec.tables {
            let Some(item) = table.itemized.as_ref().filter(|item| item.group == group) else {
                continue;
            };
            if let Some(index) = self.item_index(table, item, label) {
                let path = format!("{}.{}.{}", table.path, index, item.cell);
                self.apply_scalar(&path, ValueKind::Text, scalar);
                return;
            }
        }
    }

    fn apply_itemized_map(&mut self, table: &TableRule, map: &Map<String, Value>) {
        let Some(item) = table.itemized.as_ref() else {
            return;
        };
        for (label, value) in map {
            let Some(index) = self.item_index(table, item, label) else {
                continue;
            };
            let path = format!("{}.{}", table.path, index);
            match value {
                Value::Object(source) => {
                    let shape = table.empty_row(index);
                    self.merge_object(&shape, source, &path, Some(table));
                }
                other => {
                    let cell = format!("{}.{}", path, item.cell);
                    self.apply_scalar(&cell, ValueKind::Text, &Scalar::from_json(other));
                }
            }
        }
    }

    /// Row whose item key appears in the label as a whole token; the longest key wins.
    fn item_index(&self, table: &TableRule, item: &Itemized, label: &str) -> Option<usize> {
        let label = label.to_lowercase();
        let rows = json_path::get(&self.record, &table.path)?.as_array()?;
        rows.iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let key = row.get(&item.key)?.as_str()?.to_lowercase();
                contains_token(&label, &key).then_some((index, key.len()))
            })
            .max_by_key(|&(index, len)| (len, std::cmp::Reverse(index)))
            .map(|(index, _)| index)
    }

    fn derive(&mut self) {
        let celsius = self.derive_temperature();
        let spec = self.spec;

        for rule in &spec.corrections {
            let Some(Value::Array(rows)) = json_path::get(&self.record, &rule.source) else {
                continue;
            };
            let corrected: Vec<Value> = rows
                .iter()
                .map(|row| corrected_row(row, &rule.cells, celsius))
                .collect();
            json_path::set(&mut self.record, &rule.target, Value::Array(corrected));
        }

        for rule in &spec.ratios {
            let Some(Value::Array(rows)) = json_path::get_mut(&mut self.record, &rule.table) else {
                continue;
            };
            for row in rows.iter_mut() {
                let Value::Object(cells) = row else {
                    continue;
                };
                let text = |key: &str| cells.get(key).and_then(Value::as_str).unwrap_or("").to_string();
                let ratio = derived::ratio_cell(&text(&rule.numerator), &text(&rule.denominator));
                cells.insert(rule.target.clone(), Value::String(ratio));
            }
        }
    }

    /// Recomputes Celsius and TCF from the populated reading; Fahrenheit wins when both exist.
    fn derive_temperature(&mut self) -> i64 {
        let read = |record: &Value, path: &str| json_path::get(record, path).and_then(Value::as_f64);

        let (celsius, fahrenheit) = if self.populated.contains(FAHRENHEIT_PATH) {
            (read(&self.record, FAHRENHEIT_PATH).map(derived::celsius), None)
        } else if self.populated.contains(CELSIUS_PATH) {
            let celsius = read(&self.record, CELSIUS_PATH).map(derived::round_half_up);
            (celsius, celsius.map(derived::fahrenheit))
        } else {
            (read(&self.record, FAHRENHEIT_PATH).map(derived::celsius), None)
        };
        let celsius = celsius.unwrap_or(REFERENCE_CELSIUS);

        if json_path::get(&self.record, "temperature").is_none() {
            return celsius;
        }
        if let Some(fahrenheit) = fahrenheit {
            json_path::set(&mut self.record, FAHRENHEIT_PATH, Value::from(fahrenheit));
        }
        json_path::set(&mut self.record, CELSIUS_PATH, Value::from(celsius));
        json_path::set(&mut self.record, TCF_PATH, Value::from(derived::tcf(celsius)));
        celsius
    }
}

/// `needle` occurs in `haystack` and is not followed by another alphanumeric character.
fn contains_token(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        haystack[start + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

fn corrected_row(row: &Value, cells: &[String], celsius: i64) -> Value {
    let mut corrected = row.clone();
    if let Value::Object(map) = &mut corrected {
        for cell in cells {
            if let Some(Value::String(raw)) = map.get(cell) {
                let value = derived::corrected_cell(raw, celsius);
                map.insert(cell.clone(), Value::String(value));
            }
        }
    }
    corrected
}

fn kind_for_default(default: &Value) -> ValueKind {
    match default {
        Value::Number(_) => ValueKind::Number,
        Value::Bool(_) => ValueKind::Flag,
        _ => ValueKind::Text,
    }
}

/// Absent (null / blank) scalars never produce a value.
pub fn coerce(kind: ValueKind, scalar: &Scalar) -> Option<Value> {
    if scalar.is_absent() {
        return None;
    }
    match kind {
        ValueKind::Text | ValueKind::Choice => scalar.as_text().map(Value::String),
        ValueKind::Number => Some(number_value(scalar.as_f64().unwrap_or(0.0))),
        ValueKind::Flag => parse_flag(scalar).map(Value::Bool),
        ValueKind::Struct => None,
    }
}

fn parse_flag(scalar: &Scalar) -> Option<bool> {
    match scalar {
        Scalar::Bool(b) => Some(*b),
        Scalar::Number(n) => Some(*n != 0.0),
        Scalar::Text(text) => match text.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "x" | "1" | "on" | "checked" => Some(true),
            "false" | "no" | "n" | "0" | "off" | "unchecked" => Some(false),
            _ => None,
        },
        Scalar::Null => None,
    }
}
