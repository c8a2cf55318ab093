//! Building blocks shared by every report family: job information, temperature, nameplate,
//! visual inspection items, insulation and contact resistance tables, test equipment and
//! comments, plus the standard named-column partition.

use crate::core::extractor::{CELSIUS_PATH, FAHRENHEIT_PATH};
use crate::core::mapping::{
    ColumnRule, CorrectionRule, FieldRule, FlatRule, ReportSpec, SectionGroup, TableRule, ValueKind,
};
use serde_json::{json, Map, Value};

pub const SELECT_ONE: &str = "Select One";
pub const DEFAULT_STATUS: &str = "PASS";
pub const DEFAULT_IR_UNIT: &str = "MΩ";
pub const DEFAULT_TEST_VOLTAGE: &str = "1000V";
pub const DEFAULT_CONTACT_UNIT: &str = "µΩ";

pub const VISUAL_PATH: &str = "visualInspection.items";
pub const IR_PATH: &str = "insulationResistance.rows";
pub const CORRECTED_IR_PATH: &str = "correctedInsulationResistance.rows";
pub const CONTACT_PATH: &str = "contactResistance.rows";

/// `(key under testEquipment, label substring)`
pub type Instrument = (&'static str, &'static str);

pub const MEGOHMMETER: Instrument = ("megohmmeter", "megohmmeter");
pub const LOW_RESISTANCE_OHMMETER: Instrument = ("lowResistanceOhmmeter", "low resistance");
pub const PRIMARY_INJECTION_SET: Instrument = ("primaryInjectionTestSet", "primary injection");
pub const SECONDARY_INJECTION_SET: Instrument = ("secondaryInjectionTestSet", "secondary injection");
pub const VLF_TEST_SET: Instrument = ("vlfTestSet", "vlf");
pub const HIPOT_TEST_SET: Instrument = ("hipotTestSet", "hipot");
pub const TTR_TEST_SET: Instrument = ("ttrTestSet", "ttr");
pub const OIL_TEST_SET: Instrument = ("oilTestSet", "oil test");
pub const CT_ANALYZER: Instrument = ("ctAnalyzer", "analyzer");

/// `(nameplate key, label substrings)`; earlier entries win on overlapping labels.
pub type NameplateField = (&'static str, &'static [&'static str]);

pub fn text(labels: &[&str], path: &str) -> FieldRule {
    FieldRule::new(labels, path, ValueKind::Text)
}

pub fn number(labels: &[&str], path: &str) -> FieldRule {
    FieldRule::new(labels, path, ValueKind::Number)
}

pub fn choice(labels: &[&str], path: &str) -> FieldRule {
    FieldRule::new(labels, path, ValueKind::Choice)
}

/// Containers every consumer expects, with `extra` merged over them.
pub fn template(nameplate: &[NameplateField], instruments: &[Instrument], extra: Value) -> Value {
    let mut plate = Map::new();
    for (key, _) in nameplate {
        plate.insert(key.to_string(), Value::String(String::new()));
    }

    let mut equipment = Map::new();
    for (key, _) in instruments {
        equipment.insert(
            key.to_string(),
            json!({"name": "", "serialNumber": "", "ampId": ""}),
        );
    }

    let mut template = json!({
        "reportInfo": {
            "customer": "",
            "address": "",
            "userName": "",
            "date": "",
            "jobNumber": "",
            "technicians": "",
            "substation": "",
            "eqptLocation": "",
            "identifier": "",
            "status": DEFAULT_STATUS
        },
        "temperature": {"fahrenheit": 68, "celsius": 20, "tcf": 1.0, "humidity": 0},
        "nameplate": Value::Object(plate),
        "visualInspection": {"items": []},
        "testEquipment": Value::Object(equipment),
        "comments": {"general": ""}
    });

    if let (Value::Object(base), Value::Object(extra)) = (&mut template, extra) {
        base.extend(extra);
    }
    template
}

pub fn insulation_container() -> Value {
    json!({"unit": DEFAULT_IR_UNIT, "testVoltage": DEFAULT_TEST_VOLTAGE, "rows": []})
}

pub fn contact_container() -> Value {
    json!({"unit": DEFAULT_CONTACT_UNIT, "rows": []})
}

/// Job information, nameplate, visual, test equipment and comments, sections and flat keys.
pub fn base_spec(
    template: Value,
    nameplate: &[NameplateField],
    visual_items: &[(&str, &str)],
    instruments: &[Instrument],
) -> ReportSpec {
    ReportSpec::new(template)
        .group(job_info_group())
        .group(nameplate_group(nameplate))
        .group(SectionGroup::new("visual", &["visual", "mechanical inspection"]))
        .group(equipment_group(instruments))
        .group(
            SectionGroup::new("comments", &["comment", "notes", "remarks"])
                .field(text(&["comment", "note", "remark"], "comments.general")),
        )
        .flat(job_info_flat())
        .flat(
            nameplate
                .iter()
                .map(|(key, _)| FlatRule::new(key, &format!("nameplate.{}", key), ValueKind::Text)),
        )
        .flat([FlatRule::new("nameplate", "nameplate", ValueKind::Struct)])
        .flat(equipment_flat(instruments))
        .table(visual_table(visual_items))
}

fn job_info_group() -> SectionGroup {
    SectionGroup::new(
        "job",
        &["job information", "job info", "report information", "general information"],
    )
    .fields([
        text(&["address"], "reportInfo.address"),
        text(&["customer", "client"], "reportInfo.customer"),
        text(&["user", "prepared by"], "reportInfo.userName"),
        text(&["date"], "reportInfo.date"),
        text(&["job number", "job #", "job no"], "reportInfo.jobNumber"),
        text(&["technician"], "reportInfo.technicians"),
        text(&["substation"], "reportInfo.substation"),
        text(&["location"], "reportInfo.eqptLocation"),
        text(&["identifier", "equipment id"], "reportInfo.identifier"),
        number(&["celsius", "°c", "temp c"], CELSIUS_PATH),
        number(&["temp"], FAHRENHEIT_PATH),
        number(&["humidity"], "temperature.humidity"),
        choice(&["status"], "reportInfo.status"),
    ])
}

fn job_info_flat() -> Vec<FlatRule> {
    use ValueKind::{Choice, Number, Text};
    vec![
        FlatRule::new("customer", "reportInfo.customer", Text),
        FlatRule::new("address", "reportInfo.address", Text),
        FlatRule::new("userName", "reportInfo.userName", Text),
        FlatRule::new("user", "reportInfo.userName", Text),
        FlatRule::new("date", "reportInfo.date", Text),
        FlatRule::new("jobNumber", "reportInfo.jobNumber", Text),
        FlatRule::new("technicians", "reportInfo.technicians", Text),
        FlatRule::new("substation", "reportInfo.substation", Text),
        FlatRule::new("eqptLocation", "reportInfo.eqptLocation", Text),
        FlatRule::new("identifier", "reportInfo.identifier", Text),
        FlatRule::new("status", "reportInfo.status", Choice),
        FlatRule::new("temperatureF", FAHRENHEIT_PATH, Number),
        FlatRule::new("temperatureC", CELSIUS_PATH, Number),
        FlatRule::new("humidity", "temperature.humidity", Number),
        FlatRule::new("comments", "comments.general", Text),
    ]
}

fn nameplate_group(fields: &[NameplateField]) -> SectionGroup {
    let group = SectionGroup::new(
        "nameplate",
        &["nameplate", "device data", "equipment data", "breaker data", "cable data"],
    )
    .field(FieldRule::new(&["nameplate"], "nameplate", ValueKind::Struct));

    group.fields(
        fields
            .iter()
            .map(|(key, labels)| text(labels, &format!("nameplate.{}", key))),
    )
}

fn equipment_group(instruments: &[Instrument]) -> SectionGroup {
    let mut group = SectionGroup::new("equipment", &["test equipment", "equipment used"])
        .field(FieldRule::new(&["test equipment"], "testEquipment", ValueKind::Struct));

    for (key, label) in instruments {
        let base = format!("testEquipment.{}", key);
        group = group
            .field(FieldRule::new(&[*label], &base, ValueKind::Struct))
            .field(text(&[format!("{} serial", label).as_str()], &format!("{}.serialNumber", base)))
            .field(text(&[format!("{} amp", label).as_str()], &format!("{}.ampId", base)))
            .field(text(&[*label], &format!("{}.name", base)));
    }
    group
}

fn equipment_flat(instruments: &[Instrument]) -> Vec<FlatRule> {
    let mut rules = vec![FlatRule::new("testEquipment", "testEquipment", ValueKind::Struct)];
    for (key, _) in instruments {
        let base = format!("testEquipment.{}", key);
        rules.push(FlatRule::new(key, &format!("{}.name", base), ValueKind::Text));
        rules.push(FlatRule::new(
            &format!("{}Serial", key),
            &format!("{}.serialNumber", base),
            ValueKind::Text,
        ));
        rules.push(FlatRule::new(
            &format!("{}AmpId", key),
            &format!("{}.ampId", base),
            ValueKind::Text,
        ));
    }
    rules
}

/// Seeded NETA items whose result defaults to "Select One".
pub fn visual_table(items: &[(&str, &str)]) -> TableRule {
    TableRule::fixed(
        VISUAL_PATH,
        &["visual", "mechanical inspection"],
        items.len(),
        json!({"netaSection": "", "description": "", "result": SELECT_ONE, "comments": ""}),
    )
    .flat_keys(&["vm-table", "visual-mechanical"])
    .alias("section", "netaSection")
    .alias("id", "netaSection")
    .seeds(
        items
            .iter()
            .map(|(section, description)| json!({"netaSection": section, "description": description}))
            .collect(),
    )
    .itemized("visual", "netaSection", "result")
}

/// Row template `{label_key: "", cell: "", ...}`.
pub fn row_template(label_key: &str, cells: &[&str]) -> Value {
    let mut row = Map::new();
    row.insert(label_key.to_string(), Value::String(String::new()));
    for cell in cells {
        row.insert(cell.to_string(), Value::String(String::new()));
    }
    Value::Object(row)
}

pub fn row_seeds(label_key: &str, labels: &[&str]) -> Vec<Value> {
    labels
        .iter()
        .map(|label| {
            let mut seed = Map::new();
            seed.insert(label_key.to_string(), Value::String(label.to_string()));
            Value::Object(seed)
        })
        .collect()
}

/// Fixed insulation-resistance matrix with unit and test-voltage metadata.
pub fn insulation_table(label_key: &str, labels: &[&str], cells: &[&str]) -> TableRule {
    TableRule::fixed(
        IR_PATH,
        &["insulation resistance", "insulation"],
        labels.len(),
        row_template(label_key, cells),
    )
    .excluding(&["corrected"])
    .flat_keys(&["ir-table", "insulation-resistance"])
    .seeds(row_seeds(label_key, labels))
    .meta("unit", "insulationResistance.unit", ValueKind::Choice)
    .meta("testVoltage", "insulationResistance.testVoltage", ValueKind::Choice)
}

pub fn insulation_correction(cells: &[&str]) -> CorrectionRule {
    CorrectionRule::new(IR_PATH, CORRECTED_IR_PATH, cells)
}

pub fn contact_table(label_key: &str, labels: &[&str], cells: &[&str]) -> TableRule {
    TableRule::fixed(
        CONTACT_PATH,
        &["contact resistance"],
        labels.len(),
        row_template(label_key, cells),
    )
    .flat_keys(&["contact-table", "contact-resistance"])
    .seeds(row_seeds(label_key, labels))
    .meta("unit", "contactResistance.unit", ValueKind::Choice)
}

/// Field rules for the electrical-test section titles shared by most families.
pub fn electrical_group(titles: &[&str]) -> SectionGroup {
    SectionGroup::new("electrical", titles).fields([
        choice(&["test voltage"], "insulationResistance.testVoltage"),
        choice(&["insulation resistance unit", "ir unit"], "insulationResistance.unit"),
        choice(&["contact resistance unit"], "contactResistance.unit"),
    ])
}

pub fn electrical_flat() -> Vec<FlatRule> {
    vec![
        FlatRule::new("testVoltage", "insulationResistance.testVoltage", ValueKind::Choice),
        FlatRule::new("irUnit", "insulationResistance.unit", ValueKind::Choice),
        FlatRule::new("contactUnit", "contactResistance.unit", ValueKind::Choice),
    ]
}

/// report_info, visual_inspection, insulation_resistance, contact_resistance, test_equipment,
/// comments; `info` adds further record keys to report_info.
pub fn standard_columns(info: &[&str]) -> Vec<ColumnRule> {
    vec![
        ColumnRule::base("report_info", "reportInfo")
            .with(&["temperature", "nameplate"])
            .with(info),
        ColumnRule::base("visual_inspection", "visualInspection"),
        ColumnRule::nested(
            "insulation_resistance",
            &["insulationResistance", "correctedInsulationResistance"],
        ),
        ColumnRule::base("contact_resistance", "contactResistance"),
        ColumnRule::base("test_equipment", "testEquipment"),
        ColumnRule::base("comments", "comments"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_always_has_containers() {
        let value = template(&[("manufacturer", &["manufacturer"])], &[MEGOHMMETER], json!({}));
        for key in ["reportInfo", "temperature", "nameplate", "testEquipment", "comments"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["reportInfo"]["status"], DEFAULT_STATUS);
        assert_eq!(value["testEquipment"]["megohmmeter"]["ampId"], "");
    }

    #[test]
    fn test_row_template_and_seeds() {
        let row = row_template("test", &["a", "b"]);
        assert_eq!(row, json!({"test": "", "a": "", "b": ""}));
        assert_eq!(row_seeds("test", &["Pole to Pole"])[0], json!({"test": "Pole to Pole"}));
    }
}
