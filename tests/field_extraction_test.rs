use report_import::domain::model::{CanonicalRecord, ReportPayload};
use report_import::standard_registry;
use serde_json::{json, Value};

fn payload(value: Value) -> ReportPayload {
    serde_json::from_value(value).unwrap()
}

fn extract(value: Value) -> (String, CanonicalRecord) {
    let registry = standard_registry();
    let payload = payload(value);
    let importer = registry.dispatch(&payload).unwrap();
    (importer.table().to_string(), importer.extract(&payload))
}

fn number(record: &CanonicalRecord, path: &str) -> f64 {
    record
        .get(path)
        .and_then(Value::as_f64)
        .unwrap_or_else(|| panic!("{} is not a number", path))
}

#[test]
fn test_multi_device_flat_payload() {
    let (table, record) = extract(json!({
        "reportType": "lowVoltageSwitchMultiDeviceTest",
        "data": {"fields": {"temperatureF": "68", "customer": "Acme"}}
    }));

    assert_eq!(table, "low_voltage_switch_multi_device_test");
    assert_eq!(number(&record, "temperature.fahrenheit"), 68.0);
    assert_eq!(number(&record, "temperature.celsius"), 20.0);
    assert_eq!(number(&record, "temperature.tcf"), 1.0);
    assert_eq!(record.get("reportInfo.customer"), Some(&json!("Acme")));

    // 固定列數的表格一律補滿
    assert_eq!(record.get("switches").and_then(Value::as_array).map(Vec::len), Some(5));
    assert_eq!(record.get("switches.4.position"), Some(&json!("5")));
    assert_eq!(record.get("insulationResistance.unit"), Some(&json!("MΩ")));
    assert_eq!(record.get("insulationResistance.testVoltage"), Some(&json!("1000V")));
    assert_eq!(record.get("contactResistance.unit"), Some(&json!("µΩ")));
    assert_eq!(record.get("reportInfo.status"), Some(&json!("PASS")));
    assert_eq!(record.get("visualInspection.items.0.result"), Some(&json!("Select One")));
}

#[test]
fn test_extraction_is_deterministic() {
    let input = json!({
        "reportType": "panelboard-report",
        "sections": [{
            "title": "Job Information",
            "fields": [
                {"label": "Customer", "type": "text", "value": "Acme"},
                {"label": "Temp", "type": "number", "value": 77}
            ]
        }],
        "data": {"fields": {"ir-table": [{"bus": "A-B", "reading": "55"}]}}
    });

    let (_, first) = extract(input.clone());
    let (_, second) = extract(input);
    assert_eq!(first, second);
    assert_eq!(first.to_json_string(), second.to_json_string());
}

#[test]
fn test_sections_take_precedence_over_flat_fields() {
    let (_, record) = extract(json!({
        "reportType": "low-voltage-switch-report",
        "sections": [{
            "title": "Job Information",
            "fields": [
                {"label": "Customer", "type": "text", "value": "From Sections"},
                {"label": "Technicians", "type": "text", "value": ""}
            ]
        }],
        "data": {"fields": {
            "customer": "From Flat",
            "address": "1 Main St",
            "technicians": "JD"
        }}
    }));

    assert_eq!(record.get("reportInfo.customer"), Some(&json!("From Sections")));
    // 空白值不算已填，flat 仍可補上
    assert_eq!(record.get("reportInfo.technicians"), Some(&json!("JD")));
    assert_eq!(record.get("reportInfo.address"), Some(&json!("1 Main St")));
}

#[test]
fn test_section_celsius_is_not_overridden_by_flat_fahrenheit() {
    let (_, record) = extract(json!({
        "reportType": "low-voltage-switch-report",
        "sections": [{
            "title": "Job Information",
            "fields": [{"label": "Temperature °C", "type": "text", "value": "20"}]
        }],
        "data": {"fields": {"temperatureF": "95", "humidity": "40"}}
    }));

    assert_eq!(number(&record, "temperature.celsius"), 20.0);
    assert_eq!(number(&record, "temperature.fahrenheit"), 68.0);
    assert_eq!(number(&record, "temperature.tcf"), 1.0);
    // 其他 temperature 欄位仍由 flat 補上
    assert_eq!(number(&record, "temperature.humidity"), 40.0);

    let (_, panelboard) = extract(json!({
        "reportType": "panelboard-report",
        "sections": [{
            "title": "Job Information",
            "fields": [{"label": "Temperature °C", "type": "text", "value": "20"}]
        }],
        "data": {"fields": {
            "temperatureF": 95,
            "ir-table": {"rows": [{"bus": "A-B", "reading": "100"}]}
        }}
    }));
    assert_eq!(
        panelboard.get("correctedInsulationResistance.rows.0.reading"),
        Some(&json!("100.00"))
    );
}

#[test]
fn test_celsius_only_payload_derives_fahrenheit() {
    let (_, record) = extract(json!({
        "reportType": "switchgear-report",
        "data": {"fields": {"temperatureC": 35}}
    }));

    assert_eq!(number(&record, "temperature.celsius"), 35.0);
    assert_eq!(number(&record, "temperature.fahrenheit"), 95.0);
    assert_eq!(number(&record, "temperature.tcf"), 2.0);
}

#[test]
fn test_itemized_visual_results_from_sections() {
    let (_, record) = extract(json!({
        "reportType": "switchgear-report",
        "sections": [{
            "title": "Visual and Mechanical Inspection",
            "fields": [
                {"label": "7.1.A.6 Inspect bolted connections", "type": "select", "value": "Satisfactory"}
            ]
        }]
    }));

    assert_eq!(record.get("visualInspection.items.5.netaSection"), Some(&json!("7.1.A.6")));
    assert_eq!(record.get("visualInspection.items.5.result"), Some(&json!("Satisfactory")));
    assert_eq!(record.get("visualInspection.items.0.result"), Some(&json!("Select One")));
}

#[test]
fn test_malformed_input_degrades_to_defaults() {
    let (_, record) = extract(json!({
        "reportType": "panelboard-report",
        "sections": [{"title": "Job Information", "fields": [{"label": "Temp", "value": "warm"}]}],
        "data": {"fields": {"ir-table": "not a table", "nameplate": 12}}
    }));

    // 無法解析的數字視為 0 °F
    assert_eq!(number(&record, "temperature.fahrenheit"), 0.0);
    assert_eq!(number(&record, "temperature.celsius"), -18.0);
    assert_eq!(record.get("insulationResistance.rows").and_then(Value::as_array).map(Vec::len), Some(10));
    assert!(record.get("nameplate").map(Value::is_object).unwrap_or(false));
}
