use report_import::core::registry::{normalize_type, Importer, ImporterRegistry, TypePredicate};
use report_import::core::mapping::ReportSpec;
use report_import::domain::model::ReportPayload;
use report_import::utils::error::ImportError;
use report_import::standard_registry;
use serde_json::json;
use std::sync::Arc;

fn table_for(registry: &ImporterRegistry, report_type: &str) -> Option<String> {
    let payload = ReportPayload {
        report_type: report_type.to_string(),
        ..Default::default()
    };
    registry
        .dispatch(&payload)
        .ok()
        .map(|importer| importer.table().to_string())
}

#[test]
fn test_standard_registry_has_every_report_family() {
    assert_eq!(standard_registry().len(), 32);
}

#[test]
fn test_specific_entries_shadow_general_ones() {
    let registry = standard_registry();
    let cases = [
        (
            "low-voltage-circuit-breaker-electronic-trip-ats-secondary-injection-report",
            "low_voltage_circuit_breaker_electronic_trip_ats_secondary_injection_reports",
        ),
        (
            "low-voltage-circuit-breaker-electronic-trip-ats-primary-injection-report",
            "low_voltage_circuit_breaker_electronic_trip_ats_primary_injection_reports",
        ),
        (
            "low-voltage-circuit-breaker-electronic-trip-ats-report",
            "low_voltage_circuit_breaker_electronic_trip_ats_reports",
        ),
        (
            "low-voltage-circuit-breaker-electronic-trip-mts-report",
            "low_voltage_circuit_breaker_electronic_trip_mts_reports",
        ),
        (
            "low-voltage-circuit-breaker-electronic-trip-report",
            "low_voltage_circuit_breaker_electronic_trip_reports",
        ),
        (
            "low-voltage-circuit-breaker-thermal-magnetic-mts-report",
            "low_voltage_circuit_breaker_thermal_magnetic_mts_reports",
        ),
        ("low-voltage-cable-test-12sets", "low_voltage_cable_test_12sets"),
        ("low-voltage-cable-test-3sets", "low_voltage_cable_test_3sets"),
        ("medium-voltage-vlf-mts-report", "medium_voltage_vlf_mts_reports"),
        ("medium-voltage-cable-vlf-test", "medium_voltage_cable_vlf_test"),
        ("switchgear-panelboard-mts-report", "switchgear_panelboard_mts_reports"),
        ("large-dry-type-transformer-mts-report", "large_dry_type_transformer_mts_reports"),
        ("current-transformer-test-ats-report", "current_transformer_test_ats_reports"),
        ("potential-transformer-ats-report", "potential_transformer_ats_reports"),
        ("oil-inspection-report", "oil_inspection_reports"),
    ];

    for (report_type, table) in cases {
        assert_eq!(
            table_for(&registry, report_type).as_deref(),
            Some(table),
            "{}",
            report_type
        );
    }
}

#[test]
fn test_camel_case_and_kebab_case_are_equivalent() {
    let registry = standard_registry();
    assert_eq!(
        table_for(&registry, "lowVoltageSwitchMultiDeviceTest"),
        table_for(&registry, "low-voltage-switch-multi-device")
    );
    assert_eq!(normalize_type("Low Voltage_Switch-Report"), "lowvoltageswitchreport");
}

#[test]
fn test_data_report_type_fallback() {
    let payload: ReportPayload = serde_json::from_value(json!({
        "data": {"fields": {}, "reportType": "metal-enclosed-busway"}
    }))
    .unwrap();
    let registry = standard_registry();
    let importer = registry.dispatch(&payload).unwrap();
    assert_eq!(importer.table(), "metal_enclosed_busway_reports");
    assert_eq!(importer.display_name(), "Metal Enclosed Busway Report");
}

#[test]
fn test_unknown_and_empty_types_have_no_importer() {
    let registry = standard_registry();

    let unknown = ReportPayload {
        report_type: "capacitor-bank".to_string(),
        ..Default::default()
    };
    match registry.dispatch(&unknown) {
        Err(ImportError::NoMatchingImporter { report_type }) => assert_eq!(report_type, "capacitor-bank"),
        other => panic!("unexpected dispatch result: {:?}", other.map(Importer::name)),
    }

    assert!(registry.dispatch(&ReportPayload::default()).is_err());
}

#[test]
fn test_first_registered_match_wins() {
    let spec = Arc::new(ReportSpec::new(json!({})));
    let registry = ImporterRegistry::new()
        .register(Importer::new(
            "special",
            TypePredicate::all(&["widget", "special"]),
            "special_widgets",
            Arc::clone(&spec),
        ))
        .register(Importer::new(
            "widget",
            TypePredicate::all(&["widget"]).none(&["legacy"]),
            "widgets",
            spec,
        ));

    assert_eq!(table_for(&registry, "special-widget").as_deref(), Some("special_widgets"));
    assert_eq!(table_for(&registry, "widget").as_deref(), Some("widgets"));
    assert_eq!(table_for(&registry, "legacy-widget"), None);
}
