//! Report families and the ordered importer table.
//!
//! Order matters: an entry must come before every broader entry that would also match its
//! report type (ATS secondary injection before ATS, ATS before plain electronic trip, MTS
//! variants before their default).

pub mod breaker;
pub mod cable;
pub mod common;
pub mod switch;
pub mod switchgear;
pub mod transformer;

use crate::core::registry::{Importer, ImporterRegistry, TypePredicate};
use breaker::Injection;
use std::sync::Arc;

const ELECTRONIC_TRIP: &str = "lowvoltagecircuitbreakerelectronictrip";
const THERMAL_MAGNETIC: &str = "lowvoltagecircuitbreakerthermalmagnetic";

/// 標準匯入器註冊表（32 種報告類型）
pub fn standard_registry() -> ImporterRegistry {
    let lv_switch = Arc::new(switch::low_voltage_switch());
    let secondary_injection = Arc::new(breaker::electronic_trip(Injection::Secondary));
    let primary_injection = Arc::new(breaker::electronic_trip(Injection::Primary));
    let thermal_magnetic = Arc::new(breaker::thermal_magnetic());
    let vlf_tan_delta = Arc::new(cable::medium_voltage_vlf_tan_delta());
    let switchgear = Arc::new(switchgear::bus_equipment(switchgear::SWITCHGEAR_ITEMS));
    let large_dry = Arc::new(transformer::dry_type(true));
    let two_small_dry = Arc::new(transformer::two_small_dry_type());
    let current_transformer = Arc::new(transformer::instrument_transformer(false));

    let entry = |name: &str, predicate: TypePredicate, table: &str, spec: &Arc<_>| {
        Importer::new(name, predicate, table, Arc::clone(spec))
    };
    let all = TypePredicate::all;

    ImporterRegistry::new()
        .register(entry(
            "low-voltage-switch-multi-device",
            all(&["lowvoltageswitchmultidevice"]),
            "low_voltage_switch_multi_device_test",
            &Arc::new(switch::low_voltage_switch_multi_device()),
        ))
        .register(entry(
            "low-voltage-switch",
            all(&["lowvoltageswitch"]),
            "low_voltage_switch_reports",
            &lv_switch,
        ))
        .register(entry(
            "medium-voltage-switch-oil",
            all(&["mediumvoltageswitchoil"]),
            "medium_voltage_switch_oil_reports",
            &Arc::new(switch::medium_voltage_switch_oil()),
        ))
        .register(entry(
            "low-voltage-circuit-breaker-electronic-trip-ats-secondary-injection",
            all(&[ELECTRONIC_TRIP, "ats", "secondary"]),
            "low_voltage_circuit_breaker_electronic_trip_ats_secondary_injection_reports",
            &secondary_injection,
        ))
        .register(entry(
            "low-voltage-circuit-breaker-electronic-trip-ats-primary-injection",
            all(&[ELECTRONIC_TRIP, "ats", "primary"]),
            "low_voltage_circuit_breaker_electronic_trip_ats_primary_injection_reports",
            &primary_injection,
        ))
        .register(entry(
            "low-voltage-circuit-breaker-electronic-trip-mts",
            all(&[ELECTRONIC_TRIP, "mts"]),
            "low_voltage_circuit_breaker_electronic_trip_mts_reports",
            &primary_injection,
        ))
        .register(entry(
            "low-voltage-circuit-breaker-electronic-trip-ats",
            all(&[ELECTRONIC_TRIP, "ats"]),
            "low_voltage_circuit_breaker_electronic_trip_ats_reports",
            &primary_injection,
        ))
        .register(entry(
            "low-voltage-circuit-breaker-electronic-trip",
            all(&[ELECTRONIC_TRIP]),
            "low_voltage_circuit_breaker_electronic_trip_reports",
            &primary_injection,
        ))
        .register(entry(
            "low-voltage-circuit-breaker-thermal-magnetic-mts",
            all(&[THERMAL_MAGNETIC, "mts"]),
            "low_voltage_circuit_breaker_thermal_magnetic_mts_reports",
            &thermal_magnetic,
        ))
        .register(entry(
            "low-voltage-circuit-breaker-thermal-magnetic-ats",
            all(&[THERMAL_MAGNETIC]),
            "low_voltage_circuit_breaker_thermal_magnetic_ats_reports",
            &thermal_magnetic,
        ))
        .register(entry(
            "low-voltage-panelboard-small-breaker",
            all(&["lowvoltagepanelboardsmallbreaker"]),
            "low_voltage_panelboard_small_breaker_reports",
            &Arc::new(breaker::panelboard_small_breaker()),
        ))
        .register(entry(
            "medium-voltage-circuit-breaker",
            all(&["mediumvoltagecircuitbreaker"]),
            "medium_voltage_circuit_breaker_reports",
            &Arc::new(breaker::medium_voltage_breaker()),
        ))
        .register(entry(
            "low-voltage-cable-test-12sets",
            all(&["lowvoltagecabletest", "12sets"]),
            "low_voltage_cable_test_12sets",
            &Arc::new(cable::low_voltage_cable(12)),
        ))
        .register(entry(
            "low-voltage-cable-test-3sets",
            all(&["lowvoltagecabletest"]),
            "low_voltage_cable_test_3sets",
            &Arc::new(cable::low_voltage_cable(3)),
        ))
        .register(entry(
            "medium-voltage-cable-vlf-test",
            all(&["mediumvoltagecablevlftest"]),
            "medium_voltage_cable_vlf_test",
            &Arc::new(cable::medium_voltage_cable_vlf()),
        ))
        .register(entry(
            "medium-voltage-vlf-mts",
            all(&["mediumvoltagevlf", "mts"]),
            "medium_voltage_vlf_mts_reports",
            &vlf_tan_delta,
        ))
        .register(entry(
            "medium-voltage-vlf",
            all(&["mediumvoltagevlf"]),
            "medium_voltage_vlf_reports",
            &vlf_tan_delta,
        ))
        .register(entry(
            "switchgear-panelboard-mts",
            all(&["switchgear", "mts"]),
            "switchgear_panelboard_mts_reports",
            &switchgear,
        ))
        .register(entry(
            "switchgear",
            all(&["switchgear"]),
            "switchgear_reports",
            &switchgear,
        ))
        .register(entry(
            "panelboard",
            all(&["panelboard"]),
            "panelboard_reports",
            &Arc::new(switchgear::bus_equipment(switchgear::PANELBOARD_ITEMS)),
        ))
        .register(entry(
            "metal-enclosed-busway",
            all(&["metalenclosedbusway"]),
            "metal_enclosed_busway_reports",
            &Arc::new(switchgear::bus_equipment(switchgear::BUSWAY_ITEMS)),
        ))
        .register(entry(
            "automatic-transfer-switch",
            all(&["automatictransferswitch"]),
            "automatic_transfer_switch_ats_reports",
            &Arc::new(switch::automatic_transfer_switch()),
        ))
        .register(entry(
            "large-dry-type-transformer-mts",
            all(&["largedrytypetransformer", "mts"]),
            "large_dry_type_transformer_mts_reports",
            &large_dry,
        ))
        .register(entry(
            "large-dry-type-transformer",
            all(&["largedrytypetransformer"]),
            "large_dry_type_transformer_reports",
            &large_dry,
        ))
        .register(entry(
            "two-small-dry-type-xfmr-mts",
            all(&["twosmalldrytype", "mts"]),
            "two_small_dry_type_xfmr_mts_reports",
            &two_small_dry,
        ))
        .register(entry(
            "two-small-dry-type-xfmr-ats",
            all(&["twosmalldrytype"]),
            "two_small_dry_type_xfmr_ats_reports",
            &two_small_dry,
        ))
        .register(entry(
            "dry-type-transformer",
            all(&["drytypetransformer"]),
            "dry_type_transformer_reports",
            &Arc::new(transformer::dry_type(false)),
        ))
        .register(entry(
            "liquid-filled-transformer",
            all(&["liquidfilledtransformer"]),
            "liquid_filled_transformer_reports",
            &Arc::new(transformer::liquid_filled()),
        ))
        .register(entry(
            "oil-inspection",
            all(&["oilinspection"]),
            "oil_inspection_reports",
            &Arc::new(transformer::oil_inspection()),
        ))
        .register(entry(
            "current-transformer-test-mts",
            all(&["currenttransformer", "mts"]),
            "current_transformer_test_mts_reports",
            &current_transformer,
        ))
        .register(entry(
            "current-transformer-test-ats",
            all(&["currenttransformer"]),
            "current_transformer_test_ats_reports",
            &current_transformer,
        ))
        .register(entry(
            "potential-transformer-ats",
            all(&["potentialtransformer"]),
            "potential_transformer_ats_reports",
            &Arc::new(transformer::instrument_transformer(true)),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ReportPayload;

    fn table_for(report_type: &str) -> String {
        let payload = ReportPayload {
            report_type: report_type.to_string(),
            ..Default::default()
        };
        standard_registry()
            .dispatch(&payload)
            .map(|importer| importer.table().to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_registry_size_and_unique_tables() {
        let registry = standard_registry();
        assert_eq!(registry.len(), 32);

        let mut tables: Vec<&str> = registry.importers().iter().map(Importer::table).collect();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), 32);
    }

    #[test]
    fn test_every_entry_selects_itself() {
        let registry = standard_registry();
        for importer in registry.importers() {
            let payload = ReportPayload {
                report_type: importer.name().to_string(),
                ..Default::default()
            };
            let selected = registry.dispatch(&payload).unwrap();
            assert_eq!(selected.name(), importer.name(), "shadowed entry");
        }
    }

    #[test]
    fn test_specific_before_general() {
        assert_eq!(
            table_for("lowVoltageSwitchMultiDeviceTest"),
            "low_voltage_switch_multi_device_test"
        );
        assert_eq!(table_for("low-voltage-switch-report"), "low_voltage_switch_reports");
        assert_eq!(
            table_for("low-voltage-panelboard-small-breaker-report"),
            "low_voltage_panelboard_small_breaker_reports"
        );
        assert_eq!(table_for("panelboard-report"), "panelboard_reports");
        assert_eq!(table_for("two-small-dry-type-xfmr-mts-report"), "two_small_dry_type_xfmr_mts_reports");
        assert_eq!(table_for("dry-type-transformer"), "dry_type_transformer_reports");
    }
}
