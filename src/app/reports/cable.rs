//! Low-voltage cable insulation tests and medium-voltage VLF cable tests.

use super::common::*;
use crate::core::mapping::{ColumnRule, FlatRule, ReportSpec, TableRule, ValueKind};
use serde_json::json;

const LV_CABLE_ITEMS: &[(&str, &str)] = &[
    ("7.3.2.A.1", "Compare cable data with drawings and specifications."),
    ("7.3.2.A.2", "Inspect exposed sections of cables for physical damage."),
    ("7.3.2.A.3", "Inspect bolted electrical connections for high resistance."),
    ("7.3.2.A.4", "Inspect compression-applied connectors for correct cable match and indentation."),
    ("7.3.2.A.5", "Inspect for correct identification and arrangements."),
    ("7.3.2.A.6", "Inspect cable jacket insulation and condition."),
];

const MV_CABLE_ITEMS: &[(&str, &str)] = &[
    ("7.3.3.A.1", "Compare cable data with drawings and specifications."),
    ("7.3.3.A.2", "Inspect exposed sections of cables for physical damage."),
    ("7.3.3.A.3", "Inspect bolted electrical connections for high resistance."),
    ("7.3.3.A.4", "Inspect compression-applied connectors for correct cable match and indentation."),
    ("7.3.3.A.5", "Inspect shield grounding, cable supports, and terminations."),
    ("7.3.3.A.6", "Verify that visible cable bends meet or exceed ICEA and manufacturer's minimum allowable bending radius."),
    ("7.3.3.A.7", "Inspect fireproofing in common cable areas."),
    ("7.3.3.A.8", "Inspect for correct identification and arrangements."),
];

const MV_CABLE_NAMEPLATE: &[NameplateField] = &[
    ("manufacturer", &["manufacturer", "make"]),
    ("cableType", &["cable type"]),
    ("ratedVoltage", &["rated voltage", "voltage rating"]),
    ("insulationThickness", &["thickness"]),
    ("insulation", &["insulation"]),
    ("conductorSize", &["size"]),
    ("conductorMaterial", &["conductor"]),
    ("length", &["length"]),
    ("from", &["from"]),
    ("to", &["to"]),
];

const LV_CABLE_CELLS: &[&str] = &[
    "from", "to", "size", "config", "length", "ag", "bg", "cg", "ng", "ab", "bc", "ca", "an",
    "bn", "cn", "continuity",
];
const LV_CABLE_READINGS: &[&str] = &["ag", "bg", "cg", "ng", "ab", "bc", "ca", "an", "bn", "cn"];
const PHASE_CELLS: &[&str] = &["a", "b", "c"];
const TAN_DELTA_STEPS: &[&str] = &["0.5 Uo", "1.0 Uo", "1.5 Uo", "2.0 Uo"];

/// Low-voltage cable insulation test over a fixed number of cable sets.
pub fn low_voltage_cable(sets: usize) -> ReportSpec {
    let instruments = [MEGOHMMETER];
    let numbers: Vec<String> = (1..=sets).map(|i| i.to_string()).collect();
    let numbers: Vec<&str> = numbers.iter().map(String::as_str).collect();

    let template = template(
        &[],
        &instruments,
        json!({
            "insulationResistance": insulation_container(),
            "correctedInsulationResistance": {"rows": []}
        }),
    );

    base_spec(template, &[], LV_CABLE_ITEMS, &instruments)
        .group(electrical_group(&["electrical test", "insulation resistance", "cable test"]))
        .flat(electrical_flat())
        .table(
            insulation_table("set", &numbers, LV_CABLE_CELLS)
                .flat_keys(&["cable-table", "cables"])
                .alias("a-g", "ag")
                .alias("b-g", "bg")
                .alias("c-g", "cg")
                .alias("n-g", "ng")
                .alias("a-b", "ab")
                .alias("b-c", "bc")
                .alias("c-a", "ca"),
        )
        .correction(insulation_correction(LV_CABLE_READINGS))
        .columns(standard_columns(&[]))
}

fn withstand_table() -> TableRule {
    TableRule::fixed(
        "withstand.rows",
        &["withstand"],
        PHASE_CELLS.len(),
        row_template("phase", &["testVoltage", "duration", "leakage", "result"]),
    )
    .flat_keys(&["withstand-table", "vlf-table"])
    .seeds(row_seeds("phase", &["A", "B", "C"]))
    .meta("testVoltage", "withstand.testVoltage", ValueKind::Text)
    .meta("duration", "withstand.duration", ValueKind::Text)
}

fn mv_cable_base(instruments: &[Instrument], extra: serde_json::Value) -> ReportSpec {
    let mut containers = json!({
        "insulationResistance": insulation_container(),
        "correctedInsulationResistance": {"rows": []},
        "withstand": {"testVoltage": "", "duration": "", "rows": []}
    });
    if let (Some(base), serde_json::Value::Object(extra)) = (containers.as_object_mut(), extra) {
        base.extend(extra);
    }
    let template = template(MV_CABLE_NAMEPLATE, instruments, containers);

    base_spec(template, MV_CABLE_NAMEPLATE, MV_CABLE_ITEMS, instruments)
        .group(
            electrical_group(&["electrical test", "insulation resistance", "withstand", "tan delta"])
                .field(text(&["withstand voltage", "vlf test voltage"], "withstand.testVoltage"))
                .field(text(&["duration"], "withstand.duration")),
        )
        .flat(electrical_flat())
        .flat([
            FlatRule::new("withstandVoltage", "withstand.testVoltage", ValueKind::Text),
            FlatRule::new("withstandDuration", "withstand.duration", ValueKind::Text),
        ])
        .table(insulation_table("test", &["Pre-Test", "Post-Test"], PHASE_CELLS))
        .table(withstand_table())
        .correction(insulation_correction(PHASE_CELLS))
}

/// Medium-voltage cable VLF withstand with pre/post insulation resistance.
pub fn medium_voltage_cable_vlf() -> ReportSpec {
    mv_cable_base(&[MEGOHMMETER, VLF_TEST_SET], json!({}))
        .columns(standard_columns(&[]))
        .columns([ColumnRule::nested("electrical_tests", &["withstand"])])
}

/// Medium-voltage VLF withstand plus tan delta steps.
pub fn medium_voltage_vlf_tan_delta() -> ReportSpec {
    let tan_delta = TableRule::fixed(
        "tanDelta.rows",
        &["tan delta"],
        TAN_DELTA_STEPS.len(),
        row_template(
            "voltageStep",
            &["kv", "aTd", "aStdDev", "bTd", "bStdDev", "cTd", "cStdDev"],
        ),
    )
    .flat_keys(&["tan-delta-table", "tandelta-table"])
    .seeds(row_seeds("voltageStep", TAN_DELTA_STEPS))
    .meta("systemVoltage", "tanDelta.systemVoltage", ValueKind::Text);

    mv_cable_base(
        &[MEGOHMMETER, VLF_TEST_SET],
        json!({"tanDelta": {"systemVoltage": "", "rows": []}}),
    )
    .flat([FlatRule::new("systemVoltage", "tanDelta.systemVoltage", ValueKind::Text)])
    .table(tan_delta)
    .columns(standard_columns(&[]))
    .columns([ColumnRule::nested("electrical_tests", &["withstand", "tanDelta"])])
}
