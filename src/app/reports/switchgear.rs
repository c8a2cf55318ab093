//! Switchgear, panelboards and metal-enclosed busway: bus insulation, bus contact resistance
//! and dielectric withstand.

use super::common::*;
use crate::core::mapping::{ColumnRule, ReportSpec, TableRule, ValueKind};
use serde_json::json;

const SWITCHGEAR_NAMEPLATE: &[NameplateField] = &[
    ("catalogNumber", &["catalog"]),
    ("serialNumber", &["serial"]),
    ("manufacturer", &["manufacturer", "make"]),
    ("ratedVoltage", &["rated voltage", "voltage rating", "system voltage"]),
    ("ratedCurrent", &["rated current", "amperage", "bus rating"]),
    ("icRating", &["interrupting", "ic rating", "sccr"]),
    ("phaseConfiguration", &["phase", "wire"]),
    ("type", &["type"]),
];

pub const SWITCHGEAR_ITEMS: &[(&str, &str)] = &[
    ("7.1.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.1.A.2", "Inspect physical, electrical, and mechanical condition."),
    ("7.1.A.3", "Inspect anchorage, alignment, grounding, and required area clearances."),
    ("7.1.A.4", "Verify the unit is clean and all shipping bracing, loose parts, and documentation shipped inside cubicles have been removed."),
    ("7.1.A.5", "Verify that fuse and circuit breaker sizes and types correspond to drawings and coordination study."),
    ("7.1.A.6", "Inspect bolted electrical connections for high resistance."),
    ("7.1.A.7", "Inspect insulators for evidence of physical damage or contaminated surfaces."),
    ("7.1.A.8", "Verify correct barrier and shutter installation and operation."),
    ("7.1.A.9", "Exercise all active components."),
];

pub const PANELBOARD_ITEMS: &[(&str, &str)] = &[
    ("7.1.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.1.A.2", "Inspect physical, electrical, and mechanical condition."),
    ("7.1.A.3", "Inspect anchorage, alignment, grounding, and required area clearances."),
    ("7.1.A.4", "Verify the unit is clean."),
    ("7.1.A.5", "Verify that circuit breaker sizes and types correspond to drawings and the panel schedule."),
    ("7.1.A.6", "Inspect bolted electrical connections for high resistance."),
    ("7.1.A.7", "Verify that the directory is complete and legible."),
];

pub const BUSWAY_ITEMS: &[(&str, &str)] = &[
    ("7.4.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.4.A.2", "Inspect physical and mechanical condition."),
    ("7.4.A.3", "Inspect anchorage, alignment, and grounding."),
    ("7.4.A.4", "Verify correct connection in accordance with single-line diagram."),
    ("7.4.A.5", "Inspect bus joints and enclosure for correct installation."),
    ("7.4.A.6", "Verify the unit is clean."),
    ("7.4.A.7", "Inspect bolted electrical connections for high resistance."),
    ("7.4.A.8", "Verify appropriate lubrication on moving current-carrying parts."),
    ("7.4.A.9", "Verify correct installation of weep-hole plugs and joint shields."),
];

const BUS_TESTS: &[&str] = &["A-B", "B-C", "C-A", "A-N", "B-N", "C-N", "A-G", "B-G", "C-G", "N-G"];
const READING: &[&str] = &["reading"];

/// Bus-level tests shared by switchgear, panelboards and busway; only the inspection items differ.
pub fn bus_equipment(items: &[(&str, &str)]) -> ReportSpec {
    let instruments = [MEGOHMMETER, LOW_RESISTANCE_OHMMETER, HIPOT_TEST_SET];
    let template = template(
        SWITCHGEAR_NAMEPLATE,
        &instruments,
        json!({
            "insulationResistance": insulation_container(),
            "correctedInsulationResistance": {"rows": []},
            "contactResistance": contact_container(),
            "dielectricWithstand": {"testVoltage": "", "duration": "", "rows": []}
        }),
    );

    let withstand = TableRule::fixed(
        "dielectricWithstand.rows",
        &["dielectric withstand", "withstand"],
        3,
        row_template("phase", &["reading", "result"]),
    )
    .flat_keys(&["withstand-table"])
    .seeds(row_seeds("phase", &["A", "B", "C"]))
    .meta("testVoltage", "dielectricWithstand.testVoltage", ValueKind::Text)
    .meta("duration", "dielectricWithstand.duration", ValueKind::Text);

    base_spec(template, SWITCHGEAR_NAMEPLATE, items, &instruments)
        .group(
            electrical_group(&[
                "electrical test",
                "insulation resistance",
                "contact resistance",
                "withstand",
            ])
            .field(text(&["withstand voltage"], "dielectricWithstand.testVoltage")),
        )
        .flat(electrical_flat())
        .table(insulation_table("bus", BUS_TESTS, READING).alias("value", "reading"))
        .table(
            contact_table("bus", &["A Phase", "B Phase", "C Phase", "Neutral", "Ground"], READING)
                .alias("value", "reading"),
        )
        .table(withstand)
        .correction(insulation_correction(READING))
        .columns(standard_columns(&[]))
        .columns([ColumnRule::nested("electrical_tests", &["dielectricWithstand"])])
}
