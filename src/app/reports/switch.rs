//! Low-voltage switches (single and multi-device), medium-voltage oil switches and automatic
//! transfer switches.

use super::common::*;
use crate::core::mapping::{ColumnRule, FlatRule, ReportSpec, SectionGroup, TableRule, ValueKind};
use serde_json::json;

const SWITCH_NAMEPLATE: &[NameplateField] = &[
    ("catalogNumber", &["catalog"]),
    ("serialNumber", &["serial"]),
    ("manufacturer", &["manufacturer", "make"]),
    ("model", &["model"]),
    ("ratedAmperage", &["amperage", "amp rating", "rated current"]),
    ("ratedVoltage", &["rated voltage", "voltage rating"]),
    ("icRating", &["interrupting", "ic rating"]),
    ("type", &["type"]),
];

const LV_SWITCH_ITEMS: &[(&str, &str)] = &[
    ("7.5.1.1.A.1", "Inspect physical, electrical, and mechanical condition."),
    ("7.5.1.1.A.2", "Inspect anchorage, alignment, grounding, and required clearances."),
    ("7.5.1.1.A.3", "Verify the unit is clean."),
    ("7.5.1.1.A.4", "Verify correct blade alignment, blade penetration, travel stops, and mechanical operation."),
    ("7.5.1.1.A.5", "Verify that fuse sizes and types are in accordance with drawings."),
    ("7.5.1.1.A.6", "Verify that each fuse has adequate mechanical support and contact integrity."),
    ("7.5.1.1.A.7", "Inspect bolted electrical connections for high resistance."),
    ("7.5.1.1.A.8", "Verify operation and sequencing of interlocking systems."),
    ("7.5.1.1.A.9", "Verify correct phase barrier installation."),
];

const OIL_SWITCH_ITEMS: &[(&str, &str)] = &[
    ("7.5.3.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.5.3.A.2", "Inspect physical and mechanical condition."),
    ("7.5.3.A.3", "Inspect anchorage, alignment, and grounding."),
    ("7.5.3.A.4", "Verify the unit is clean."),
    ("7.5.3.A.5", "Verify correct blade alignment, blade penetration, travel stops, and mechanical operation."),
    ("7.5.3.A.6", "Inspect bolted electrical connections for high resistance."),
    ("7.5.3.A.7", "Verify insulating liquid level."),
    ("7.5.3.A.8", "Perform mechanical operator tests in accordance with the manufacturer's published data."),
];

const ATS_ITEMS: &[(&str, &str)] = &[
    ("7.22.3.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.22.3.A.2", "Inspect physical and mechanical condition."),
    ("7.22.3.A.3", "Inspect anchorage, alignment, grounding, and required clearances."),
    ("7.22.3.A.4", "Verify the unit is clean."),
    ("7.22.3.A.5", "Verify appropriate lubrication on moving current-carrying parts and on moving and sliding surfaces."),
    ("7.22.3.A.6", "Verify that manual transfer warnings are attached and visible."),
    ("7.22.3.A.7", "Verify tightness of all control connections."),
    ("7.22.3.A.8", "Inspect bolted electrical connections for high resistance."),
    ("7.22.3.A.9", "Perform manual transfer operation."),
];

const POLE_TESTS: &[&str] = &["Pole to Pole", "Pole to Frame", "Line to Load"];
const POLE_CELLS: &[&str] = &["p1", "p2", "p3"];

const MULTI_DEVICE_ROWS: usize = 5;
const MULTI_DEVICE_IR_CELLS: &[&str] = &[
    "p1p2", "p2p3", "p3p1", "p1Ground", "p2Ground", "p3Ground", "p1LineLoad", "p2LineLoad",
    "p3LineLoad",
];

fn fuse_group() -> SectionGroup {
    SectionGroup::new("fuse", &["fuse data", "fuse information"]).fields([
        text(&["catalog"], "fuseData.catalogNumber"),
        text(&["manufacturer", "make"], "fuseData.manufacturer"),
        text(&["class"], "fuseData.class"),
        text(&["amperage", "amp"], "fuseData.amperage"),
        text(&["aic", "interrupting"], "fuseData.aic"),
        text(&["voltage"], "fuseData.voltage"),
    ])
}

fn electrical_titles() -> SectionGroup {
    electrical_group(&["electrical test", "insulation resistance", "contact resistance"])
}

/// Single low-voltage switch with fuse data.
pub fn low_voltage_switch() -> ReportSpec {
    let instruments = [MEGOHMMETER, LOW_RESISTANCE_OHMMETER];
    let template = template(
        SWITCH_NAMEPLATE,
        &instruments,
        json!({
            "fuseData": {
                "manufacturer": "",
                "catalogNumber": "",
                "class": "",
                "amperage": "",
                "aic": "",
                "voltage": ""
            },
            "insulationResistance": insulation_container(),
            "correctedInsulationResistance": {"rows": []},
            "contactResistance": contact_container()
        }),
    );

    base_spec(template, SWITCH_NAMEPLATE, LV_SWITCH_ITEMS, &instruments)
        .group(fuse_group())
        .group(electrical_titles())
        .flat(electrical_flat())
        .flat([FlatRule::new("fuseData", "fuseData", ValueKind::Struct)])
        .table(insulation_table("test", POLE_TESTS, POLE_CELLS))
        .table(contact_table("test", &["Switch", "Fuse", "Switch + Fuse"], POLE_CELLS))
        .correction(insulation_correction(POLE_CELLS))
        .columns(standard_columns(&["fuseData"]))
}

/// Up to five switches in one report; device data, fuses and readings are per position.
pub fn low_voltage_switch_multi_device() -> ReportSpec {
    let instruments = [MEGOHMMETER, LOW_RESISTANCE_OHMMETER];
    let positions: Vec<String> = (1..=MULTI_DEVICE_ROWS).map(|i| i.to_string()).collect();
    let positions: Vec<&str> = positions.iter().map(String::as_str).collect();

    let template = template(
        &[],
        &instruments,
        json!({
            "switches": [],
            "fuses": [],
            "insulationResistance": insulation_container(),
            "correctedInsulationResistance": {"rows": []},
            "contactResistance": contact_container()
        }),
    );

    let switches = TableRule::fixed(
        "switches",
        &["switch data", "switch information", "switches"],
        MULTI_DEVICE_ROWS,
        row_template(
            "position",
            &["manufacturer", "catalogNumber", "serialNumber", "type", "ratedAmperage", "ratedVoltage"],
        ),
    )
    .flat_keys(&["switch-table", "switch-data"])
    .seeds(row_seeds("position", &positions));

    let fuses = TableRule::fixed(
        "fuses",
        &["fuse data", "fuses"],
        MULTI_DEVICE_ROWS,
        row_template(
            "position",
            &["manufacturer", "catalogNumber", "class", "amperage", "aic", "voltage"],
        ),
    )
    .flat_keys(&["fuse-table", "fuse-data"])
    .seeds(row_seeds("position", &positions));

    base_spec(template, &[], LV_SWITCH_ITEMS, &instruments)
        .group(electrical_titles())
        .flat(electrical_flat())
        .table(switches)
        .table(fuses)
        .table(
            insulation_table("position", &positions, MULTI_DEVICE_IR_CELLS)
                .alias("p1-p2", "p1p2")
                .alias("p2-p3", "p2p3")
                .alias("p3-p1", "p3p1"),
        )
        .table(contact_table("position", &positions, POLE_CELLS))
        .correction(insulation_correction(MULTI_DEVICE_IR_CELLS))
        .columns(standard_columns(&["switches", "fuses"]))
}

/// Medium-voltage oil switch: pole readings, dielectric withstand and insulating liquid.
pub fn medium_voltage_switch_oil() -> ReportSpec {
    let instruments = [MEGOHMMETER, LOW_RESISTANCE_OHMMETER, HIPOT_TEST_SET];
    let nameplate: &[NameplateField] = &[
        ("catalogNumber", &["catalog"]),
        ("serialNumber", &["serial"]),
        ("manufacturer", &["manufacturer", "make"]),
        ("ratedAmperage", &["amperage", "rated current"]),
        ("ratedVoltage", &["rated voltage", "voltage rating"]),
        ("bil", &["bil"]),
        ("fluidType", &["fluid", "oil type"]),
        ("type", &["type"]),
    ];

    let template = template(
        nameplate,
        &instruments,
        json!({
            "insulationResistance": insulation_container(),
            "correctedInsulationResistance": {"rows": []},
            "contactResistance": contact_container(),
            "dielectricWithstand": {"testVoltage": "", "duration": "", "rows": []},
            "insulatingLiquid": {"level": SELECT_ONE, "condition": ""}
        }),
    );

    let withstand = TableRule::fixed(
        "dielectricWithstand.rows",
        &["dielectric withstand", "withstand"],
        3,
        row_template("test", &["p1", "p2", "p3", "result"]),
    )
    .flat_keys(&["withstand-table"])
    .seeds(row_seeds("test", &["Pole to Frame", "Pole to Pole", "Across Open Contacts"]))
    .meta("testVoltage", "dielectricWithstand.testVoltage", ValueKind::Text)
    .meta("duration", "dielectricWithstand.duration", ValueKind::Text);

    base_spec(template, nameplate, OIL_SWITCH_ITEMS, &instruments)
        .group(
            electrical_titles()
                .field(text(&["withstand voltage"], "dielectricWithstand.testVoltage"))
                .field(choice(&["liquid level", "oil level"], "insulatingLiquid.level")),
        )
        .flat(electrical_flat())
        .flat([
            FlatRule::new("oilLevel", "insulatingLiquid.level", ValueKind::Choice),
            FlatRule::new("oilCondition", "insulatingLiquid.condition", ValueKind::Text),
        ])
        .table(insulation_table("test", POLE_TESTS, POLE_CELLS))
        .table(contact_table("test", &["Contact Resistance"], POLE_CELLS))
        .table(withstand)
        .correction(insulation_correction(POLE_CELLS))
        .columns(standard_columns(&["insulatingLiquid"]))
        .columns([ColumnRule::nested("electrical_tests", &["dielectricWithstand"])])
}

/// Automatic transfer switch: both sources, manual and automatic transfer checks.
pub fn automatic_transfer_switch() -> ReportSpec {
    let instruments = [MEGOHMMETER, LOW_RESISTANCE_OHMMETER];
    let nameplate: &[NameplateField] = &[
        ("catalogNumber", &["catalog"]),
        ("serialNumber", &["serial"]),
        ("manufacturer", &["manufacturer", "make"]),
        ("model", &["model"]),
        ("ratedAmperage", &["amperage", "rated current"]),
        ("ratedVoltage", &["rated voltage", "voltage rating"]),
        ("phases", &["phase"]),
        ("wires", &["wire"]),
    ];

    let template = template(
        nameplate,
        &instruments,
        json!({
            "insulationResistance": insulation_container(),
            "correctedInsulationResistance": {"rows": []},
            "contactResistance": contact_container(),
            "functionalTests": {
                "transferToEmergency": SELECT_ONE,
                "retransferToNormal": SELECT_ONE,
                "engineStart": SELECT_ONE,
                "timeDelays": SELECT_ONE
            }
        }),
    );

    let tests = [
        "Normal: Pole to Pole",
        "Normal: Pole to Frame",
        "Normal: Line to Load",
        "Emergency: Pole to Pole",
        "Emergency: Pole to Frame",
        "Emergency: Line to Load",
    ];

    base_spec(template, nameplate, ATS_ITEMS, &instruments)
        .group(electrical_titles())
        .group(SectionGroup::new("functional", &["functional", "operation test"]).fields([
            choice(&["emergency"], "functionalTests.transferToEmergency"),
            choice(&["normal", "retransfer"], "functionalTests.retransferToNormal"),
            choice(&["engine"], "functionalTests.engineStart"),
            choice(&["delay"], "functionalTests.timeDelays"),
        ]))
        .flat(electrical_flat())
        .flat([FlatRule::new("functionalTests", "functionalTests", ValueKind::Struct)])
        .table(insulation_table("test", &tests, POLE_CELLS))
        .table(contact_table("test", &["Normal", "Emergency"], POLE_CELLS))
        .correction(insulation_correction(POLE_CELLS))
        .columns(standard_columns(&[]))
        .columns([ColumnRule::nested("electrical_tests", &["functionalTests"])])
}
