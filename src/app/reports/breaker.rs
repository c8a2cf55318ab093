//! Low-voltage circuit breakers (electronic trip, thermal magnetic, panelboard small breakers)
//! and medium-voltage circuit breakers.

use super::common::*;
use crate::core::mapping::{
    ColumnRule, CorrectionRule, FieldRule, FlatRule, ReportSpec, SectionGroup, TableRule, ValueKind,
};
use serde_json::{json, Value};

const ELECTRONIC_TRIP_NAMEPLATE: &[NameplateField] = &[
    ("catalogNumber", &["catalog"]),
    ("serialNumber", &["serial"]),
    ("manufacturer", &["manufacturer", "make"]),
    ("tripUnitType", &["trip unit"]),
    ("ratingPlug", &["rating plug", "plug"]),
    ("curveNo", &["curve"]),
    ("frameSize", &["frame"]),
    ("icRating", &["interrupting", "ic rating"]),
    ("chargeMotorVoltage", &["charge motor"]),
    ("operation", &["operation"]),
    ("mounting", &["mounting"]),
    ("zoneInterlock", &["zone"]),
    ("thermalMemory", &["thermal memory"]),
    ("type", &["type"]),
];

const THERMAL_MAGNETIC_NAMEPLATE: &[NameplateField] = &[
    ("catalogNumber", &["catalog"]),
    ("serialNumber", &["serial"]),
    ("manufacturer", &["manufacturer", "make"]),
    ("tripRating", &["trip rating", "trip unit"]),
    ("frameSize", &["frame"]),
    ("icRating", &["interrupting", "ic rating"]),
    ("poles", &["poles"]),
    ("type", &["type"]),
];

const LV_BREAKER_ITEMS: &[(&str, &str)] = &[
    ("7.6.1.2.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.6.1.2.A.2", "Inspect physical and mechanical condition."),
    ("7.6.1.2.A.3", "Inspect anchorage and alignment."),
    ("7.6.1.2.A.4", "Verify that all maintenance devices are available for servicing and operating the breaker."),
    ("7.6.1.2.A.5", "Verify the unit is clean."),
    ("7.6.1.2.A.6", "Verify the arc chutes are intact."),
    ("7.6.1.2.A.7", "Inspect moving and stationary contacts for condition and alignment."),
    ("7.6.1.2.A.8", "Verify that primary and secondary contact wipe and other dimensions vital to satisfactory operation of the breaker are correct."),
    ("7.6.1.2.A.9", "Perform all mechanical operator and contact alignment tests on both the breaker and its operating mechanism."),
];

const SMALL_BREAKER_ITEMS: &[(&str, &str)] = &[
    ("7.6.1.1.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.6.1.1.A.2", "Inspect physical and mechanical condition."),
    ("7.6.1.1.A.3", "Inspect anchorage and alignment."),
    ("7.6.1.1.A.4", "Verify the unit is clean."),
    ("7.6.1.1.A.5", "Operate the circuit breaker to ensure smooth operation."),
    ("7.6.1.1.A.6", "Inspect bolted electrical connections for high resistance."),
    ("7.6.1.1.A.7", "Inspect operating mechanism, contacts, and arc chutes in unsealed units."),
];

const MV_BREAKER_ITEMS: &[(&str, &str)] = &[
    ("7.6.3.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.6.3.A.2", "Inspect physical and mechanical condition."),
    ("7.6.3.A.3", "Inspect anchorage, alignment, and grounding."),
    ("7.6.3.A.4", "Verify that all maintenance devices are available for servicing and operating the breaker."),
    ("7.6.3.A.5", "Verify the unit is clean."),
    ("7.6.3.A.6", "Inspect vacuum bottle assemblies."),
    ("7.6.3.A.7", "Measure critical distances such as contact gap as recommended by the manufacturer."),
    ("7.6.3.A.8", "Inspect bolted electrical connections for high resistance."),
    ("7.6.3.A.9", "Record as-found and as-left operation counter readings."),
];

const BREAKER_TESTS: &[&str] = &["Pole to Pole (Closed)", "Pole to Frame (Closed)", "Line to Load (Open)"];
const POLE_CELLS: &[&str] = &["p1", "p2", "p3"];
const INJECTION_CELLS: &[&str] = &[
    "amperes", "multiplier", "toleranceMin", "toleranceMax", "p1", "p2", "p3", "result",
];

/// Which injection test a breaker report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    Primary,
    Secondary,
}

impl Injection {
    fn key(self) -> &'static str {
        match self {
            Injection::Primary => "primaryInjection",
            Injection::Secondary => "secondaryInjection",
        }
    }

    fn instrument(self) -> Instrument {
        match self {
            Injection::Primary => PRIMARY_INJECTION_SET,
            Injection::Secondary => SECONDARY_INJECTION_SET,
        }
    }

    fn table(self, functions: &[&str]) -> TableRule {
        let (labels, flat_keys): (&[&str], &[&str]) = match self {
            Injection::Primary => (&["primary injection"], &["primary-injection", "pi-table"]),
            Injection::Secondary => (&["secondary injection"], &["secondary-injection", "si-table"]),
        };
        TableRule::fixed(
            &format!("{}.rows", self.key()),
            labels,
            functions.len(),
            row_template("function", INJECTION_CELLS),
        )
        .flat_keys(flat_keys)
        .seeds(row_seeds("function", functions))
    }
}

fn injection_container() -> Value {
    json!({"rows": []})
}

fn breaker_electrical() -> SectionGroup {
    electrical_group(&[
        "electrical test",
        "insulation resistance",
        "contact resistance",
        "injection",
    ])
}

/// Electronic trip breakers; the injection kind picks the timing table.
pub fn electronic_trip(injection: Injection) -> ReportSpec {
    let instruments = [MEGOHMMETER, LOW_RESISTANCE_OHMMETER, injection.instrument()];
    let mut extra = json!({
        "tripSettings": {
            "longTime": {"setting": "", "delay": ""},
            "shortTime": {"setting": "", "delay": "", "i2t": ""},
            "instantaneous": {"setting": ""},
            "groundFault": {"setting": "", "delay": "", "i2t": ""}
        },
        "insulationResistance": insulation_container(),
        "correctedInsulationResistance": {"rows": []},
        "contactResistance": contact_container()
    });
    extra[injection.key()] = injection_container();
    let template = template(ELECTRONIC_TRIP_NAMEPLATE, &instruments, extra);

    let settings = SectionGroup::new("settings", &["settings", "trip unit"])
        .field(FieldRule::new(&["trip settings"], "tripSettings", ValueKind::Struct))
        .fields([
            text(&["long time pickup", "ltpu"], "tripSettings.longTime.setting"),
            text(&["long time delay", "ltd"], "tripSettings.longTime.delay"),
            text(&["short time i2t", "short time i²t"], "tripSettings.shortTime.i2t"),
            text(&["short time pickup", "stpu"], "tripSettings.shortTime.setting"),
            text(&["short time delay", "std"], "tripSettings.shortTime.delay"),
            text(&["instantaneous"], "tripSettings.instantaneous.setting"),
            text(&["ground fault i2t", "ground fault i²t"], "tripSettings.groundFault.i2t"),
            text(&["ground fault pickup", "gfpu"], "tripSettings.groundFault.setting"),
            text(&["ground fault delay", "gfd"], "tripSettings.groundFault.delay"),
        ]);

    base_spec(template, ELECTRONIC_TRIP_NAMEPLATE, LV_BREAKER_ITEMS, &instruments)
        .group(settings)
        .group(breaker_electrical())
        .flat(electrical_flat())
        .flat([FlatRule::new("tripSettings", "tripSettings", ValueKind::Struct)])
        .table(insulation_table("test", BREAKER_TESTS, POLE_CELLS))
        .table(contact_table("test", &["Contact Resistance"], POLE_CELLS))
        .table(injection.table(&["Long Time", "Short Time", "Instantaneous", "Ground Fault"]))
        .correction(insulation_correction(POLE_CELLS))
        .columns(standard_columns(&["tripSettings"]))
        .columns([ColumnRule::nested("electrical_tests", &[injection.key()])])
}

pub fn thermal_magnetic() -> ReportSpec {
    let instruments = [MEGOHMMETER, LOW_RESISTANCE_OHMMETER, PRIMARY_INJECTION_SET];
    let template = template(
        THERMAL_MAGNETIC_NAMEPLATE,
        &instruments,
        json!({
            "insulationResistance": insulation_container(),
            "correctedInsulationResistance": {"rows": []},
            "contactResistance": contact_container(),
            "primaryInjection": injection_container()
        }),
    );

    base_spec(template, THERMAL_MAGNETIC_NAMEPLATE, LV_BREAKER_ITEMS, &instruments)
        .group(breaker_electrical())
        .flat(electrical_flat())
        .table(insulation_table("test", BREAKER_TESTS, POLE_CELLS))
        .table(contact_table("test", &["Contact Resistance"], POLE_CELLS))
        .table(Injection::Primary.table(&["Thermal (Long Time)", "Magnetic (Instantaneous)"]))
        .correction(insulation_correction(POLE_CELLS))
        .columns(standard_columns(&[]))
        .columns([ColumnRule::nested("electrical_tests", &["primaryInjection"])])
}

/// Panelboard with any number of small molded-case breakers, one row each.
pub fn panelboard_small_breaker() -> ReportSpec {
    let instruments = [MEGOHMMETER, LOW_RESISTANCE_OHMMETER, PRIMARY_INJECTION_SET];
    let nameplate: &[NameplateField] = &[
        ("panelName", &["panel name", "panel designation"]),
        ("catalogNumber", &["catalog"]),
        ("serialNumber", &["serial"]),
        ("manufacturer", &["manufacturer", "make"]),
        ("ratedVoltage", &["voltage"]),
        ("ratedAmperage", &["amperage", "main"]),
    ];
    let cells = [
        "poles",
        "manufacturer",
        "type",
        "frameSize",
        "tripRating",
        "testCurrent",
        "tripTimeMin",
        "tripTimeMax",
        "tripTime",
        "instantaneousMin",
        "instantaneousMax",
        "instantaneous",
        "contactResistance",
        "insulationResistance",
        "result",
    ];

    let template = template(
        nameplate,
        &instruments,
        json!({
            "breakers": [],
            "insulationResistance": insulation_container(),
            "correctedInsulationResistance": {"rows": []}
        }),
    );

    let breakers = TableRule::variable(
        "breakers",
        &["breaker"],
        0,
        row_template("circuit", &cells),
    )
    .excluding(&["breaker data"])
    .flat_keys(&["breakers", "breaker-table"])
    .alias("circuitNumber", "circuit")
    .alias("ir", "insulationResistance")
    .alias("contact", "contactResistance");

    base_spec(template, nameplate, SMALL_BREAKER_ITEMS, &instruments)
        .group(breaker_electrical())
        .flat(electrical_flat())
        .table(breakers)
        .correction(CorrectionRule::new(
            "breakers",
            CORRECTED_IR_PATH,
            &["insulationResistance"],
        ))
        .columns(standard_columns(&[]))
        .columns([ColumnRule::nested("electrical_tests", &["breakers"])])
}

pub fn medium_voltage_breaker() -> ReportSpec {
    let instruments = [MEGOHMMETER, LOW_RESISTANCE_OHMMETER, HIPOT_TEST_SET];
    let nameplate: &[NameplateField] = &[
        ("catalogNumber", &["catalog"]),
        ("serialNumber", &["serial"]),
        ("manufacturer", &["manufacturer", "make"]),
        ("ratedVoltage", &["rated voltage", "voltage rating"]),
        ("ratedCurrent", &["rated current", "amperage"]),
        ("bil", &["bil"]),
        ("icRating", &["interrupting", "ic rating"]),
        ("operatingMechanism", &["mechanism"]),
        ("controlVoltage", &["control voltage"]),
        ("counter", &["counter"]),
        ("type", &["type"]),
    ];

    let template = template(
        nameplate,
        &instruments,
        json!({
            "insulationResistance": insulation_container(),
            "correctedInsulationResistance": {"rows": []},
            "contactResistance": contact_container(),
            "vacuumIntegrity": {"testVoltage": "", "rows": []}
        }),
    );

    let vacuum = TableRule::fixed(
        "vacuumIntegrity.rows",
        &["vacuum"],
        1,
        row_template("test", &["p1", "p2", "p3", "result"]),
    )
    .flat_keys(&["vacuum-table"])
    .seeds(row_seeds("test", &["Vacuum Bottle Integrity (Breaker Open)"]))
    .meta("testVoltage", "vacuumIntegrity.testVoltage", ValueKind::Text);

    base_spec(template, nameplate, MV_BREAKER_ITEMS, &instruments)
        .group(breaker_electrical().field(text(&["vacuum test voltage"], "vacuumIntegrity.testVoltage")))
        .flat(electrical_flat())
        .table(insulation_table("test", BREAKER_TESTS, POLE_CELLS))
        .table(contact_table("test", &["Contact Resistance"], POLE_CELLS))
        .table(vacuum)
        .correction(insulation_correction(POLE_CELLS))
        .columns(standard_columns(&[]))
        .columns([ColumnRule::nested("electrical_tests", &["vacuumIntegrity"])])
}
