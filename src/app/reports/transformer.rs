//! Dry-type and liquid-filled power transformers, oil inspection, and instrument transformers.
//!
//! Power transformer insulation is measured at 30 s, 1 min and 10 min so the corrected table
//! also carries the dielectric absorption and polarization index ratios.

use super::common::*;
use crate::core::mapping::{
    ColumnRule, FlatRule, RatioRule, ReportSpec, SectionGroup, TableRule, ValueKind,
};
use serde_json::{json, Value};

const TRANSFORMER_NAMEPLATE: &[NameplateField] = &[
    ("catalogNumber", &["catalog"]),
    ("serialNumber", &["serial"]),
    ("manufacturer", &["manufacturer", "make"]),
    ("kva", &["kva"]),
    ("tempRise", &["temp rise", "temperature rise"]),
    ("impedance", &["impedance", "%z"]),
    ("primaryVoltage", &["primary voltage"]),
    ("secondaryVoltage", &["secondary voltage"]),
    ("primaryConnection", &["primary connection"]),
    ("secondaryConnection", &["secondary connection"]),
    ("windingMaterial", &["winding"]),
    ("tapPosition", &["tap position", "tap setting"]),
];

const LIQUID_NAMEPLATE: &[NameplateField] = &[
    ("catalogNumber", &["catalog"]),
    ("serialNumber", &["serial"]),
    ("manufacturer", &["manufacturer", "make"]),
    ("kva", &["kva"]),
    ("impedance", &["impedance", "%z"]),
    ("primaryVoltage", &["primary voltage"]),
    ("secondaryVoltage", &["secondary voltage"]),
    ("fluidType", &["fluid type", "liquid type", "oil type"]),
    ("fluidCapacity", &["gallons", "capacity"]),
    ("tapPosition", &["tap position", "tap setting"]),
];

const INSTRUMENT_NAMEPLATE: &[NameplateField] = &[
    ("manufacturer", &["manufacturer", "make"]),
    ("catalogNumber", &["catalog"]),
    ("class", &["class"]),
    ("ratedVoltage", &["voltage"]),
];

const DRY_ITEMS: &[(&str, &str)] = &[
    ("7.2.1.1.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.2.1.1.A.2", "Inspect physical and mechanical condition."),
    ("7.2.1.1.A.3", "Inspect anchorage, alignment, and grounding."),
    ("7.2.1.1.A.4", "Verify that resilient mounts are free and that any shipping brackets have been removed."),
    ("7.2.1.1.A.5", "Verify the unit is clean."),
    ("7.2.1.1.A.6", "Inspect bolted electrical connections for high resistance."),
    ("7.2.1.1.A.7", "Verify that as-left tap connections are as specified."),
];

const LARGE_DRY_ITEMS: &[(&str, &str)] = &[
    ("7.2.1.2.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.2.1.2.A.2", "Inspect physical and mechanical condition."),
    ("7.2.1.2.A.3", "Inspect anchorage, alignment, and grounding."),
    ("7.2.1.2.A.4", "Verify that resilient mounts are free and that any shipping brackets have been removed."),
    ("7.2.1.2.A.5", "Verify the unit is clean."),
    ("7.2.1.2.A.6", "Verify that control and alarm settings on temperature indicators are as specified."),
    ("7.2.1.2.A.7", "Verify that cooling fans operate correctly."),
    ("7.2.1.2.A.8", "Inspect bolted electrical connections for high resistance."),
    ("7.2.1.2.A.9", "Verify that as-left tap connections are as specified."),
];

const LIQUID_ITEMS: &[(&str, &str)] = &[
    ("7.2.2.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.2.2.A.2", "Inspect physical and mechanical condition."),
    ("7.2.2.A.3", "Inspect impact recorder prior to unloading."),
    ("7.2.2.A.4", "Test dew point of tank gases."),
    ("7.2.2.A.5", "Inspect anchorage, alignment, and grounding."),
    ("7.2.2.A.6", "Verify the presence of PCB content labeling."),
    ("7.2.2.A.7", "Verify removal of any shipping bracing after placement."),
    ("7.2.2.A.8", "Verify the bushings are clean."),
    ("7.2.2.A.9", "Verify that alarm, control, and trip settings on temperature and level indicators are as specified."),
];

const OIL_ITEMS: &[(&str, &str)] = &[
    ("7.2.2.B.1", "Verify that the sample was drawn from the bottom sampling valve."),
    ("7.2.2.B.2", "Inspect sample container for contamination."),
    ("7.2.2.B.3", "Verify insulating liquid level."),
];

const CT_ITEMS: &[(&str, &str)] = &[
    ("7.10.1.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.10.1.A.2", "Inspect physical and mechanical condition."),
    ("7.10.1.A.3", "Verify correct connection of transformers with system requirements."),
    ("7.10.1.A.4", "Verify that adequate clearances exist between primary and secondary circuit wiring."),
    ("7.10.1.A.5", "Verify the unit is clean."),
    ("7.10.1.A.6", "Inspect bolted electrical connections for high resistance."),
    ("7.10.1.A.7", "Verify that all required grounding and shorting connections provide contact."),
    ("7.10.1.A.8", "Verify appropriate lubrication on moving current-carrying parts."),
];

const PT_ITEMS: &[(&str, &str)] = &[
    ("7.10.2.A.1", "Compare equipment nameplate data with drawings and specifications."),
    ("7.10.2.A.2", "Inspect physical and mechanical condition."),
    ("7.10.2.A.3", "Verify correct connection of transformers with system requirements."),
    ("7.10.2.A.4", "Verify that adequate clearances exist between primary and secondary circuit wiring."),
    ("7.10.2.A.5", "Verify the unit is clean."),
    ("7.10.2.A.6", "Inspect bolted electrical connections for high resistance."),
    ("7.10.2.A.7", "Verify that all required grounding connections provide contact."),
    ("7.10.2.A.8", "Verify correct primary and secondary fuse sizes for voltage transformers."),
];

const WINDING_TESTS: &[&str] = &["Primary to Ground", "Secondary to Ground", "Primary to Secondary"];
const TIMED_CELLS: &[&str] = &["halfMinute", "oneMinute", "tenMinute"];
const TAPS: &[&str] = &["1", "2", "3", "4", "5"];
const PHASE_CELLS: &[&str] = &["phaseA", "phaseB", "phaseC"];
const INSTRUMENT_TESTS: &[&str] = &["Primary to Secondary", "Primary to Ground", "Secondary to Ground"];

fn insulation_containers() -> Value {
    json!({
        "insulationResistance": insulation_container(),
        "correctedInsulationResistance": {"rows": []}
    })
}

fn merged(mut base: Value, extra: Value) -> Value {
    if let (Some(target), Value::Object(extra)) = (base.as_object_mut(), extra) {
        target.extend(extra);
    }
    base
}

fn timed_insulation(tests: &[&str]) -> TableRule {
    insulation_table("test", tests, TIMED_CELLS)
        .alias("30sec", "halfMinute")
        .alias("1min", "oneMinute")
        .alias("10min", "tenMinute")
}

fn turns_ratio_table() -> TableRule {
    TableRule::fixed(
        "turnsRatio.rows",
        &["turns ratio", "ttr"],
        TAPS.len(),
        row_template(
            "tap",
            &[
                "nameplateVoltage",
                "calculatedRatio",
                "measuredH1",
                "measuredH2",
                "measuredH3",
                "deviationH1",
                "deviationH2",
                "deviationH3",
                "result",
            ],
        ),
    )
    .flat_keys(&["ttr-table", "turns-ratio"])
    .seeds(row_seeds("tap", TAPS))
}

/// Adds ratio columns computed from the corrected timed readings.
fn with_ratios(spec: ReportSpec) -> ReportSpec {
    spec.correction(insulation_correction(TIMED_CELLS))
        .ratio(RatioRule::new(
            CORRECTED_IR_PATH,
            "oneMinute",
            "halfMinute",
            "dielectricAbsorption",
        ))
        .ratio(RatioRule::new(
            CORRECTED_IR_PATH,
            "tenMinute",
            "oneMinute",
            "polarizationIndex",
        ))
}

fn transformer_electrical() -> SectionGroup {
    electrical_group(&["electrical test", "insulation resistance", "turns ratio"])
}

/// Dry-type transformers; large units add a turns ratio table.
pub fn dry_type(large: bool) -> ReportSpec {
    let instruments: Vec<Instrument> = if large {
        vec![MEGOHMMETER, TTR_TEST_SET]
    } else {
        vec![MEGOHMMETER]
    };
    let extra = if large {
        merged(insulation_containers(), json!({"turnsRatio": {"rows": []}}))
    } else {
        insulation_containers()
    };
    let items = if large { LARGE_DRY_ITEMS } else { DRY_ITEMS };
    let template = template(TRANSFORMER_NAMEPLATE, &instruments, extra);

    let spec = base_spec(template, TRANSFORMER_NAMEPLATE, items, &instruments)
        .group(transformer_electrical())
        .flat(electrical_flat())
        .table(timed_insulation(WINDING_TESTS));

    if large {
        with_ratios(spec.table(turns_ratio_table()))
            .columns(standard_columns(&[]))
            .columns([ColumnRule::nested("electrical_tests", &["turnsRatio"])])
    } else {
        with_ratios(spec).columns(standard_columns(&[]))
    }
}

/// Two small dry-type transformers on one report.
pub fn two_small_dry_type() -> ReportSpec {
    let instruments = [MEGOHMMETER];
    let template = template(
        &[],
        &instruments,
        merged(insulation_containers(), json!({"transformers": []})),
    );

    let transformers = TableRule::fixed(
        "transformers",
        &["transformer data", "transformers"],
        2,
        row_template(
            "position",
            &[
                "manufacturer",
                "catalogNumber",
                "serialNumber",
                "kva",
                "primaryVoltage",
                "secondaryVoltage",
            ],
        ),
    )
    .flat_keys(&["transformer-table", "transformers"])
    .seeds(row_seeds("position", &["T1", "T2"]));

    let tests: Vec<String> = ["T1", "T2"]
        .iter()
        .flat_map(|unit| WINDING_TESTS.iter().map(move |test| format!("{} {}", unit, test)))
        .collect();
    let tests: Vec<&str> = tests.iter().map(String::as_str).collect();

    with_ratios(
        base_spec(template, &[], DRY_ITEMS, &instruments)
            .group(transformer_electrical())
            .flat(electrical_flat())
            .table(transformers)
            .table(timed_insulation(&tests)),
    )
    .columns(standard_columns(&["transformers"]))
}

pub fn liquid_filled() -> ReportSpec {
    let instruments = [MEGOHMMETER, TTR_TEST_SET];
    let template = template(
        LIQUID_NAMEPLATE,
        &instruments,
        merged(
            insulation_containers(),
            json!({
                "turnsRatio": {"rows": []},
                "indicators": {"liquidLevel": "", "liquidTemperature": "", "windingTemperature": "", "pressure": ""}
            }),
        ),
    );

    let indicators = SectionGroup::new("indicators", &["indicator", "gauge"]).fields([
        text(&["level"], "indicators.liquidLevel"),
        text(&["winding"], "indicators.windingTemperature"),
        text(&["temp"], "indicators.liquidTemperature"),
        text(&["pressure", "vacuum"], "indicators.pressure"),
    ]);

    with_ratios(
        base_spec(template, LIQUID_NAMEPLATE, LIQUID_ITEMS, &instruments)
            .group(indicators)
            .group(transformer_electrical())
            .flat(electrical_flat())
            .flat([FlatRule::new("indicators", "indicators", ValueKind::Struct)])
            .table(timed_insulation(WINDING_TESTS))
            .table(turns_ratio_table()),
    )
    .columns(standard_columns(&["indicators"]))
    .columns([ColumnRule::nested("electrical_tests", &["turnsRatio"])])
}

/// Insulating liquid sample results; no electrical tests.
pub fn oil_inspection() -> ReportSpec {
    let instruments = [OIL_TEST_SET];
    let analysis = [
        ("sampleDate", &["sample date"][..]),
        ("dielectricBreakdown", &["dielectric", "breakdown"][..]),
        ("acidNumber", &["acid", "neutralization"][..]),
        ("interfacialTension", &["interfacial", "ift"][..]),
        ("color", &["color"][..]),
        ("moisture", &["moisture", "water content"][..]),
        ("powerFactor", &["power factor"][..]),
        ("visualCondition", &["visual", "appearance"][..]),
    ];

    let mut fields = serde_json::Map::new();
    for (key, _) in &analysis {
        fields.insert(key.to_string(), Value::String(String::new()));
    }
    let template = template(
        LIQUID_NAMEPLATE,
        &instruments,
        json!({"oilAnalysis": Value::Object(fields)}),
    );

    let group = SectionGroup::new("oil", &["oil", "fluid analysis", "sample results"]).fields(
        analysis
            .iter()
            .map(|(key, labels)| text(labels, &format!("oilAnalysis.{}", key))),
    );

    base_spec(template, LIQUID_NAMEPLATE, OIL_ITEMS, &instruments)
        .group(group)
        .flat([FlatRule::new("oilAnalysis", "oilAnalysis", ValueKind::Struct)])
        .flat(analysis.iter().map(|(key, _)| {
            FlatRule::new(key, &format!("oilAnalysis.{}", key), ValueKind::Text)
        }))
        .columns(standard_columns(&[]))
        .columns([ColumnRule::nested("electrical_tests", &["oilAnalysis"])])
}

/// Current or potential transformers: one data row and one insulation row per phase.
pub fn instrument_transformer(potential: bool) -> ReportSpec {
    let instruments = if potential {
        [MEGOHMMETER, TTR_TEST_SET]
    } else {
        [MEGOHMMETER, CT_ANALYZER]
    };
    let (key, labels, items): (&str, &[&str], _) = if potential {
        ("potentialTransformers", &["potential transformer", "pt data"], PT_ITEMS)
    } else {
        ("currentTransformers", &["current transformer", "ct data"], CT_ITEMS)
    };
    let cells: &[&str] = if potential {
        &["serialNumber", "ratio", "accuracyClass", "burden", "fuseRating", "measuredRatio", "result"]
    } else {
        &["serialNumber", "ratio", "accuracyClass", "burden", "polarity", "measuredRatio", "ratioError", "result"]
    };

    let mut extra = insulation_containers();
    extra[key] = json!([]);
    let template = template(INSTRUMENT_NAMEPLATE, &instruments, extra);

    let units = TableRule::fixed(key, labels, 3, row_template("phase", cells))
        .flat_keys(&[if potential { "pt-table" } else { "ct-table" }])
        .seeds(row_seeds("phase", &["A", "B", "C"]));
    base_spec(template, INSTRUMENT_NAMEPLATE, items, &instruments)
        .group(electrical_group(&["electrical test", "insulation resistance", "ratio"]))
        .flat(electrical_flat())
        .table(units)
        .table(insulation_table("test", INSTRUMENT_TESTS, PHASE_CELLS))
        .correction(insulation_correction(PHASE_CELLS))
        .columns(standard_columns(&[key]))
}
