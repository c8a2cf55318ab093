//! Temperature conversion and insulation-resistance temperature correction.
//!
//! The correction factor table normalises readings to a 20 °C reference. It covers every
//! integer Celsius value from −24 to 110 and follows the solid-insulation curve (the factor
//! doubles every 15 °C), tabulated to three decimals. Temperatures outside the table get 1.0.

pub const TCF_MIN_CELSIUS: i64 = -24;
pub const TCF_MAX_CELSIUS: i64 = 110;

#[rustfmt::skip]
const TCF_TABLE: [f64; 135] = [
    0.131, 0.137, 0.144, 0.150, 0.157, 0.165, 0.173, 0.181, 0.189, 0.198, // -24
    0.208, 0.218, 0.228, 0.239, 0.250, 0.262, 0.274, 0.287, 0.301, 0.315, // -14
    0.330, 0.345, 0.362, 0.379, 0.397, 0.416, 0.435, 0.456, 0.477, 0.500, // -4
    0.524, 0.548, 0.574, 0.602, 0.630, 0.660, 0.691, 0.724, 0.758, 0.794, // 6
    0.831, 0.871, 0.912, 0.955, 1.000, 1.047, 1.097, 1.149, 1.203, 1.260, // 16
    1.320, 1.382, 1.447, 1.516, 1.587, 1.662, 1.741, 1.823, 1.910, 2.000, // 26
    2.095, 2.194, 2.297, 2.406, 2.520, 2.639, 2.764, 2.895, 3.031, 3.175, // 36
    3.325, 3.482, 3.647, 3.819, 4.000, 4.189, 4.387, 4.595, 4.812, 5.040, // 46
    5.278, 5.528, 5.789, 6.063, 6.350, 6.650, 6.964, 7.294, 7.639, 8.000, // 56
    8.378, 8.775, 9.190, 9.624, 10.079, 10.556, 11.055, 11.578, 12.126, 12.699, // 66
    13.300, 13.929, 14.588, 15.277, 16.000, 16.757, 17.549, 18.379, 19.248, 20.159, // 76
    21.112, 22.111, 23.156, 24.251, 25.398, 26.600, 27.858, 29.175, 30.555, 32.000, // 86
    33.513, 35.098, 36.758, 38.497, 40.317, 42.224, 44.221, 46.313, 48.503, 50.797, // 96
    53.199, 55.715, 58.350, 61.110, 64.000, // 106
];

/// Halves round toward +∞ (`-2.5` → `-2`), matching the report forms.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// `round((f - 32) * 5 / 9)`; the rounding happens before any TCF lookup.
pub fn celsius(fahrenheit: f64) -> i64 {
    round_half_up((fahrenheit - 32.0) * 5.0 / 9.0)
}

pub fn fahrenheit(celsius: i64) -> i64 {
    round_half_up(celsius as f64 * 9.0 / 5.0 + 32.0)
}

pub fn tcf(celsius: i64) -> f64 {
    if !(TCF_MIN_CELSIUS..=TCF_MAX_CELSIUS).contains(&celsius) {
        return 1.0;
    }
    TCF_TABLE
        .get((celsius - TCF_MIN_CELSIUS) as usize)
        .copied()
        .unwrap_or(1.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn corrected(reading: f64, celsius: i64) -> f64 {
    round2(reading * tcf(celsius))
}

/// Corrects one table cell. Empty stays empty, non-numeric text (`>2200`, `N/A`) passes through.
pub fn corrected_cell(raw: &str, celsius: i64) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match trimmed.parse::<f64>() {
        Ok(reading) if reading.is_finite() => format!("{:.2}", corrected(reading, celsius)),
        _ => trimmed.to_string(),
    }
}

/// Dielectric absorption / polarization index style ratio, two decimals.
pub fn ratio_cell(numerator: &str, denominator: &str) -> String {
    let parse = |s: &str| s.trim().parse::<f64>().ok().filter(|n| n.is_finite());
    match (parse(numerator), parse(denominator)) {
        (Some(n), Some(d)) if d != 0.0 => format!("{:.2}", round2(n / d)),
        _ => String::new(),
    }
}
