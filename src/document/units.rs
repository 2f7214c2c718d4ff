//! SVG length parsing in CSS pixels.

const PX_PER_IN: f64 = 96.0;

const UNITS: &[(&str, f64)] = &[
    ("px", 1.0),
    ("in", PX_PER_IN),
    ("pt", PX_PER_IN / 72.0),
    ("pc", PX_PER_IN / 6.0),
    ("mm", PX_PER_IN / 25.4),
    ("cm", PX_PER_IN / 2.54),
    ("Q", PX_PER_IN / 101.6),
    ("q", PX_PER_IN / 101.6),
];

/// Length in px. Percentages and garbage yield `None`.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.ends_with('%') {
        return None;
    }
    for (suffix, factor) in UNITS {
        if let Some(number) = value.strip_suffix(suffix) {
            return number.trim().parse::<f64>().ok().map(|n| n * factor);
        }
    }
    value.parse::<f64>().ok()
}

/// First number of an attribute that may hold a list (`x="10 20"`).
pub fn first_number(value: &str) -> Option<f64> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .find(|s| !s.is_empty())
        .and_then(parse_length)
}

/// All numbers of a `points`/`viewBox` style list.
pub fn number_list(value: &str) -> Vec<f64> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<f64>().ok())
        .collect()
}
