//! Field normalization for upstream character, planet and weather data
//!
//! The upstream character dataset reports every attribute as a string,
//! including numbers ("1,358"), sentinels ("unknown", "n/a") and
//! comma-separated lists ("blue, grey"). These helpers turn them into the
//! typed, canonical form stored on a fused record.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("numeric prefix pattern is valid")
});

/// First `digits[.digits]` run, e.g. "1.5" in "1.5 (surface), 1 standard"
static GRAVITY_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.?\d*").expect("gravity pattern is valid"));

/// Parse a numeric attribute, falling back to `default`
///
/// `"unknown"` and `"n/a"` (exact, case-sensitive) map to `default`.
/// Otherwise thousands-separator commas are removed and the leading float
/// literal is parsed; a string with no leading literal maps to `default`.
pub fn parse_numeric(value: &str, default: f64) -> f64 {
    if value == "unknown" || value == "n/a" {
        return default;
    }
    let stripped: String = value.chars().filter(|c| *c != ',').collect();
    leading_float(&stripped).unwrap_or(default)
}

/// Parse a gravity description into standard gravities
///
/// Handles "1 standard", "0.5 standard", "2.5", "1.5 (surface), 1 standard"
/// (first number wins). `"unknown"`, `"N/A"` and strings without a number
/// map to 1.
pub fn parse_gravity(value: &str) -> f64 {
    if value == "unknown" || value == "N/A" {
        return 1.0;
    }
    GRAVITY_NUMBER
        .find(value)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(1.0)
}

/// Lower-case a comma-separated list and render every separator as `", "`
///
/// Idempotent.
pub fn normalize_list(value: &str) -> String {
    let lowered = value.to_lowercase();
    let mut out = String::with_capacity(lowered.len() + 4);
    let mut chars = lowered.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ',' {
            out.push_str(", ");
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
        } else {
            out.push(c);
        }
    }

    out.trim().to_string()
}

pub fn normalize_color(value: &str) -> String {
    normalize_list(value)
}

pub fn normalize_climate(value: &str) -> String {
    normalize_list(value)
}

pub fn normalize_terrain(value: &str) -> String {
    normalize_list(value)
}

/// Map known gender tokens to display form; unknown tokens pass through as-is
pub fn normalize_gender(value: &str) -> String {
    match value.to_lowercase().as_str() {
        "male" => "Male".to_string(),
        "female" => "Female".to_string(),
        "hermaphrodite" => "Hermaphrodite".to_string(),
        "n/a" => "Not Applicable".to_string(),
        "none" => "None".to_string(),
        _ => value.to_string(),
    }
}

/// Round to one decimal place; halves round toward positive infinity
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Real-world age in `current_year` for an in-universe birth year
///
/// Years are counted relative to 1977 (the BBY/ABY epoch): `"19BBY"` is
/// born in 1958, `"4ABY"` in 1981. Returns `None` without an era marker or
/// a leading number.
pub fn age_from_birth_year(birth_year: &str, current_year: i32) -> Option<f64> {
    let current_year = f64::from(current_year);

    if birth_year.contains("BBY") {
        let years = leading_float(&birth_year.replace("BBY", ""))?;
        return Some(current_year - (1977.0 - years));
    }

    if birth_year.contains("ABY") {
        let years = leading_float(&birth_year.replace("ABY", ""))?;
        return Some(current_year - (1977.0 + years));
    }

    None
}

/// Parse the longest float literal at the start of `value`
///
/// Accepts leading whitespace, an optional sign, digits with an optional
/// fraction, and an optional exponent. Trailing text is ignored.
fn leading_float(value: &str) -> Option<f64> {
    NUMERIC_PREFIX
        .find(value)
        .and_then(|m| m.as_str().trim_start().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
