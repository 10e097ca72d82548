use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Digits with an optional fraction, directly followed by MHz or GHz.
static FREQ_IN_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)[mg]hz").unwrap());

/// Every name-embedded value is scaled as megahertz, whichever unit it carries.
const NAME_SCALE: f64 = 1_000_000.0;

/// Recover a representative frequency (Hz) for a series.
///
/// The series name is tried first (`session_146.52MHz_log` → 146.52e6), then
/// the first auxiliary per-point value. No other fallbacks.
pub fn infer_frequency(series_name: &str, auxiliary: Option<&[Value]>) -> Option<f64> {
    if let Some(caps) = FREQ_IN_NAME_RE.captures(series_name) {
        if let Ok(value) = caps[1].parse::<f64>() {
            return Some(value * NAME_SCALE);
        }
    }

    auxiliary
        .and_then(|values| values.first())
        .and_then(numeric_value)
}

/// Numeric reading of one opaque auxiliary value.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

// ── Tests ──
