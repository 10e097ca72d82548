use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::strategy::{parse_leading_value, ExtractionStrategy, RawFigure};

static FIGURE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{\s*"data"\s*:"#).unwrap());

/// A figure object `{"data": [...], "layout": {...}}` embedded anywhere in the script.
/// The object's end is wherever the JSON value ends, not the next brace.
pub struct EmbeddedFigure;

impl ExtractionStrategy for EmbeddedFigure {
    fn name(&self) -> &'static str {
        "embedded-figure"
    }

    fn try_extract(&self, script: &str) -> Option<RawFigure> {
        FIGURE_START_RE
            .find_iter(script)
            .filter_map(|m| parse_leading_value(&script[m.start()..]))
            .find_map(|(value, _)| split_figure(value))
            .filter(RawFigure::is_usable)
    }
}

fn split_figure(value: Value) -> Option<RawFigure> {
    let Value::Object(mut fig) = value else {
        return None;
    };
    let data = fig.remove("data")?;
    let layout = fig.remove("layout")?;
    Some(RawFigure { data, layout })
}

// ── Tests ──
