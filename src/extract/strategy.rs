use serde_json::{Deserializer, Value};
use tracing::debug;

use crate::series::Series;

/// Raw `(data, layout)` pair recovered from script text, before any typing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFigure {
    pub data: Value,
    pub layout: Value,
}

impl RawFigure {
    /// A usable figure has a trace array and a layout object.
    pub fn is_usable(&self) -> bool {
        self.data.is_array() && self.layout.is_object()
    }
}

/// A figure whose traces have been typed.
#[derive(Debug, Clone)]
pub struct Figure {
    pub strategy: &'static str,
    pub series: Vec<Series>,
    pub layout: Value,
}

/// One textual method of recovering a figure from an exported chart script.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` on any mismatch or malformed structure; never panics, never errors.
    fn try_extract(&self, script: &str) -> Option<RawFigure>;
}

/// Run `strategies` in order and return the first figure that is usable and
/// whose traces type as `Series`. A strategy whose traces don't type is a miss,
/// and the next strategy gets its turn.
pub fn first_match(strategies: &[Box<dyn ExtractionStrategy>], script: &str) -> Option<Figure> {
    strategies.iter().find_map(|s| {
        let RawFigure { data, layout } = s.try_extract(script).filter(RawFigure::is_usable)?;
        match serde_json::from_value::<Vec<Series>>(data) {
            Ok(series) => Some(Figure {
                strategy: s.name(),
                series,
                layout,
            }),
            Err(e) => {
                debug!("{}: traces are malformed: {}", s.name(), e);
                None
            }
        }
    })
}

/// Parse exactly one JSON value at the start of `text` (leading whitespace allowed).
/// Returns the value and the unparsed remainder.
pub(crate) fn parse_leading_value(text: &str) -> Option<(Value, &str)> {
    let mut stream = Deserializer::from_str(text).into_iter::<Value>();
    let value = stream.next()?.ok()?;
    let rest = &text[stream.byte_offset()..];
    Some((value, rest))
}

// ── Tests ──
