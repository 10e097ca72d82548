use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One plotted trace, as exported by the plotting library.
///
/// Only the fields the aggregator reads or writes are typed; everything else in
/// the trace object is kept in `extra` and handed back to the renderer untouched.
/// Coordinates stay opaque: exports carry either plain arrays or typed-array
/// objects (`{"dtype": "f8", "bdata": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Any JSON in an export; always a string once aggregated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub x: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub y: Value,
    /// Opaque per-point values (frequency hints, usually).
    #[serde(rename = "customdata", default, skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Series {
    /// The name if it is a string, else empty.
    pub fn display_name(&self) -> &str {
        self.name.as_ref().and_then(Value::as_str).unwrap_or("")
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(Value::String(name.to_string()));
    }

    /// Per-point auxiliary values, when exported as a plain array.
    pub fn auxiliary_values(&self) -> Option<&[Value]> {
        self.auxiliary
            .as_ref()
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    pub fn set_color(&mut self, color: &str) {
        self.line.get_or_insert_with(LineStyle::default).color = Some(color.to_string());
    }

    pub fn color(&self) -> Option<&str> {
        self.line.as_ref().and_then(|l| l.color.as_deref())
    }

    /// Point count from plain arrays or a typed array's `shape`; `None` when unknown.
    pub fn point_count(&self) -> Option<usize> {
        match (coordinate_len(&self.x), coordinate_len(&self.y)) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }
}

fn coordinate_len(values: &Value) -> Option<usize> {
    match values {
        Value::Array(items) => Some(items.len()),
        Value::Object(typed) => typed
            .get("shape")
            .and_then(|shape| match shape {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.split(',').next()?.trim().parse().ok(),
                _ => None,
            })
            .and_then(|n| usize::try_from(n).ok()),
        _ => None,
    }
}

/// Layout of the combined chart. Per-document layouts are never merged into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub xaxis: AxisLayout,
    pub yaxis: AxisLayout,
    pub legend: Legend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLayout {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: String,
}

impl Layout {
    pub fn combined() -> Self {
        Layout {
            title: "Cumulative SDR Timeline (UTC)".into(),
            xaxis: AxisLayout {
                title: "Timestamp (UTC)".into(),
            },
            yaxis: AxisLayout {
                title: "Power (dB)".into(),
            },
            legend: Legend {
                orientation: "h".into(),
            },
        }
    }
}

// ── Tests ──
