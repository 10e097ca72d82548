use std::sync::LazyLock;

use regex::Regex;

use super::call_args::CALL_RE;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").unwrap());

/// Markers of the plotting environment in a figure-carrying script.
const ENV_MARKERS: [&str; 3] = ["PLOTLYENV", "Plotly", "plotly"];

/// Find the script block holding the chart.
///
/// Prefers a block with a rendering call; otherwise a block that embeds a
/// `data`/`layout` figure next to a plotting-environment marker. A document
/// with no `<script>` tags at all is treated as bare script text.
pub fn locate_chart_script(document: &str) -> Option<&str> {
    let blocks: Vec<&str> = SCRIPT_RE
        .captures_iter(document)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();

    if blocks.is_empty() {
        return is_chart_script(document).then_some(document);
    }

    blocks
        .iter()
        .copied()
        .find(|b| has_render_call(b))
        .or_else(|| blocks.iter().copied().find(|b| has_embedded_figure(b)))
}

fn is_chart_script(text: &str) -> bool {
    has_render_call(text) || has_embedded_figure(text)
}

fn has_render_call(text: &str) -> bool {
    CALL_RE.is_match(text)
}

fn has_embedded_figure(text: &str) -> bool {
    text.contains("\"data\"")
        && text.contains("\"layout\"")
        && ENV_MARKERS.iter().any(|m| text.contains(m))
}

// ── Tests ──
