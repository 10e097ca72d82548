use std::sync::LazyLock;

use regex::Regex;

use super::strategy::{parse_leading_value, ExtractionStrategy, RawFigure};

/// A `newPlot`/`react` rendering call up to its opening parenthesis.
pub(super) static CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Plotly\s*\.\s*(?:newPlot|react)\s*\(").unwrap());

/// `Plotly.newPlot(<target>, <data>, <layout>, ...)`: data and layout are read
/// as JSON straight out of the call's argument list.
pub struct CallArguments;

impl ExtractionStrategy for CallArguments {
    fn name(&self) -> &'static str {
        "call-arguments"
    }

    fn try_extract(&self, script: &str) -> Option<RawFigure> {
        CALL_RE
            .find_iter(script)
            .find_map(|m| parse_call(&script[m.end()..]))
            .filter(RawFigure::is_usable)
    }
}

/// `args` starts right after the call's opening parenthesis.
fn parse_call(args: &str) -> Option<RawFigure> {
    let rest = skip_argument(args)?;
    let (data, rest) = parse_leading_value(rest)?;
    let rest = rest.trim_start().strip_prefix(',')?;
    let (layout, _) = parse_leading_value(rest)?;
    Some(RawFigure { data, layout })
}

/// Skip one JavaScript argument expression and its trailing comma.
///
/// The target is usually a string literal or `document.getElementById(...)`;
/// brackets and string literals are balanced so commas inside them don't count.
fn skip_argument(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                // Closing the call itself: fewer than two arguments.
                depth = depth.checked_sub(1)?;
            }
            ',' if depth == 0 => return Some(&text[i + 1..]),
            _ => {}
        }
    }
    None
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(script: &str) -> Option<RawFigure> {
        CallArguments.try_extract(script)
    }

    #[test]
    fn exported_call_with_config() {
        let script = r#"
            window.PLOTLYENV=window.PLOTLYENV || {};
            if (document.getElementById("8f2c")) {
                Plotly.newPlot(                        "8f2c",                        [{"name":"power","x":[1,2],"y":[-70,-68],"type":"scatter"}],                        {"title":{"text":"146.52 MHz"}},                        {"responsive": true}                    )
            };"#;
        let fig = run(script).unwrap();
        assert_eq!(fig.data[0]["name"], "power");
        assert_eq!(fig.layout["title"]["text"], "146.52 MHz");
    }

    #[test]
    fn element_lookup_target() {
        let script = r#"Plotly.react(document.getElementById('chart, main'), [{"y":[1]}], {});"#;
        let fig = run(script).unwrap();
        assert_eq!(fig.data, json!([{"y": [1]}]));
    }

    #[test]
    fn malformed_data_is_no_match() {
        assert!(run(r#"Plotly.newPlot("c", [{"y": [1,}], {});"#).is_none());
        assert!(run(r#"Plotly.newPlot("c", traces, layout);"#).is_none());
    }

    #[test]
    fn missing_layout_is_no_match() {
        assert!(run(r#"Plotly.newPlot("c", [{"y": [1]}]);"#).is_none());
        assert!(run(r#"Plotly.newPlot("c");"#).is_none());
    }

    #[test]
    fn null_layout_is_no_match() {
        assert!(run(r#"Plotly.newPlot("c", [], null);"#).is_none());
    }

    #[test]
    fn later_call_can_match() {
        let script = r#"Plotly.newPlot("a", data, layout);
Plotly.react("b", [{"y": [2]}], {"height": 300});"#;
        let fig = run(script).unwrap();
        assert_eq!(fig.layout["height"], 300);
    }

    #[test]
    fn skip_handles_escapes() {
        assert_eq!(skip_argument(r#""a\",b", rest"#), Some(" rest"));
        assert_eq!(skip_argument("f(1, 2), rest"), Some(" rest"));
        assert_eq!(skip_argument("x)"), None);
    }
}
