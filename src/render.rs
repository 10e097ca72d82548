use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::index::IndexView;
use crate::series::{Layout, Series};

/// Receives the combined chart: the `(target, series, layout)` rendering call.
pub trait ChartSink {
    fn render_chart(&mut self, target: &str, series: &[Series], layout: &Layout) -> Result<()>;
}

/// Receives the document index and user-visible error notices.
pub trait PresentationSink {
    fn show_index(&mut self, view: &IndexView);
    fn show_error(&mut self, message: &str);
}

struct Chart {
    target: String,
    series_json: String,
    layout_json: String,
}

/// Standalone dashboard page: Plotly chart, link grid, error banners.
pub struct HtmlPage {
    plotly_src: String,
    chart: Option<Chart>,
    index: Option<IndexView>,
    errors: Vec<String>,
    generated_at: DateTime<Utc>,
}

impl HtmlPage {
    pub fn new(plotly_src: &str) -> Self {
        Self {
            plotly_src: plotly_src.to_string(),
            chart: None,
            index: None,
            errors: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n");
        out.push_str("<title>SDR Timelines</title>\n");
        let _ = writeln!(
            out,
            "<script charset=\"utf-8\" src=\"{}\"></script>",
            escape_html(&self.plotly_src)
        );
        out.push_str("</head>\n<body>\n<h1>SDR Timelines</h1>\n");

        for error in &self.errors {
            let _ = writeln!(out, "<div class=\"error\" role=\"alert\">{}</div>", escape_html(error));
        }

        match &self.chart {
            Some(chart) => {
                let _ = writeln!(out, "<div id=\"{}\"></div>", escape_html(&chart.target));
                let _ = writeln!(
                    out,
                    "<script>\nPlotly.newPlot({}, {}, {});\n</script>",
                    script_json(&chart.target),
                    chart.series_json,
                    chart.layout_json
                );
            }
            None => out.push_str("<div id=\"chart\" class=\"empty\"></div>\n"),
        }

        out.push_str("<div id=\"timeline-grid\">\n");
        match &self.index {
            Some(IndexView::Links(entries)) => {
                for entry in entries {
                    let _ = writeln!(
                        out,
                        "<div class=\"timeline-item\"><a href=\"{}\" target=\"_blank\">{}</a></div>",
                        escape_html(&entry.target),
                        escape_html(&entry.label)
                    );
                }
            }
            Some(IndexView::Empty) | None => {
                let _ = writeln!(
                    out,
                    "<div class=\"timeline-empty\">{}</div>",
                    escape_html(IndexView::EMPTY_MESSAGE)
                );
            }
        }
        out.push_str("</div>\n");

        let _ = writeln!(
            out,
            "<footer>Generated {}</footer>",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        out.push_str("</body>\n</html>\n");
        out
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.to_html())
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl ChartSink for HtmlPage {
    fn render_chart(&mut self, target: &str, series: &[Series], layout: &Layout) -> Result<()> {
        self.chart = Some(Chart {
            target: target.to_string(),
            series_json: to_script_json(series)?,
            layout_json: to_script_json(layout)?,
        });
        Ok(())
    }
}

impl PresentationSink for HtmlPage {
    fn show_index(&mut self, view: &IndexView) {
        self.index = Some(view.clone());
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// JSON safe to inline in a `<script>` element.
fn to_script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).context("Failed to serialize chart data")?;
    Ok(json.replace("</", "<\\/"))
}

fn script_json(s: &str) -> String {
    to_script_json(s).unwrap_or_else(|_| "\"\"".into())
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::render_index;

    const PLOTLY: &str = "https://cdn.plot.ly/plotly-2.32.0.min.js";

    #[test]
    fn chart_and_links() {
        let mut page = HtmlPage::new(PLOTLY);
        let mut s = Series {
            name: Some("a_146MHz.html".into()),
            ..Default::default()
        };
        s.set_color("blue");
        page.render_chart("chart", &[s], &Layout::combined()).unwrap();
        page.show_index(&render_index(&["t/a_146MHz.html".to_string()]));

        let html = page.to_html();
        assert!(html.contains("<div id=\"chart\"></div>"));
        assert!(html.contains("Plotly.newPlot(\"chart\", [{"));
        assert!(html.contains("\"color\":\"blue\""));
        assert!(html.contains("Cumulative SDR Timeline (UTC)"));
        assert!(html.contains("<a href=\"t/a_146MHz.html\" target=\"_blank\">a_146MHz.html</a>"));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn script_close_tag_is_escaped() {
        let mut page = HtmlPage::new(PLOTLY);
        let s = Series {
            name: Some("</script><b>".into()),
            ..Default::default()
        };
        page.render_chart("chart", &[s], &Layout::combined()).unwrap();
        let html = page.to_html();
        assert!(html.contains("<\\/script><b>"));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn empty_index_and_errors_are_visible() {
        let mut page = HtmlPage::new(PLOTLY);
        page.show_index(&IndexView::Empty);
        page.show_error("could not load manifest");
        let html = page.to_html();
        assert!(html.contains(IndexView::EMPTY_MESSAGE));
        assert!(html.contains("<div class=\"error\" role=\"alert\">could not load manifest</div>"));
        assert!(!html.contains("Plotly.newPlot"));
    }

    #[test]
    fn label_is_escaped() {
        let mut page = HtmlPage::new(PLOTLY);
        page.show_index(&render_index(&["x/<odd>&.html".to_string()]));
        assert!(page.to_html().contains("&lt;odd&gt;&amp;.html"));
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site/index.html");
        HtmlPage::new(PLOTLY).write_to(&path).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
