use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::band::{classify, Band};
use crate::error::{ExtractError, FetchError};
use crate::extract::{self, Extraction};
use crate::fetch::DocumentFetcher;
use crate::frequency::infer_frequency;
use crate::index::display_label;
use crate::series::{Layout, Series};

/// Outcome of aggregating every document in the manifest.
#[derive(Debug, Clone)]
pub enum CombinedView {
    Ready { series: Vec<Series>, layout: Layout },
    /// Not one series survived. Must be shown as an error, never as a blank chart.
    NoData,
}

impl CombinedView {
    pub fn series(&self) -> &[Series] {
        match self {
            CombinedView::Ready { series, .. } => series,
            CombinedView::NoData => &[],
        }
    }
}

/// Per-run counters, printed after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub documents: usize,
    pub ok: usize,
    pub fetch_errors: usize,
    pub parse_errors: usize,
    pub series: usize,
}

impl AggregateStats {
    pub fn failed(&self) -> usize {
        self.fetch_errors + self.parse_errors
    }
}

pub struct AggregateOptions {
    pub concurrency: usize,
    pub progress: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            progress: false,
        }
    }
}

/// Fetch, extract, label and concatenate every document, in manifest order.
pub async fn build_combined_view(
    fetcher: Arc<dyn DocumentFetcher>,
    documents: &[String],
    options: &AggregateOptions,
) -> (CombinedView, AggregateStats) {
    let mut stats = AggregateStats {
        documents: documents.len(),
        ..Default::default()
    };

    // Phase 1: fetch concurrently, reassembled in manifest order
    let fetched = fetch_all(fetcher, documents, options).await;

    // Phase 2: extract in parallel; par_iter keeps input order
    let strategies = extract::default_strategies();
    let extractions: Vec<Result<Extraction, ExtractError>> = documents
        .par_iter()
        .zip(fetched.into_par_iter())
        .map(|(reference, text)| match text {
            Ok(text) => extract::extract_document(reference, &text, &strategies),
            Err(source) => Err(ExtractError::Fetch {
                document: reference.clone(),
                source,
            }),
        })
        .collect();

    // Phase 3: label each document's series, then append as a whole
    let mut combined = Vec::new();
    for result in extractions {
        match result {
            Ok(extraction) => {
                stats.ok += 1;
                combined.extend(label_series(extraction));
            }
            Err(e) => {
                match e {
                    ExtractError::Fetch { .. } => stats.fetch_errors += 1,
                    ExtractError::NoParsableChart { .. } => stats.parse_errors += 1,
                }
                warn!("Skipping {} ({}): {}", e.document(), e.reason(), e);
            }
        }
    }
    stats.series = combined.len();

    info!(
        "Aggregated {} series from {}/{} documents ({} fetch errors, {} parse errors)",
        stats.series, stats.ok, stats.documents, stats.fetch_errors, stats.parse_errors
    );

    let view = if combined.is_empty() {
        CombinedView::NoData
    } else {
        CombinedView::Ready {
            series: combined,
            layout: Layout::combined(),
        }
    };
    (view, stats)
}

/// Rename every series after its source document and color it by band.
pub fn label_series(extraction: Extraction) -> Vec<Series> {
    let name = display_label(&extraction.source).to_string();
    extraction
        .series
        .into_iter()
        .map(|mut series| {
            series.set_name(&name);
            let band = band_of(&series);
            series.set_color(band.color());
            series
        })
        .collect()
}

pub fn band_of(series: &Series) -> Band {
    classify(infer_frequency(
        series.display_name(),
        series.auxiliary_values(),
    ))
}

async fn fetch_all(
    fetcher: Arc<dyn DocumentFetcher>,
    documents: &[String],
    options: &AggregateOptions,
) -> Vec<Result<String, FetchError>> {
    let total = documents.len();
    let concurrency = options.concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let pb = if options.progress {
        ProgressBar::new(total as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    // Channel: workers send (index, outcome), the loop below puts them back in order
    let (tx, mut rx) =
        tokio::sync::mpsc::channel::<(usize, Result<String, FetchError>)>(concurrency * 2);

    for (idx, reference) in documents.iter().cloned().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let outcome = match sem.acquire_owned().await {
                Ok(_permit) => fetcher.fetch_text(&reference).await,
                Err(_) => Err(FetchError::NotFound(reference)),
            };
            let _ = tx.send((idx, outcome)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut slots: Vec<Option<Result<String, FetchError>>> = (0..total).map(|_| None).collect();
    while let Some((idx, outcome)) = rx.recv().await {
        slots[idx] = Some(outcome);
        pb.inc(1);
    }
    pb.finish_and_clear();

    slots
        .into_iter()
        .zip(documents)
        .map(|(slot, reference)| {
            // A task that died before reporting counts as a failed fetch.
            slot.unwrap_or_else(|| Err(FetchError::NotFound(reference.clone())))
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::StubFetcher;

    const TWO_SERIES: &str = r#"<script>Plotly.newPlot("c",
        [{"name": "a", "y": [1, 2], "customdata": [300000000]},
         {"name": "b", "y": [3, 4]}],
        {"title": "ignored"});</script>"#;

    fn docs(refs: &[&str]) -> Vec<String> {
        refs.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn partial_failure_keeps_good_document() {
        let fetcher = StubFetcher::default()
            .with("t/garbage.html", "<p>nothing here</p>")
            .with("t/good.html", TWO_SERIES);
        let refs = docs(&["t/missing.html", "t/garbage.html", "t/good.html"]);

        let (view, stats) =
            build_combined_view(Arc::new(fetcher), &refs, &AggregateOptions::default()).await;

        let CombinedView::Ready { series, layout } = view else {
            panic!("expected Ready");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].y, serde_json::json!([1, 2]));
        assert_eq!(series[1].y, serde_json::json!([3, 4]));
        assert!(series.iter().all(|s| s.display_name() == "good.html"));
        assert_eq!(layout, Layout::combined());
        assert_eq!(
            stats,
            AggregateStats {
                documents: 3,
                ok: 1,
                fetch_errors: 1,
                parse_errors: 1,
                series: 2,
            }
        );
    }

    #[tokio::test]
    async fn colors_follow_band() {
        let fetcher = StubFetcher::default().with("good.html", TWO_SERIES);
        let (view, _) = build_combined_view(
            Arc::new(fetcher),
            &docs(&["good.html"]),
            &AggregateOptions::default(),
        )
        .await;
        let series = view.series();
        // 300 MHz via customdata is UHF; the second series has nothing to go on.
        assert_eq!(series[0].color(), Some("red"));
        assert_eq!(series[1].color(), Some("gray"));
    }

    #[tokio::test]
    async fn frequency_read_from_document_name() {
        let fetcher = StubFetcher::default().with("logs/scan_50MHz.html", TWO_SERIES);
        let (view, _) = build_combined_view(
            Arc::new(fetcher),
            &docs(&["logs/scan_50MHz.html"]),
            &AggregateOptions::default(),
        )
        .await;
        // Name wins over customdata: both are VHF.
        assert!(view.series().iter().all(|s| s.color() == Some("blue")));
    }

    #[tokio::test]
    async fn order_is_manifest_order() {
        let mut fetcher = StubFetcher::default();
        let mut refs = Vec::new();
        for i in 0..20 {
            let name = format!("doc{i:02}.html");
            let html = format!(r#"<script>Plotly.newPlot("c", [{{"y": [{i}]}}], {{}});</script>"#);
            fetcher = fetcher.with(&name, &html);
            refs.push(name);
        }
        let options = AggregateOptions {
            concurrency: 3,
            progress: false,
        };
        let (view, stats) = build_combined_view(Arc::new(fetcher), &refs, &options).await;
        let names: Vec<&str> = view.series().iter().map(|s| s.display_name()).collect();
        let expected: Vec<&str> = refs.iter().map(String::as_str).collect();
        assert_eq!(names, expected);
        assert_eq!(stats.ok, 20);
    }

    #[tokio::test]
    async fn typed_array_traces_are_kept() {
        let html = std::fs::read_to_string("tests/fixtures/typed_arrays_433.92MHz.html").unwrap();
        let fetcher = StubFetcher::default().with("t/typed_arrays_433.92MHz.html", &html);
        let (view, stats) = build_combined_view(
            Arc::new(fetcher),
            &docs(&["t/typed_arrays_433.92MHz.html"]),
            &AggregateOptions::default(),
        )
        .await;
        assert_eq!(stats.ok, 1);
        let series = view.series();
        assert_eq!(series.len(), 2);
        assert!(series
            .iter()
            .all(|s| s.display_name() == "typed_arrays_433.92MHz.html"));
        // 433.92 MHz lies between UHF and Secure.
        assert!(series.iter().all(|s| s.color() == Some("gray")));
        assert!(series[1].x.is_object());
    }

    #[tokio::test]
    async fn nothing_usable_is_no_data() {
        let fetcher = StubFetcher::default().with("bad.html", "<html></html>");
        let (view, stats) = build_combined_view(
            Arc::new(fetcher),
            &docs(&["bad.html", "gone.html"]),
            &AggregateOptions::default(),
        )
        .await;
        assert!(matches!(view, CombinedView::NoData));
        assert_eq!(stats.failed(), 2);
    }

    #[tokio::test]
    async fn empty_manifest_is_no_data() {
        let (view, stats) =
            build_combined_view(Arc::new(StubFetcher::default()), &[], &AggregateOptions::default())
                .await;
        assert!(matches!(view, CombinedView::NoData));
        assert_eq!(stats.documents, 0);
    }

    #[tokio::test]
    async fn document_with_zero_traces_is_no_data() {
        let fetcher = StubFetcher::default()
            .with("empty.html", r#"<script>Plotly.newPlot("c", [], {});</script>"#);
        let (view, stats) = build_combined_view(
            Arc::new(fetcher),
            &docs(&["empty.html"]),
            &AggregateOptions::default(),
        )
        .await;
        assert!(matches!(view, CombinedView::NoData));
        assert_eq!(stats.ok, 1);
    }

    #[test]
    fn label_renames_and_colors() {
        let extraction = Extraction {
            source: "https://host/t/uhf_243MHz.html".into(),
            series: vec![Series::default(), Series::default()],
            layout: serde_json::Value::Null,
            strategy: "test",
        };
        let labelled = label_series(extraction);
        assert_eq!(labelled.len(), 2);
        for s in &labelled {
            assert_eq!(s.display_name(), "uhf_243MHz.html");
            assert_eq!(s.color(), Some(Band::Uhf.color()));
        }
    }

    #[test]
    fn label_ignores_query_and_fragment() {
        let extraction = Extraction {
            source: "https://host/t/vhf_50MHz.html?rev=3#plot".into(),
            series: vec![Series::default()],
            layout: serde_json::Value::Null,
            strategy: "test",
        };
        let labelled = label_series(extraction);
        assert_eq!(labelled[0].display_name(), "vhf_50MHz.html");
        assert_eq!(labelled[0].color(), Some(Band::Vhf.color()));
    }
}
