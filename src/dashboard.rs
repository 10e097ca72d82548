use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use crate::aggregate::{build_combined_view, AggregateOptions, AggregateStats, CombinedView};
use crate::error::ManifestError;
use crate::fetch::{load_manifest, DocumentFetcher};
use crate::index::render_index;
use crate::render::{ChartSink, PresentationSink};

pub const NO_DATA_MESSAGE: &str = "No chart data could be recovered from the listed timelines.";

/// What a dashboard build produced, for the CLI summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub manifest_loaded: bool,
    pub chart_rendered: bool,
    pub stats: AggregateStats,
}

/// Manifest → index → combined view → sinks.
///
/// Nothing here is fatal to the build: an unreadable manifest becomes an empty
/// document list, a failed aggregate becomes a visible error. Only sink
/// failures propagate.
pub async fn build_dashboard<S>(
    fetcher: Arc<dyn DocumentFetcher>,
    manifest: &str,
    chart_target: &str,
    options: &AggregateOptions,
    sink: &mut S,
) -> Result<BuildReport>
where
    S: ChartSink + PresentationSink,
{
    let (documents, manifest_loaded) = match load_manifest(fetcher.as_ref(), manifest).await {
        Ok(docs) => (docs, true),
        Err(e) => {
            error!("{}", e);
            sink.show_error(ManifestError::USER_MESSAGE);
            (Vec::new(), false)
        }
    };

    sink.show_index(&render_index(&documents));

    let (view, stats) = build_combined_view(fetcher, &documents, options).await;
    let chart_rendered = match view {
        CombinedView::Ready { series, layout } => {
            sink.render_chart(chart_target, &series, &layout)?;
            true
        }
        CombinedView::NoData => {
            // An unreadable manifest already has its own banner.
            if manifest_loaded {
                error!("No usable series in {} documents", documents.len());
                sink.show_error(NO_DATA_MESSAGE);
            }
            false
        }
    };

    info!(
        "Dashboard: {} documents, {} series, chart rendered: {}",
        stats.documents, stats.series, chart_rendered
    );
    Ok(BuildReport {
        manifest_loaded,
        chart_rendered,
        stats,
    })
}

// ── Tests ──
