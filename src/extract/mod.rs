pub mod call_args;
pub mod figure;
pub mod script;
pub mod strategy;

use serde_json::Value;
use tracing::debug;

use crate::error::ExtractError;
use crate::fetch::DocumentFetcher;
use crate::series::Series;
use strategy::{ExtractionStrategy, Figure};

/// Series and layout recovered from one exported chart document.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub source: String,
    pub series: Vec<Series>,
    /// The document's own layout. Kept for inspection; the combined view ignores it.
    pub layout: Value,
    pub strategy: &'static str,
}

/// Strategies in precedence order: call arguments, then embedded figure.
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(call_args::CallArguments),
        Box::new(figure::EmbeddedFigure),
    ]
}

/// Fetch and extract one document. Each reference is fetched exactly once.
pub async fn extract(
    fetcher: &dyn DocumentFetcher,
    reference: &str,
) -> Result<Extraction, ExtractError> {
    let text = fetcher
        .fetch_text(reference)
        .await
        .map_err(|source| ExtractError::Fetch {
            document: reference.to_string(),
            source,
        })?;
    extract_document(reference, &text, &default_strategies())
}

/// Extract from already-fetched document text.
pub fn extract_document(
    reference: &str,
    text: &str,
    strategies: &[Box<dyn ExtractionStrategy>],
) -> Result<Extraction, ExtractError> {
    let no_chart = || ExtractError::NoParsableChart {
        document: reference.to_string(),
    };

    let script = script::locate_chart_script(text).ok_or_else(no_chart)?;
    let Figure {
        strategy,
        series,
        layout,
    } = strategy::first_match(strategies, script).ok_or_else(no_chart)?;

    debug!(
        "{}: {} series via {}",
        reference,
        series.len(),
        strategy
    );
    Ok(Extraction {
        source: reference.to_string(),
        series,
        layout,
        strategy,
    })
}

// ── Tests ──
