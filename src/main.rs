mod aggregate;
mod band;
mod dashboard;
mod error;
mod extract;
mod fetch;
mod frequency;
mod index;
mod render;
mod series;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::aggregate::{band_of, AggregateOptions};
use crate::fetch::HttpFetcher;
use crate::index::IndexView;
use crate::render::HtmlPage;
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "sdr_timelines",
    about = "Combine exported SDR timeline charts into one dashboard"
)]
struct Cli {
    /// Config file (default: ./sdr_timelines.toml if present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every listed timeline, combine the charts, write the dashboard page
    Build {
        /// Manifest: JSON array of timeline document references
        #[arg(short, long)]
        manifest: Option<String>,
        /// Output HTML file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Concurrent document fetches
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
    /// List the timeline documents named in the manifest
    Index {
        #[arg(short, long)]
        manifest: Option<String>,
    },
    /// Extract one document and show its series with inferred bands
    Extract {
        /// Document URL or path
        document: String,
    },
    /// Show the band for a frequency in Hz
    Classify { hz: f64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Build {
            manifest,
            output,
            concurrency,
            quiet,
        } => {
            if let Some(m) = manifest {
                settings.manifest = m;
            }
            if let Some(o) = output {
                settings.output = o;
            }
            if let Some(n) = concurrency {
                settings.concurrency = n.max(1);
            }

            let manifest = fetch::absolute_reference(&settings.manifest);
            let fetcher = HttpFetcher::new(&settings.user_agent)?.relative_to(&manifest);
            let options = AggregateOptions {
                concurrency: settings.concurrency,
                progress: !quiet,
            };
            let mut page = HtmlPage::new(&settings.plotly_src);
            let report = dashboard::build_dashboard(
                Arc::new(fetcher),
                &manifest,
                &settings.chart_target,
                &options,
                &mut page,
            )
            .await?;
            page.write_to(&settings.output)?;

            let s = report.stats;
            println!(
                "Combined {} series from {} documents ({} ok, {} failed).",
                s.series,
                s.documents,
                s.ok,
                s.failed()
            );
            for e in page.errors() {
                println!("Error: {}", e);
            }
            println!("Wrote {}", settings.output.display());
            Ok(())
        }
        Commands::Index { manifest } => {
            let manifest = manifest.unwrap_or(settings.manifest);
            let fetcher = HttpFetcher::new(&settings.user_agent)?;
            let documents = match fetch::load_manifest(&fetcher, &manifest).await {
                Ok(docs) => docs,
                Err(e) => {
                    tracing::error!("{}", e);
                    println!("Error: {}", error::ManifestError::USER_MESSAGE);
                    Vec::new()
                }
            };
            match index::render_index(&documents) {
                IndexView::Empty => println!("{}", IndexView::EMPTY_MESSAGE),
                IndexView::Links(entries) => {
                    println!("{:>3} | {:<40} | {}", "#", "Document", "Link");
                    println!("{}", "-".repeat(80));
                    for (i, entry) in entries.iter().enumerate() {
                        println!(
                            "{:>3} | {:<40} | {}",
                            i + 1,
                            truncate(&entry.label, 40),
                            entry.target
                        );
                    }
                    println!("\n{} documents", entries.len());
                }
            }
            Ok(())
        }
        Commands::Extract { document } => {
            let fetcher = HttpFetcher::new(&settings.user_agent)?;
            let extraction = extract::extract(&fetcher, &document)
                .await
                .with_context(|| format!("Extraction failed for {}", document))?;
            println!(
                "{}: {} series via {}",
                extraction.source,
                extraction.series.len(),
                extraction.strategy
            );
            if let Some(title) = extraction.layout.get("title") {
                println!("Document title: {}", title);
            }
            let labelled = aggregate::label_series(extraction);
            println!(
                "{:>3} | {:<32} | {:>6} | {:<12} | {}",
                "#", "Name", "Points", "Band", "Color"
            );
            println!("{}", "-".repeat(72));
            for (i, s) in labelled.iter().enumerate() {
                let band = band_of(s);
                println!(
                    "{:>3} | {:<32} | {:>6} | {:<12} | {}",
                    i + 1,
                    truncate(s.display_name(), 32),
                    s.point_count()
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".into()),
                    band,
                    s.color().unwrap_or("-")
                );
            }
            Ok(())
        }
        Commands::Classify { hz } => {
            let band = band::classify(Some(hz));
            match band.range() {
                Some((lo, hi)) => println!(
                    "{} Hz -> {} ({:.0}-{:.0} Hz, {})",
                    hz,
                    band,
                    lo,
                    hi,
                    band.color()
                ),
                None => println!("{} Hz -> {} ({})", hz, band, band.color()),
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
