use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "sdr_timelines";
const DEFAULT_PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.32.0.min.js";

/// Build settings. Sources, lowest precedence first: defaults, config file,
/// `SDR_*` environment variables. CLI flags are applied on top by `main`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub manifest: String,
    pub output: PathBuf,
    pub concurrency: usize,
    pub chart_target: String,
    pub user_agent: String,
    pub plotly_src: String,
}

impl Settings {
    /// `path` overrides the default `sdr_timelines.{toml,json,yaml}` lookup; an
    /// explicit path must exist, the default file is optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(p) => File::with_name(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let settings: Settings = Config::builder()
            .set_default("manifest", "timelines/manifest.json")?
            .set_default("output", "site/index.html")?
            .set_default("concurrency", 8)?
            .set_default("chart_target", "chart")?
            .set_default(
                "user_agent",
                concat!("sdr_timelines/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("plotly_src", DEFAULT_PLOTLY_SRC)?
            .add_source(file)
            .add_source(Environment::with_prefix("SDR").try_parsing(true))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        self.concurrency = self.concurrency.max(1);
        self
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "manifest = \"https://example.org/manifest.json\"\nconcurrency = 0\n",
        )
        .unwrap();

        let s = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(s.manifest, "https://example.org/manifest.json");
        assert_eq!(s.concurrency, 1);
        assert_eq!(s.chart_target, "chart");
        assert_eq!(s.output, PathBuf::from("site/index.html"));
        assert!(s.user_agent.starts_with("sdr_timelines/"));
    }

    #[test]
    fn explicit_file_must_exist() {
        assert!(Settings::load(Some("/nonexistent/sdr_timelines.toml")).is_err());
    }
}
