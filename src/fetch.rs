use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info};

use crate::error::{FetchError, ManifestError};

/// Capability to retrieve the text behind a document or manifest reference.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch_text(&self, reference: &str) -> Result<String, FetchError>;
}

/// Where relative references are resolved from.
#[derive(Debug, Clone)]
enum Base {
    Url(Url),
    Dir(PathBuf),
}

/// Fetches `http(s)://` references with reqwest and everything else from disk.
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Option<Base>,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|source| FetchError::Http {
                url: "(client)".into(),
                source,
            })?;
        Ok(Self { client, base: None })
    }

    /// Resolve relative references against the location of `manifest`,
    /// the way a browser resolves links relative to the page that lists them.
    /// `manifest` should already be absolute (see `absolute_reference`).
    pub fn relative_to(mut self, manifest: &str) -> Self {
        self.base = if is_remote(manifest) {
            Url::parse(manifest).ok().map(Base::Url)
        } else {
            Path::new(manifest).parent().map(|p| Base::Dir(p.to_path_buf()))
        };
        self
    }

    fn resolve(&self, reference: &str) -> Result<Target, FetchError> {
        if is_remote(reference) {
            let url = Url::parse(reference).map_err(|e| FetchError::InvalidReference {
                reference: reference.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(Target::Remote(url));
        }
        match &self.base {
            Some(Base::Url(base)) => base
                .join(reference)
                .map(Target::Remote)
                .map_err(|e| FetchError::InvalidReference {
                    reference: reference.to_string(),
                    reason: e.to_string(),
                }),
            Some(Base::Dir(dir)) if Path::new(reference).is_relative() => {
                Ok(Target::Local(dir.join(reference)))
            }
            _ => Ok(Target::Local(PathBuf::from(reference))),
        }
    }
}

enum Target {
    Remote(Url),
    Local(PathBuf),
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch_text(&self, reference: &str) -> Result<String, FetchError> {
        match self.resolve(reference)? {
            Target::Remote(url) => {
                debug!("GET {}", url);
                let http_err = |source| FetchError::Http {
                    url: url.to_string(),
                    source,
                };
                self.client
                    .get(url.clone())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(http_err)?
                    .text()
                    .await
                    .map_err(http_err)
            }
            Target::Local(path) => {
                debug!("read {}", path.display());
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            }
        }
    }
}

/// Absolute form of a manifest location, so documents it lists can be resolved
/// against it and it still resolves to itself.
pub fn absolute_reference(reference: &str) -> String {
    if is_remote(reference) {
        return reference.to_string();
    }
    std::path::absolute(reference)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| reference.to_string())
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Load the ordered list of document references from a JSON array of strings.
pub async fn load_manifest(
    fetcher: &dyn DocumentFetcher,
    location: &str,
) -> Result<Vec<String>, ManifestError> {
    info!("Fetching manifest: {}", location);
    let text = fetcher
        .fetch_text(location)
        .await
        .map_err(|source| ManifestError::Fetch {
            location: location.to_string(),
            source,
        })?;
    let documents = parse_manifest(&text).map_err(|source| ManifestError::Parse {
        location: location.to_string(),
        source,
    })?;
    info!("Manifest lists {} documents", documents.len());
    Ok(documents)
}

pub fn parse_manifest(text: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(text)
}

// ── Tests ──
