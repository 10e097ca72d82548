use thiserror::Error;

/// Transport-level failure fetching one reference (manifest or document).
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid reference {reference}: {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("not found: {0}")]
    NotFound(String),
}

/// Why one document produced no series. Never fatal to a batch.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("fetch-error: {document}: {source}")]
    Fetch {
        document: String,
        #[source]
        source: FetchError,
    },

    #[error("no-parsable-chart: {document}")]
    NoParsableChart { document: String },
}

impl ExtractError {
    /// Stable reason code, used in logs.
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractError::Fetch { .. } => "fetch-error",
            ExtractError::NoParsableChart { .. } => "no-parsable-chart",
        }
    }

    pub fn document(&self) -> &str {
        match self {
            ExtractError::Fetch { document, .. } | ExtractError::NoParsableChart { document } => {
                document
            }
        }
    }
}

/// The manifest could not be fetched or is not a JSON array of strings.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("could not load manifest {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: FetchError,
    },

    #[error("could not load manifest {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    pub const USER_MESSAGE: &'static str = "could not load manifest";
}
