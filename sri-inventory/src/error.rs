use std::path::PathBuf;

use thiserror::Error;

/// Failures of the HTML adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HtmlError {
    #[error("document has no <html> element")]
    NoDocumentElement,
    #[error("unsupported selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse HTML in {}: {source}", path.display())]
    Html {
        path: PathBuf,
        #[source]
        source: HtmlError,
    },
    #[error("failed to serialize inventory: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no target directory given (pass --target=<dir> or set `target` in the config file)")]
    MissingTarget,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
    pub(crate) fn html(path: impl Into<PathBuf>, source: HtmlError) -> Self {
        Error::Html { path: path.into(), source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
