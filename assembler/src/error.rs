use std::path::PathBuf;

use slidemark::parser::ParseError;
use thiserror::Error;

/// The deck source could not be obtained.
#[derive(Debug, Error)]
pub enum SourceLoadError {
    #[error("failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A reload failed; the previously installed deck is untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceLoadError),

    #[error("deck source has {} parse error(s)", .0.len())]
    Parse(Vec<ParseError>),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read options file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid options: {0}")]
    Toml(#[from] toml::de::Error),
}
