//! Getting deck source text in, and turning it into records.

use std::path::Path;

use slidemark::RawSlideRecord;
use slidemark::parser::Parser;
use tracing::{debug, warn};

use crate::error::{LoadError, SourceLoadError};

/// Fetch deck source over HTTP. Any non-success status is an error.
pub async fn fetch_source(client: &reqwest::Client, url: &str) -> Result<String, SourceLoadError> {
    debug!(url, "fetching deck source");
    let transport = |source| SourceLoadError::Transport {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceLoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(transport)
}

pub fn read_source(path: &Path) -> Result<String, SourceLoadError> {
    std::fs::read_to_string(path).map_err(|source| SourceLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse source text into records. Warnings are logged, errors fail the load.
pub fn parse_source(text: &str) -> Result<Vec<RawSlideRecord>, LoadError> {
    let parsed = Parser::new(text, 0).parse().map_err(LoadError::Parse)?;
    for warning in &parsed.warnings {
        warn!(message = %warning.message, span = ?warning.span, "deck source warning");
    }
    Ok(parsed.records)
}

pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Fetch `location` if it is an http(s) URL, otherwise read it as a path.
pub async fn read_location(location: &str) -> Result<String, SourceLoadError> {
    if is_url(location) {
        fetch_source(&reqwest::Client::new(), location).await
    } else {
        read_source(Path::new(location))
    }
}
