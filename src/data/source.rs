//! Forecast page sources.
//!
//! The pipeline only needs raw HTML for a source identifier; where it comes
//! from is behind `ForecastSource`:
//! - `HttpSource`: the live page over blocking HTTP
//! - `LocalSource`: `<dir>/<id>.html` files (offline runs, fixtures)

use std::path::PathBuf;

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use tracing::debug;

use crate::domain::FetchConfig;
use crate::error::ForecastError;

/// Something that can hand back the forecast page for a source identifier.
pub trait ForecastSource {
    fn fetch_html(&self, source_id: &str) -> Result<String, ForecastError>;
}

impl<S: ForecastSource + ?Sized> ForecastSource for &S {
    fn fetch_html(&self, source_id: &str) -> Result<String, ForecastError> {
        (**self).fetch_html(source_id)
    }
}

impl<S: ForecastSource + ?Sized> ForecastSource for Box<S> {
    fn fetch_html(&self, source_id: &str) -> Result<String, ForecastError> {
        (**self).fetch_html(source_id)
    }
}

pub struct HttpSource {
    client: Client,
    config: FetchConfig,
}

impl HttpSource {
    pub fn new(config: FetchConfig) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ForecastError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, ForecastError> {
        Self::new(FetchConfig::from_env())
    }
}

impl ForecastSource for HttpSource {
    fn fetch_html(&self, source_id: &str) -> Result<String, ForecastError> {
        let url = self.config.url_for(source_id);
        debug!(%url, "fetching forecast page");

        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .map_err(|e| ForecastError::Fetch(format!("request to {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(ForecastError::Fetch(format!(
                "request to {url} failed with status {}",
                resp.status()
            )));
        }

        // The page is UTF-8 whatever the response headers claim.
        let body = resp
            .bytes()
            .map_err(|e| ForecastError::Fetch(format!("failed to read body from {url}: {e}")))?;
        debug!(bytes = body.len(), "received forecast page");
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Reads `<dir>/<source_id>.html`.
#[derive(Debug, Clone)]
pub struct LocalSource {
    dir: PathBuf,
}

impl LocalSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, source_id: &str) -> PathBuf {
        self.dir.join(format!("{source_id}.html"))
    }
}

impl ForecastSource for LocalSource {
    fn fetch_html(&self, source_id: &str) -> Result<String, ForecastError> {
        let path = self.path_for(source_id);
        debug!(path = %path.display(), "reading forecast page");
        std::fs::read_to_string(&path)
            .map_err(|e| ForecastError::Fetch(format!("failed to read '{}': {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_source_reads_page_by_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("101010100.html"), "<html>ok</html>").unwrap();
        let source = LocalSource::new(dir.path());
        assert_eq!(source.fetch_html("101010100").unwrap(), "<html>ok</html>");
    }

    #[test]
    fn local_source_missing_file_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalSource::new(dir.path());
        assert!(matches!(source.fetch_html("404"), Err(ForecastError::Fetch(_))));
    }

    #[test]
    fn http_source_builds_from_default_config() {
        assert!(HttpSource::new(FetchConfig::default()).is_ok());
    }
}
