//! Remote resource retrieval.
//!
//! Both the document schema and the locale attribute bundles are fetched
//! through [`Fetcher`], so callers (and tests) can swap the HTTP client for
//! fixed fixtures.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use adpt_shared::{AdptError, RemoteConfig, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User-Agent string for outgoing requests.
const USER_AGENT: &str = concat!("adpt/", env!("CARGO_PKG_VERSION"));

/// Retrieves the text body behind a URL.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// [`Fetcher`] backed by a `reqwest` client. No retries, no caching.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| AdptError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Build a fetcher from the `[remote]` config section.
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        Self::new(Duration::from_secs(config.timeout_secs))
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AdptError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdptError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AdptError::Network(format!("{url}: failed to read body: {e}")))?;

        debug!(bytes = body.len(), "fetched");
        Ok(body)
    }
}

/// In-memory [`Fetcher`] serving the workspace fixtures.
#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::HashMap;

    use adpt_shared::{AdptError, DEFAULT_SCHEMA_URL, Result};

    use super::Fetcher;

    pub(crate) const EN_LOCALE_URL: &str = "https://raw.githubusercontent.com/asciidoctor/asciidoctor/master/data/locale/attributes-en.adoc";

    #[derive(Debug, Default)]
    pub(crate) struct FixtureFetcher {
        bodies: HashMap<String, String>,
    }

    impl FixtureFetcher {
        /// Schema and English locale bundle at their default URLs.
        pub(crate) fn standard() -> Self {
            let schema = std::fs::read_to_string("../../../fixtures/schema/document.schema.json")
                .expect("read schema fixture");
            let locale = std::fs::read_to_string("../../../fixtures/locale/attributes-en.adoc")
                .expect("read locale fixture");
            Self::default()
                .with(DEFAULT_SCHEMA_URL, schema)
                .with(EN_LOCALE_URL, locale)
        }

        pub(crate) fn with(mut self, url: &str, body: impl Into<String>) -> Self {
            self.bodies.insert(url.to_string(), body.into());
            self
        }
    }

    impl Fetcher for FixtureFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| AdptError::Network(format!("{url}: HTTP 404 Not Found")))
        }
    }
}
