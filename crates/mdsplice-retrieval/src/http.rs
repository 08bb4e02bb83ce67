//! HTTP retrieval with bounded retries.

use std::path::Path;
use std::time::Duration;

use ureq::Agent;
use url::Url;

use crate::{ContentRetriever, RetrievalError, cache, split_lines};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of fetch attempts before giving up.
const DEFAULT_ATTEMPTS: usize = 3;

/// Retriever for `http://` and `https://` locators.
///
/// Fetches with GET through a pooled [`Agent`]. Transient failures are
/// retried up to the configured attempt count; the final error carries the
/// attempt count and the last failure reason. When a cache directory is
/// supplied, response bodies are served from and stored to disk.
#[derive(Debug)]
pub struct HttpRetriever {
    agent: Agent,
    attempts: usize,
}

impl Default for HttpRetriever {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}

impl HttpRetriever {
    /// Create a retriever with the default timeout and retry policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a retriever with the given global timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            attempts: DEFAULT_ATTEMPTS,
        }
    }

    /// Set the number of fetch attempts (minimum 1).
    #[must_use]
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Fetch the body, retrying transient failures.
    fn fetch(&self, url: &Url) -> Result<String, RetrievalError> {
        let mut last_reason = String::new();
        for attempt in 1..=self.attempts {
            match self.try_fetch(url) {
                Ok(body) => return Ok(body),
                Err(reason) => {
                    if attempt < self.attempts {
                        tracing::warn!(url = %url, attempt, reason = %reason, "fetch failed, retrying");
                    }
                    last_reason = reason;
                }
            }
        }
        Err(RetrievalError::Http {
            url: url.clone(),
            attempts: self.attempts,
            reason: last_reason,
        })
    }

    /// One GET attempt. Error responses are read for their body so the
    /// failure reason is descriptive.
    fn try_fetch(&self, url: &Url) -> Result<String, String> {
        let response = self
            .agent
            .get(url.as_str())
            .call()
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(format!("HTTP {status}: {error_body}"));
        }

        body.read_to_string().map_err(|e| e.to_string())
    }
}

impl ContentRetriever for HttpRetriever {
    fn get_content(
        &self,
        source: &Url,
        cache_dir: Option<&Path>,
    ) -> Result<Vec<String>, RetrievalError> {
        if let Some(dir) = cache_dir {
            if let Some(body) = cache::read_cached(dir, source) {
                return Ok(split_lines(&body));
            }
        }

        let body = self.fetch(source)?;
        tracing::debug!(url = %source, bytes = body.len(), "fetched remote resource");

        if let Some(dir) = cache_dir {
            cache::write_cached(dir, source, &body);
        }
        Ok(split_lines(&body))
    }
}
