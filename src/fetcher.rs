//! HTTP page retrieval.
//!
//! [`Fetcher`] owns an explicitly constructed `reqwest::Client` that carries
//! browser-like headers (user agent, `Accept-Language` favoring Korean, and a
//! referrer on the upstream's own domain, since many sections reject
//! referrer-less requests). It never retries; a failed fetch is reported as a
//! [`FetchError`] and the pipeline decides what to do next.

use crate::config::HttpConfig;
use crate::error::FetchError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Anything that can turn a URL into raw HTML.
///
/// The pipeline is generic over this seam so strategies can be exercised
/// without a network.
pub trait PageSource {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

/// Browser-like HTTP GET client.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

fn header_value(value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|e| FetchError::Request(format!("invalid header value: {e}")))
}

impl Fetcher {
    /// Build a fetcher from HTTP settings.
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
        headers.insert(REFERER, header_value(&config.referer)?);

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    /// GET `url` with the default browser headers plus `extra_headers`.
    ///
    /// Non-2xx responses are errors; the body of a failed response is never
    /// returned as content.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch(&self, url: &str, extra_headers: &[(&str, &str)]) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        let mut request = self.client.get(parsed);
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }

        let t0 = Instant::now();
        let response = request.send().await.inspect_err(|e| {
            warn!(error = %e, elapsed_ms = t0.elapsed().as_millis(), "Request failed");
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Upstream returned non-success status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Fetched page"
        );
        debug!(preview = %truncate_for_log(&body, 200), "Page preview");
        Ok(body)
    }
}

impl PageSource for Fetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.fetch(url, &[]).await
    }
}
