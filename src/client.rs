use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::ResolvedConfig;
use crate::error::EnaError;

/// Network boundary: fetch the body behind a URL. Implementations do not
/// retry; a non-2xx status or transport failure is returned as an error.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, EnaError>;
}

#[derive(Clone)]
pub struct EnaHttpClient {
    client: Client,
}

impl EnaHttpClient {
    pub fn new(config: &ResolvedConfig) -> Result<Self, EnaError> {
        Self::with_settings(config.user_agent(), config.timeout())
    }

    pub fn with_settings(user_agent: &str, timeout: Duration) -> Result<Self, EnaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|err| EnaError::ConfigParse(format!("user agent: {err}")))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| EnaError::UpstreamRequest(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, EnaError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .ok()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "ENA request failed".to_string());
        Err(EnaError::UpstreamStatus { status, message })
    }
}

impl Fetcher for EnaHttpClient {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, EnaError> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| EnaError::UpstreamRequest(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let bytes = response
            .bytes()
            .map_err(|err| EnaError::UpstreamRequest(err.to_string()))?;
        tracing::debug!(%url, bytes = bytes.len(), "response received");
        Ok(bytes.to_vec())
    }
}

pub fn default_user_agent() -> String {
    format!("enasearch/{}", env!("CARGO_PKG_VERSION"))
}
