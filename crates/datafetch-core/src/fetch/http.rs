//! Blocking HTTP(S) fetcher.

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use tracing::debug;
use tracing::warn;

use super::Download;
use super::Fetcher;
use crate::FetchConfig;
use crate::FetchError;
use crate::Result;

/// Fetcher backed by a blocking `reqwest` client.
///
/// Redirects are followed by the client. Only a final `200 OK` is a
/// success; every other status fails with `HttpError` and the response is
/// dropped without reading its body.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from `config`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the TLS backend cannot be initialized.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::TransportError {
                url: String::from("(client setup)"),
                cause: error_chain(&e),
            })?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    type Body = Response;

    fn fetch(&self, url: &str) -> Result<Download<Response>> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!(%url, "sending request");
        let response = self
            .client
            .get(parsed)
            .send()
            .map_err(|e| FetchError::TransportError {
                url: url.to_string(),
                cause: error_chain(&e),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "server rejected request");
            drop(response);
            return Err(FetchError::HttpError {
                url: url.to_string(),
                status_code: status.as_u16(),
            });
        }

        Ok(Download {
            url: url.to_string(),
            content_length: response.content_length(),
            body: response,
        })
    }
}

/// Renders an error with its whole `source()` chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
