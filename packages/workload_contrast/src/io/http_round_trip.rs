use std::time::Duration;

use http::StatusCode;
use reqwest::blocking::Client;

use crate::{BlockingIo, Error};

/// The endpoint used by the demo's real network round trip. It responds after one second.
pub const DEFAULT_URL: &str = "https://httpbin.org/delay/1";

/// The bounded wait for one HTTP round trip, unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Performs a real HTTP GET request and reports the response status.
///
/// Pair this with [`FallbackIo`][crate::FallbackIo] so that an unreachable network degrades into
/// a simulated wait instead of an error.
#[derive(Debug)]
pub struct HttpRoundTrip {
    client: Client,
    url: String,
}

impl HttpRoundTrip {
    /// Creates an operation that requests `url`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoFailure`] if the HTTP client cannot be initialized.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::IoFailure {
                operation: "initialize HTTP client",
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The requested URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl BlockingIo for HttpRoundTrip {
    fn perform_io(&self) -> Result<StatusCode, Error> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| Error::IoFailure {
                operation: "HTTP GET",
                message: format!("{}: {e}", self.url),
            })?;

        Ok(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_host_is_io_failure() {
        // Port 9 on localhost (discard) is practically never served over HTTP.
        let io = HttpRoundTrip::new("http://127.0.0.1:9/", Duration::from_millis(500)).unwrap();

        let error = io.perform_io().unwrap_err();

        assert!(matches!(error, Error::IoFailure { .. }));
    }
}
