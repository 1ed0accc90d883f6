//! HTTP fetcher implementation
//!
//! This module handles the HTTP side of the crawl:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests for page content
//! - Error classification into navigation errors

use crate::config::HttpConfig;
use crate::NavigationError;
use reqwest::Client;
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value
    pub content_type: String,

    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - User agent and connect timeout
/// * `timeout` - Whole-request timeout for this client
///
/// # Example
///
/// ```no_run
/// use image_audit::config::HttpConfig;
/// use image_audit::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&HttpConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body
///
/// Redirects are followed by the client; the final URL is reported so
/// records point at the page that was actually rendered.
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(FetchedPage)` |
/// | Other status | `NavigationError::Status` |
/// | Client timeout | `NavigationError::Request` ("Request timeout") |
/// | Connection refused | `NavigationError::Request` ("Connection refused") |
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage, NavigationError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(NavigationError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response.text().await.map_err(|e| classify_error(url, e))?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    })
}

fn classify_error(url: &str, error: reqwest::Error) -> NavigationError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    };

    NavigationError::Request {
        url: url.to_string(),
        message,
    }
}
