//! HTTP transport for provider calls.

mod client;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;

/// Result of an authenticated fetch.
///
/// `status` and `headers` are passed through from the transport untouched;
/// callers normally only read `result`.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Decoded response body (`Null` for an empty body).
    pub result: Value,
    pub status: StatusCode,
    pub headers: HeaderMap,
}
