//! Fully-collected HTTP response.

use http::{HeaderMap, StatusCode, Version};

/// A response whose body has been read to completion.
///
/// The executor drains the body before cookie-jar updates and encoding,
/// so downstream code never touches a live connection.
#[derive(Debug)]
pub struct CollectedResponse {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: bytes::Bytes,
    /// URL the final hop was served from (after redirects).
    pub final_url: url::Url,
}

impl CollectedResponse {
    /// Protocol string in the shape callers expect (`HTTP/1.1`, `HTTP/2.0`).
    pub fn protocol(&self) -> &'static str {
        match self.version {
            Version::HTTP_09 => "HTTP/0.9",
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_2 => "HTTP/2.0",
            Version::HTTP_3 => "HTTP/3.0",
            _ => "HTTP/1.1",
        }
    }

    /// Content-Type header value, if present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}
