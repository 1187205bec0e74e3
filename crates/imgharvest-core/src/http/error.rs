//! Transport error type shared by page fetches, HEAD requests and image downloads.

/// Error returned by a single HTTP exchange (curl failure, HTTP status, or local write failure).
/// Rendered verbatim into the run log's error section.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the response body to disk failed; the transfer was aborted.
    #[error("storage: {0}")]
    Storage(String),
}

impl FetchError {
    /// True if the remote answered with the given status code.
    pub fn is_status(&self, code: u32) -> bool {
        matches!(self, FetchError::Http(c) if *c == code)
    }
}
