//! HTTP transport: page GET, HEAD request, and streamed image GET.
//!
//! Uses the curl crate (libcurl easy handles). Every call blocks the current
//! thread; call from `spawn_blocking` or a worker thread when used from async code.

mod error;
mod parse;

pub use error::FetchError;

use crate::storage::StorageWriter;
use std::str;
use std::time::Duration;

/// Connection phase gets at most this long, bounded by the overall timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REDIRECTS: u32 = 10;

/// Request settings applied to every exchange.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Total per-request timeout.
    pub timeout: Duration,
}

/// Result of a HEAD request.
#[derive(Debug, Clone, Default)]
pub struct HeadResult {
    /// Declared size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// `Content-Type` value if present.
    pub content_type: Option<String>,
}

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Response body decoded as UTF-8 (invalid sequences replaced).
    pub body: String,
    /// `Content-Type` reported by the server, if any.
    pub content_type: Option<String>,
}

impl FetchedPage {
    /// True unless the server declared a non-HTML content type.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.contains("html") || ct.contains("xml")
            }
            None => true,
        }
    }
}

fn easy_handle(url: &str, opts: &HttpOptions) -> Result<curl::easy::Easy, FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.useragent(&opts.user_agent)?;
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTS)?;
    easy.connect_timeout(CONNECT_TIMEOUT.min(opts.timeout))?;
    easy.timeout(opts.timeout)?;
    Ok(easy)
}

fn check_status(easy: &mut curl::easy::Easy) -> Result<(), FetchError> {
    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(())
}

/// GETs a page into memory.
pub fn fetch_page(url: &str, opts: &HttpOptions) -> Result<FetchedPage, FetchError> {
    let mut body: Vec<u8> = Vec::new();
    let mut easy = easy_handle(url, opts)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    check_status(&mut easy)?;
    let content_type = easy.content_type()?.map(str::to_string);

    Ok(FetchedPage {
        body: String::from_utf8_lossy(&body).into_owned(),
        content_type,
    })
}

/// Performs a HEAD request and returns the declared metadata.
pub fn head(url: &str, opts: &HttpOptions) -> Result<HeadResult, FetchError> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = easy_handle(url, opts)?;
    easy.nobody(true)?; // HEAD request

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    check_status(&mut easy)?;
    Ok(parse::parse_headers(&headers))
}

/// GETs `url` and streams the body into `storage` starting at offset 0.
/// Returns the number of bytes written.
pub fn download(url: &str, opts: &HttpOptions, storage: &StorageWriter) -> Result<u64, FetchError> {
    let mut written = 0u64;
    let mut storage_error: Option<String> = None;
    let mut easy = easy_handle(url, opts)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match storage.write_at(written, data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                storage_error = Some(format!("{:#}", e));
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(msg) = storage_error {
        return Err(FetchError::Storage(msg));
    }
    performed?;
    check_status(&mut easy)?;
    Ok(written)
}
