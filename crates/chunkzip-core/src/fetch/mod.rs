//! Blocking HTTP GET via libcurl.
//!
//! Used for directory listings, individual file bodies and worker calls from
//! the download client. Runs in the current thread; call from
//! `spawn_blocking` when used from async code.

mod error;

pub use error::FetchError;

use std::str;
use std::time::Duration;

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Status code, `Content-Type` and full body of a completed GET.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u32,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, lossy.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// GET `url` and return the response whatever its status.
///
/// Follows redirects. Only transport failures are errors here.
pub fn get(url: &str, opts: &FetchOptions) -> Result<FetchResponse, FetchError> {
    let mut body = Vec::new();
    let mut content_type = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(line) = str::from_utf8(data) {
                if let Some((name, value)) = line.split_once(':') {
                    if name.trim().eq_ignore_ascii_case("content-type") {
                        content_type = Some(value.trim().to_string());
                    }
                }
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(FetchResponse {
        status,
        content_type,
        body,
    })
}

/// GET `url`, treating any non-2xx status as `FetchError::Http`.
pub fn get_ok(url: &str, opts: &FetchOptions) -> Result<FetchResponse, FetchError> {
    let resp = get(url, opts)?;
    if !resp.is_success() {
        return Err(FetchError::Http(resp.status));
    }
    Ok(resp)
}
