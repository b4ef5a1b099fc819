use crate::{Error, Result};

/// Called exactly once with the fetched bytes, from whatever thread the
/// fetcher finishes on.
pub type FetchCallback = Box<dyn FnOnce(Result<Vec<u8>>) + Send + 'static>;

/// Fetches the raw bytes behind a source url. Implementations must not block
/// the caller; the result is delivered through `on_done`.
pub trait SourceFetcher: Send + Sync {
    fn fetch(&self, url: &str, on_done: FetchCallback);
}

/// Plain http(s) fetching through ehttp
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl SourceFetcher for HttpFetcher {
    fn fetch(&self, url: &str, on_done: FetchCallback) {
        tracing::trace!("fetching animation source {url}");
        let request = ehttp::Request::get(url);
        ehttp::fetch(
            request,
            move |response: std::result::Result<ehttp::Response, String>| {
                on_done(parse_response(response));
            },
        );
    }
}

fn parse_response(response: std::result::Result<ehttp::Response, String>) -> Result<Vec<u8>> {
    let resp = response.map_err(Error::Http)?;
    if !resp.ok {
        return Err(bad_status(&resp.url, resp.status, &resp.status_text));
    }

    Ok(resp.bytes)
}

fn bad_status(url: &str, status: u16, status_text: &str) -> Error {
    Error::Http(format!("bad http response for {url}: {status} {status_text}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_is_http_error() {
        let err = parse_response(Err("connection refused".to_owned())).unwrap_err();
        assert!(matches!(err, Error::Http(msg) if msg == "connection refused"));
    }

    #[test]
    fn bad_status_names_the_url() {
        let err = bad_status("https://example.com/a.gif", 404, "Not Found");
        assert_eq!(
            err.to_string(),
            "http error: bad http response for https://example.com/a.gif: 404 Not Found"
        );
    }
}
