use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::error::SourceError;

/// Socket timeout for page and search requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Socket timeout for classifier calls.
pub const CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(30);
/// Attempts made by [`get_with_retry`] before giving up on timeouts.
pub const MAX_RETRIES: usize = 2;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Outbound HTTP used by every fetcher.
///
/// Responses are returned as text; non-success statuses are errors.
pub trait HttpClient {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, SourceError>;

    fn post_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(&str, String)],
        body: &Value,
    ) -> Result<String, SourceError>;
}

/// GET that retries on timeouts only. Any other failure returns at once.
pub fn get_with_retry(
    http: &dyn HttpClient,
    url: &str,
    query: &[(&str, String)],
    label: &str,
) -> Result<String, SourceError> {
    let mut attempt = 1;
    loop {
        match http.get(url, query) {
            Err(e) if e.is_timeout() && attempt < MAX_RETRIES => {
                log::warn!("Timeout on {label}, retrying...");
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Blocking `reqwest` client with browser-like headers.
pub struct WebClient {
    http: Client,
}

impl WebClient {
    pub fn new() -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(
            header::UPGRADE_INSECURE_REQUESTS,
            HeaderValue::from_static("1"),
        );

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }
}

impl HttpClient for WebClient {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, SourceError> {
        let resp = self.http.get(url).query(query).send()?.error_for_status()?;
        Ok(resp.text()?)
    }

    fn post_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(&str, String)],
        body: &Value,
    ) -> Result<String, SourceError> {
        let mut req = self
            .http
            .post(url)
            .query(query)
            .timeout(CLASSIFIER_TIMEOUT)
            .json(body);
        for (name, value) in headers {
            req = req.header(*name, value.as_str());
        }
        let resp = req.send()?.error_for_status()?;
        Ok(resp.text()?)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct TimesOut {
        calls: Cell<usize>,
        succeed_on: usize,
    }

    impl HttpClient for TimesOut {
        fn get(&self, url: &str, _query: &[(&str, String)]) -> Result<String, SourceError> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() >= self.succeed_on {
                Ok("ok".into())
            } else {
                Err(SourceError::Timeout(url.into()))
            }
        }

        fn post_json(
            &self,
            _url: &str,
            _query: &[(&str, String)],
            _headers: &[(&str, String)],
            _body: &Value,
        ) -> Result<String, SourceError> {
            Err(SourceError::transport("unused"))
        }
    }

    #[test]
    fn retries_timeouts_up_to_limit() {
        let http = TimesOut {
            calls: Cell::new(0),
            succeed_on: 2,
        };
        assert_eq!(get_with_retry(&http, "u", &[], "test").unwrap(), "ok");
        assert_eq!(http.calls.get(), 2);

        let http = TimesOut {
            calls: Cell::new(0),
            succeed_on: 10,
        };
        assert!(get_with_retry(&http, "u", &[], "test").unwrap_err().is_timeout());
        assert_eq!(http.calls.get(), MAX_RETRIES);
    }

    #[test]
    fn other_errors_are_not_retried() {
        struct Refused(Cell<usize>);
        impl HttpClient for Refused {
            fn get(&self, _url: &str, _q: &[(&str, String)]) -> Result<String, SourceError> {
                self.0.set(self.0.get() + 1);
                Err(SourceError::Status {
                    status: 503,
                    url: "u".into(),
                })
            }
            fn post_json(
                &self,
                _url: &str,
                _q: &[(&str, String)],
                _h: &[(&str, String)],
                _b: &Value,
            ) -> Result<String, SourceError> {
                unreachable!()
            }
        }

        let http = Refused(Cell::new(0));
        assert!(get_with_retry(&http, "u", &[], "test").is_err());
        assert_eq!(http.0.get(), 1);
    }
}
