//! The mutable response shared by middleware, runnables and views.

use bytes::Bytes;
use http::{HeaderName, HeaderValue, StatusCode};
use indexmap::IndexMap;

use crate::error::ResponseError;

/// Statuses accepted by [`Response::redirect`].
pub const REDIRECT_STATUSES: [u16; 3] = [301, 302, 307];

/// Response under construction.
///
/// The status is kept as a raw number so application code can set anything;
/// [`into_http`](Response::into_http) coerces statuses without a canonical
/// reason phrase to 500.
///
/// # Example
///
/// ```
/// use caravel_core::Response;
///
/// let mut response = Response::new();
/// response.set_header("Content-Type", "text/html", true);
/// response.set_header("Content-Type", "text/plain", false);
/// response.set_body("<p>hi</p>");
///
/// assert_eq!(response.header("content-type"), Some("text/html"));
/// let http = response.into_http().unwrap();
/// assert_eq!(http.status(), 200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: IndexMap<String, String>,
    body: String,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Creates an empty `200` response.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: IndexMap::new(),
            body: String::new(),
        }
    }

    /// The status code as set.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// The body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = body.into();
        self
    }

    /// Headers in insertion order.
    #[must_use]
    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Header lookup (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.find_header(name).map(|(_, v)| v.as_str())
    }

    fn find_header(&self, name: &str) -> Option<(&String, &String)> {
        self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Sets a header. With `override_existing = false` an existing header of
    /// the same name is left untouched.
    pub fn set_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        override_existing: bool,
    ) -> &mut Self {
        let name = name.into();
        match self.find_header(&name).map(|(k, _)| k.clone()) {
            Some(_) if !override_existing => {}
            Some(existing) => {
                self.headers.insert(existing, value.into());
            }
            None => {
                self.headers.insert(name, value.into());
            }
        }
        self
    }

    /// Replaces all headers, or with `override_existing = false` only adds
    /// the ones not already present.
    pub fn set_headers<I, K, V>(&mut self, headers: I, override_existing: bool) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if override_existing {
            self.headers.clear();
        }
        for (name, value) in headers {
            self.set_header(name, value, override_existing);
        }
        self
    }

    /// Turns the response into a redirect.
    ///
    /// Only 301, 302 and 307 are accepted.
    pub fn redirect(&mut self, url: impl Into<String>, status: u16) -> Result<&mut Self, ResponseError> {
        if !REDIRECT_STATUSES.contains(&status) {
            return Err(ResponseError::InvalidRedirectStatus { status });
        }
        self.status = status;
        self.set_header("Location", url, true);
        Ok(self)
    }

    /// Returns true if the status is one of the redirect statuses.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        REDIRECT_STATUSES.contains(&self.status)
    }

    /// The status that will actually be sent.
    #[must_use]
    pub fn effective_status(&self) -> StatusCode {
        StatusCode::from_u16(self.status)
            .ok()
            .filter(|code| code.canonical_reason().is_some())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Converts into an `http` response.
    ///
    /// # Errors
    ///
    /// Fails for a redirect status without a `Location` header, or for a
    /// header that is not valid HTTP.
    pub fn into_http(self) -> Result<http::Response<Bytes>, ResponseError> {
        let status = self.effective_status();
        if self.is_redirect() && self.header("location").is_none() {
            return Err(ResponseError::RedirectWithoutLocation { status: self.status });
        }

        let mut response = http::Response::new(Bytes::from(self.body));
        *response.status_mut() = status;
        let headers = response.headers_mut();
        for (name, value) in self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ResponseError::InvalidHeader { name: name.clone() })?;
            let header_value = HeaderValue::from_str(&value)
                .map_err(|_| ResponseError::InvalidHeader { name: name.clone() })?;
            headers.append(header_name, header_value);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let response = Response::new();
        assert_eq!(response.status(), 200);
        assert!(response.headers().is_empty());
        assert_eq!(response.body(), "");
    }

    #[test]
    fn test_set_header_override_flag() {
        let mut response = Response::new();
        response.set_header("X-Test", "one", true);
        response.set_header("x-test", "two", false);
        assert_eq!(response.header("X-TEST"), Some("one"));

        response.set_header("x-test", "three", true);
        assert_eq!(response.header("x-test"), Some("three"));
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn test_set_headers_merge() {
        let mut response = Response::new();
        response.set_header("A", "1", true);
        response.set_headers([("A", "x"), ("B", "2")], false);
        assert_eq!(response.header("A"), Some("1"));
        assert_eq!(response.header("B"), Some("2"));

        response.set_headers([("C", "3")], true);
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn test_redirect_valid_statuses() {
        for status in REDIRECT_STATUSES {
            let mut response = Response::new();
            response.redirect("/login", status).unwrap();
            assert_eq!(response.status(), status);
            assert_eq!(response.header("Location"), Some("/login"));

            let http = response.into_http().unwrap();
            assert_eq!(http.status().as_u16(), status);
            assert_eq!(http.headers()["location"], "/login");
        }
    }

    #[test]
    fn test_redirect_invalid_status() {
        let mut response = Response::new();
        let err = response.redirect("/x", 303).unwrap_err();
        assert_eq!(err, ResponseError::InvalidRedirectStatus { status: 303 });
        assert_eq!(response.status(), 200);
    }

    #[test]
    fn test_redirect_status_without_location() {
        let mut response = Response::new();
        response.set_status(302);
        assert_eq!(
            response.into_http().unwrap_err(),
            ResponseError::RedirectWithoutLocation { status: 302 }
        );
    }

    #[test]
    fn test_unmapped_status_becomes_500() {
        let mut response = Response::new();
        response.set_status(999);
        assert_eq!(response.effective_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.into_http().unwrap().status(), 500);

        let mut response = Response::new();
        response.set_status(42);
        assert_eq!(response.effective_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_http_carries_body_and_headers() {
        let mut response = Response::new();
        response.set_status(404).set_body("missing");
        response.set_header("Content-Type", "text/plain", true);
        let http = response.into_http().unwrap();
        assert_eq!(http.status(), StatusCode::NOT_FOUND);
        assert_eq!(http.headers()["content-type"], "text/plain");
        assert_eq!(http.body().as_ref(), b"missing");
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut response = Response::new();
        response.set_header("Bad Header", "x", true);
        assert!(matches!(
            response.into_http(),
            Err(ResponseError::InvalidHeader { .. })
        ));
    }
}
