//! The immutable request snapshot handed to middleware and runnables.

use std::net::SocketAddr;

use bytes::Bytes;
use caravel_router::decode_component;
use http::header::{AsHeaderName, IntoHeaderName, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, Uri};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use caravel_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Request state captured once at the start of a request.
///
/// The path never includes the query string and is left percent-encoded;
/// the router decodes individual segments when matching.
///
/// # Example
///
/// ```
/// use caravel_core::Request;
/// use http::{HeaderValue, Method};
///
/// let request = Request::new(Method::GET, "/search?q=rust+web&page=2")
///     .with_header("x-forwarded-for", HeaderValue::from_static("10.0.0.7, 10.0.0.1"))
///     .with_remote_addr("127.0.0.1");
///
/// assert_eq!(request.path(), "/search");
/// assert_eq!(request.query("q"), Some("rust web"));
/// assert_eq!(request.client_ip(), Some("10.0.0.7"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    id: RequestId,
    method: Method,
    raw_uri: String,
    path: String,
    query: IndexMap<String, String>,
    form: IndexMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: Option<String>,
    https: bool,
}

impl Request {
    /// Creates a request from a method and a request target (`/path?query`).
    pub fn new(method: Method, target: &str) -> Self {
        let raw_uri = if target.is_empty() { "/" } else { target }.to_string();
        let (path, query) = match raw_uri.split_once('?') {
            Some((path, query)) => (path.to_string(), parse_pairs(query)),
            None => (raw_uri.clone(), IndexMap::new()),
        };
        Self {
            id: RequestId::new(),
            method,
            raw_uri,
            path,
            query,
            form: IndexMap::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
            https: false,
        }
    }

    /// Creates a request from an `http` request and the peer address.
    pub fn from_http(request: http::Request<Bytes>, remote_addr: Option<SocketAddr>) -> Self {
        let (parts, body) = request.into_parts();
        let target = parts
            .uri
            .path_and_query()
            .map_or("/", http::uri::PathAndQuery::as_str);
        let https = is_https(&parts.uri, &parts.headers);

        let mut snapshot = Self::new(parts.method, target);
        snapshot.headers = parts.headers;
        snapshot.https = https;
        if let Some(addr) = remote_addr {
            snapshot.remote_addr = Some(addr.ip().to_string());
        }
        snapshot.with_body(body)
    }

    /// Adds a header.
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self.https = self.https || forwarded_https(&self.headers);
        self
    }

    /// Sets the body. Form bodies are parsed into [`form`](Self::form) params.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self.form = if self.is_form_encoded() {
            parse_pairs(&String::from_utf8_lossy(&self.body))
        } else {
            IndexMap::new()
        };
        self
    }

    /// Sets the peer address.
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Overrides the request ID (e.g. from an inbound `X-Request-Id`).
    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = id;
        self
    }

    /// The request ID.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request target including the query string.
    #[must_use]
    pub fn raw_uri(&self) -> &str {
        &self.raw_uri
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header as text, if present and visible ASCII.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded query parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// All decoded query parameters.
    #[must_use]
    pub fn query_params(&self) -> &IndexMap<String, String> {
        &self.query
    }

    /// Decoded form parameter from an urlencoded body.
    #[must_use]
    pub fn form(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    /// Looks a parameter up in the form body, then the query string.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.form(name).or_else(|| self.query(name))
    }

    /// The raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as text, or `None` when it is blank or not UTF-8.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body)
            .ok()
            .filter(|text| !text.trim().is_empty())
    }

    /// The peer address, without port.
    #[must_use]
    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    /// The client IP: `X-Forwarded-For` (first hop), then `Client-IP`, then
    /// the peer address.
    #[must_use]
    pub fn client_ip(&self) -> Option<&str> {
        if let Some(forwarded) = self.header("x-forwarded-for") {
            let first = forwarded.split(',').next().map(str::trim).unwrap_or_default();
            if !first.is_empty() {
                return Some(first);
            }
        }
        self.header("client-ip")
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .or(self.remote_addr.as_deref())
    }

    /// Whether the request arrived over HTTPS.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.https
    }

    /// `GET` request.
    #[must_use]
    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// `POST` request.
    #[must_use]
    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    /// `PUT` request.
    #[must_use]
    pub fn is_put(&self) -> bool {
        self.method == Method::PUT
    }

    /// `DELETE` request.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.method == Method::DELETE
    }

    /// Sent by `XMLHttpRequest` (`X-Requested-With: XMLHttpRequest`).
    #[must_use]
    pub fn is_xml_http_request(&self) -> bool {
        self.header("x-requested-with") == Some("XMLHttpRequest")
    }

    fn is_form_encoded(&self) -> bool {
        self.header(CONTENT_TYPE)
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
    }
}

fn parse_pairs(encoded: &str) -> IndexMap<String, String> {
    encoded
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (
                decode_component(name).into_owned(),
                decode_component(value).into_owned(),
            )
        })
        .collect()
}

fn is_https(uri: &Uri, headers: &HeaderMap) -> bool {
    uri.scheme_str() == Some("https") || forwarded_https(headers)
}

fn forwarded_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}
