//! Request ID middleware.
//!
//! Always sets the `X-Request-ID` response header so clients can correlate
//! their requests with server logs. The value is the request's own UUID v7,
//! or the incoming `X-Request-ID` header when that is trusted and valid.

use caravel_core::{Request, Response};
use uuid::Uuid;

use crate::middleware::Middleware;

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Echoes the request ID on the response.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to reuse incoming `X-Request-ID` headers.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that always uses the request's own ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that trusts incoming `X-Request-ID` headers.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self { trust_incoming: true }
    }

    fn request_id(&self, request: &Request) -> String {
        if self.trust_incoming {
            if let Some(id) = request
                .header(REQUEST_ID_HEADER)
                .and_then(|s| Uuid::parse_str(s).ok())
            {
                return id.to_string();
            }
        }
        request.id().to_string()
    }
}

impl Middleware for RequestIdMiddleware {
    fn on_before(&mut self, request: &Request, response: &mut Response) -> anyhow::Result<()> {
        response.set_header(REQUEST_ID_HEADER, self.request_id(request), true);
        Ok(())
    }
}
