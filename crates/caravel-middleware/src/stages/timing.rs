//! Dispatch timing middleware.

use std::time::Instant;

use caravel_core::{Request, Response};

use crate::middleware::Middleware;

/// The header carrying the measured duration.
pub const SERVER_TIMING_HEADER: &str = "server-timing";

/// Measures the time between its hooks and reports it in `Server-Timing`.
#[derive(Debug, Default)]
pub struct TimingMiddleware {
    started: Option<Instant>,
}

impl TimingMiddleware {
    /// Creates a new timing middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Middleware for TimingMiddleware {
    fn on_before(&mut self, _request: &Request, _response: &mut Response) -> anyhow::Result<()> {
        self.started = Some(Instant::now());
        Ok(())
    }

    fn on_after(&mut self, request: &Request, response: &mut Response) -> anyhow::Result<()> {
        if let Some(started) = self.started.take() {
            let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
            tracing::debug!(
                path = request.path(),
                status = response.status(),
                duration_ms,
                "dispatch timed"
            );
            response.set_header(
                SERVER_TIMING_HEADER,
                format!("dispatch;dur={duration_ms:.3}"),
                true,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_sets_server_timing() {
        let request = Request::new(Method::GET, "/");
        let mut response = Response::new();
        let mut mw = TimingMiddleware::new();
        mw.on_before(&request, &mut response).unwrap();
        mw.on_after(&request, &mut response).unwrap();
        let header = response.header("Server-Timing").unwrap();
        assert!(header.starts_with("dispatch;dur="));
    }

    #[test]
    fn test_after_without_before_does_nothing() {
        let request = Request::new(Method::GET, "/");
        let mut response = Response::new();
        TimingMiddleware::new().on_after(&request, &mut response).unwrap();
        assert!(response.header(SERVER_TIMING_HEADER).is_none());
    }
}
