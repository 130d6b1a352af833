//! Dispatch metrics via the `metrics` facade.
//!
//! Recording is a no-op until the host installs a recorder.
//!
//! ```rust
//! use caravel_telemetry::metrics::{record_dispatch, DispatchTimer};
//!
//! let timer = DispatchTimer::start();
//! record_dispatch("dispatched", 200, timer.elapsed());
//! ```

use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Counter of dispatched requests.
pub const REQUESTS_TOTAL: &str = "caravel_requests_total";

/// Histogram of dispatch latency in seconds.
pub const DISPATCH_DURATION: &str = "caravel_dispatch_duration_seconds";

/// Counter of setup cache lookups.
pub const ROUTE_CACHE_TOTAL: &str = "caravel_route_cache_total";

/// Registers descriptions for the standard metrics.
///
/// Call after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of requests dispatched");
    describe_histogram!(DISPATCH_DURATION, "Request dispatch duration in seconds");
    describe_counter!(ROUTE_CACHE_TOTAL, "Setup cache lookups by kind and result");
}

/// Records one dispatched request.
///
/// * `outcome` - `dispatched`, `not_found` or `error`
/// * `status_code` - final response status
/// * `duration` - time spent dispatching
pub fn record_dispatch(outcome: &'static str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "outcome" => outcome,
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(DISPATCH_DURATION, "outcome" => outcome).record(duration.as_secs_f64());
}

/// Records a setup cache lookup for `kind` (`config` or `routes`).
pub fn record_cache_lookup(kind: &'static str, hit: bool) {
    counter!(
        ROUTE_CACHE_TOTAL,
        "kind" => kind,
        "result" => if hit { "hit" } else { "miss" }
    )
    .increment(1);
}

/// Measures one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct DispatchTimer {
    started: Instant,
}

impl DispatchTimer {
    /// Starts timing.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Time since [`start`](Self::start).
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
