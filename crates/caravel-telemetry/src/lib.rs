//! Observability for Caravel applications.
//!
//! - **Logging**: `tracing-subscriber` initialisation with pretty (development)
//!   or JSON (production) output, see [`logging`].
//! - **Metrics**: dispatch counters and histograms through the `metrics`
//!   facade, see [`metrics`]. No exporter is installed here; the host
//!   application installs whichever recorder it wants.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `caravel_requests_total` | Counter | `outcome`, `status` | Dispatched requests |
//! | `caravel_dispatch_duration_seconds` | Histogram | `outcome` | Dispatch latency |
//! | `caravel_route_cache_total` | Counter | `kind`, `result` | Setup cache lookups |
//!
//! # Example
//!
//! ```rust,no_run
//! use caravel_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).expect("logging");
//! tracing::info!("ready");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};
pub use metrics::{describe_metrics, record_cache_lookup, record_dispatch, DispatchTimer};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
