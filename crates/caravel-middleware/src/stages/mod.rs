//! Bundled middleware.

mod request_id;
mod timing;

pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
pub use timing::{TimingMiddleware, SERVER_TIMING_HEADER};
