//! Middleware applied to every request.
//!
//! - [`request_id`]: generates or propagates `X-Request-Id`
//! - [`log_requests`]: one `info_span!` per request with its outcome

mod logging;
mod request_id;

pub use logging::log_requests;
pub use request_id::{REQUEST_ID_HEADER, request_id};
