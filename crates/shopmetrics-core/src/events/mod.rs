//! Business-event recorders.
//!
//! Each function maps one domain event to metric updates on the standard
//! table. They are fire-and-forget: a wiring error (metric missing from the
//! registry) is logged, never returned, so domain code can call them from
//! anywhere, including background jobs.

pub mod product;
pub mod user;

use crate::error::Result;

fn note(event: &'static str, res: Result<()>) {
    if let Err(e) = res {
        tracing::error!(event, code = e.code().as_str(), error = %e, "failed to record business event");
    }
}
