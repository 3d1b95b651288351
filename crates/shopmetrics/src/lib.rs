//! Top-level facade crate for shopmetrics.
//!
//! Re-exports the metrics core and the reference gateway so users can depend
//! on a single crate.

pub mod core {
    pub use shopmetrics_core::*;
}

pub mod gateway {
    pub use shopmetrics_gateway::*;
}

pub use shopmetrics_core::{wrap, wrap_with, Registry, SharedRegistry};
