//! # Middleware Stack
//!
//! - [`metrics`]: Prometheus request metrics and the domain counters the
//!   handlers push into the same registry.

pub mod metrics;
