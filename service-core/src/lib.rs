//! service-core: shared HTTP service infrastructure (config, errors,
//! middleware, tracing setup).
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
