//! Application layer: request admission, job execution, and the URL protocols.
//!
//! - [`gateway::Gateway`] - rate limits, enqueues, and awaits a reply under a deadline
//! - [`worker_pool::WorkerPool`] - fixed set of workers draining a bounded queue
//! - [`rate_limiter::ClientRateLimiter`] - token bucket per client key
//! - [`services::UrlService`] - shorten and resolve against a store

pub mod gateway;
pub mod rate_limiter;
pub mod services;
pub mod worker_pool;
