//! Domain layer containing entities, the store contract, and job types.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Store trait implemented by the infrastructure layer
//! - [`job`] - Units of work exchanged with the worker pool
//!
//! # Request Flow
//!
//! 1. HTTP handler admits the client through the rate limiter
//! 2. A [`job::Job`] is queued on the worker pool
//! 3. A worker executes it against the [`repositories::UrlStore`]
//! 4. The result comes back on the job's one-shot reply channel

pub mod entities;
pub mod job;
pub mod repositories;
