//! REST API layer for HTTP request/response handling.
//!
//! - [`dto`] - request/response bodies
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - request tracing
//! - [`routes`] - route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
