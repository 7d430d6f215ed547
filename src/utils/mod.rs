//! Helpers shared by the API and application layers.
//!
//! - [`code_generator`] - Short code derivation and salt sources
//! - [`client_ip`] - Client key extraction for rate limiting

pub mod client_ip;
pub mod code_generator;
