//! Store implementations.
//!
//! - [`PgUrlStore`] - PostgreSQL storage via SQLx
//! - [`MemoryUrlStore`] - In-process storage for tests and local runs

pub mod memory_url_store;
pub mod pg_url_store;

pub use memory_url_store::MemoryUrlStore;
pub use pg_url_store::{PgUrlStore, UrlStats};
