//! Core domain entities.
//!
//! - [`UrlRecord`] - A short code → long URL mapping as persisted by a store

pub mod url_record;

pub use url_record::UrlRecord;
