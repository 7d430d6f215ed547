//! Business logic executed by pool workers.

pub mod url_service;

pub use url_service::UrlService;
