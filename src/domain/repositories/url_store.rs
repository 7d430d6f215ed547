//! Store trait for short code persistence.

use crate::domain::entities::UrlRecord;
use crate::error::StoreError;
use async_trait::async_trait;

/// Result of [`UrlStore::insert_if_absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The mapping was stored.
    Inserted,
    /// The short code is already taken; carries the long URL it maps to.
    AlreadyExists { long_url: String },
    /// The long URL was stored first under another short code.
    LongUrlExists { short_code: String },
}

/// Persistence interface consumed by workers.
///
/// Implementations must be safe for concurrent use by every worker in the pool
/// and must make [`insert_if_absent`](UrlStore::insert_if_absent) atomic with
/// respect to both the short code and the long URL.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlStore`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryUrlStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// Returns the short code already assigned to `long_url`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on transport or storage faults.
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<String>, StoreError>;

    /// Stores `(short_code, long_url)` unless either key is already present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on transport or storage faults.
    async fn insert_if_absent(
        &self,
        short_code: &str,
        long_url: &str,
    ) -> Result<InsertOutcome, StoreError>;

    /// Looks up the record for `short_code`, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on transport or storage faults.
    async fn find_by_short_code(&self, short_code: &str) -> Result<Option<UrlRecord>, StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
