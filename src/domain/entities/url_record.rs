//! URL record entity representing a short code mapping.

use chrono::{DateTime, Utc};

/// A persisted short code → long URL mapping.
///
/// `short_code` is the primary key. `long_url` is unique as well, so a long URL
/// maps to at most one short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub short_code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(
        short_code: String,
        long_url: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            short_code,
            long_url,
            created_at,
            expires_at,
        }
    }

    /// Returns true if the record has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if the record is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }
}
