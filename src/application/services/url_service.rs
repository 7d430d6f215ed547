//! Shorten and resolve protocols executed by pool workers.

use std::sync::Arc;

use metrics::counter;
use tracing::debug;

use crate::domain::repositories::{InsertOutcome, UrlStore};
use crate::error::ServiceError;
use crate::utils::code_generator::{RandomSalt, SaltSource, generate_code};

/// Upper bound on salted insert attempts per shorten request.
pub const MAX_SHORTEN_ATTEMPTS: usize = 5;

/// Runs the shorten/resolve protocols against a [`UrlStore`].
///
/// Deduplicates by long URL and resolves code collisions by retrying with a
/// fresh salt, up to [`MAX_SHORTEN_ATTEMPTS`] times.
pub struct UrlService {
    store: Arc<dyn UrlStore>,
    salts: Arc<dyn SaltSource>,
}

impl UrlService {
    /// Creates a service drawing salts from [`RandomSalt`].
    pub fn new(store: Arc<dyn UrlStore>) -> Self {
        Self::with_salt_source(store, Arc::new(RandomSalt))
    }

    /// Creates a service with an explicit salt source.
    pub fn with_salt_source(store: Arc<dyn UrlStore>, salts: Arc<dyn SaltSource>) -> Self {
        Self { store, salts }
    }

    /// Returns the short code for `long_url`, creating one if needed.
    ///
    /// # Protocol
    ///
    /// 1. An existing mapping for `long_url` is returned as-is
    /// 2. Otherwise a salted code is inserted with a conditional insert:
    ///    - stored, or already stored for the same URL: done
    ///    - taken by a different URL: retry with a new salt
    ///    - the URL won a concurrent race under another code: that code is returned
    ///
    /// # Errors
    ///
    /// - [`ServiceError::GenerationExhausted`] if every attempt collided
    /// - [`ServiceError::StoreUnavailable`] on store faults (not retried)
    pub async fn shorten(&self, long_url: &str) -> Result<String, ServiceError> {
        if let Some(code) = self.store.find_by_long_url(long_url).await? {
            return Ok(code);
        }

        for attempt in 1..=MAX_SHORTEN_ATTEMPTS {
            let code = generate_code(long_url, self.salts.next_salt());

            match self.store.insert_if_absent(&code, long_url).await? {
                InsertOutcome::Inserted => return Ok(code),
                InsertOutcome::AlreadyExists { long_url: existing } if existing == long_url => {
                    return Ok(code);
                }
                InsertOutcome::AlreadyExists { .. } => {
                    counter!("shorten_collisions_total").increment(1);
                    debug!(attempt, code = %code, "Short code collision, retrying");
                }
                InsertOutcome::LongUrlExists { short_code } => return Ok(short_code),
            }
        }

        Err(ServiceError::GenerationExhausted {
            attempts: MAX_SHORTEN_ATTEMPTS,
        })
    }

    /// Returns the long URL behind `short_code`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if the code is unknown or its record expired
    /// - [`ServiceError::StoreUnavailable`] on store faults
    pub async fn resolve(&self, short_code: &str) -> Result<String, ServiceError> {
        let record = self
            .store
            .find_by_short_code(short_code)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if record.is_expired() {
            return Err(ServiceError::NotFound);
        }

        Ok(record.long_url)
    }
}
