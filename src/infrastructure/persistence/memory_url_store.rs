//! In-process store implementation.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{InsertOutcome, UrlStore};
use crate::error::StoreError;

#[derive(Default)]
struct Tables {
    by_code: HashMap<String, UrlRecord>,
    code_by_long_url: HashMap<String, String>,
}

/// Store backed by two hash maps under one lock.
///
/// Both uniqueness checks and the insert happen under the same write lock, so
/// [`insert_if_absent`](UrlStore::insert_if_absent) has the same guarantees as
/// the PostgreSQL implementation's unique constraints.
#[derive(Default)]
pub struct MemoryUrlStore {
    tables: RwLock<Tables>,
}

impl MemoryUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record unconditionally.
    pub fn insert_record(&self, record: UrlRecord) {
        let mut tables = self.tables.write();
        if let Some(previous) = tables.by_code.remove(&record.short_code) {
            tables.code_by_long_url.remove(&previous.long_url);
        }
        tables
            .code_by_long_url
            .insert(record.long_url.clone(), record.short_code.clone());
        tables.by_code.insert(record.short_code.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.tables.read().by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UrlStore for MemoryUrlStore {
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<String>, StoreError> {
        Ok(self.tables.read().code_by_long_url.get(long_url).cloned())
    }

    async fn insert_if_absent(
        &self,
        short_code: &str,
        long_url: &str,
    ) -> Result<InsertOutcome, StoreError> {
        let mut tables = self.tables.write();

        if let Some(existing) = tables.code_by_long_url.get(long_url) {
            if existing == short_code {
                return Ok(InsertOutcome::AlreadyExists {
                    long_url: long_url.to_string(),
                });
            }
            return Ok(InsertOutcome::LongUrlExists {
                short_code: existing.clone(),
            });
        }

        if let Some(existing) = tables.by_code.get(short_code) {
            return Ok(InsertOutcome::AlreadyExists {
                long_url: existing.long_url.clone(),
            });
        }

        let record = UrlRecord::new(short_code.to_string(), long_url.to_string(), Utc::now(), None);
        tables
            .code_by_long_url
            .insert(long_url.to_string(), short_code.to_string());
        tables.by_code.insert(short_code.to_string(), record);

        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_short_code(&self, short_code: &str) -> Result<Option<UrlRecord>, StoreError> {
        Ok(self.tables.read().by_code.get(short_code).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
