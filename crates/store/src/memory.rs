//! In-memory reference implementation of [`SubmissionStore`].
//!
//! Backed by a mutex-guarded vector. Used by the engine's tests and as the
//! behavioral reference for real backends, including which lookups match
//! and how version conflicts surface.

use std::sync::Mutex;

use crate::error::StoreError;
use crate::record::SubmissionRecord;
use crate::traits::SubmissionStore;

/// A `SubmissionStore` holding its records in memory.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<SubmissionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, replacing any existing record with the same
    /// submission id.
    pub fn insert(&self, record: SubmissionRecord) -> Result<(), StoreError> {
        let mut rows = self.lock_rows()?;
        rows.retain(|r| r.submission_id != record.submission_id);
        rows.push(record);
        Ok(())
    }

    /// Read a record by submission id.
    pub fn get(&self, submission_id: &str) -> Result<Option<SubmissionRecord>, StoreError> {
        let rows = self.lock_rows()?;
        Ok(rows
            .iter()
            .find(|r| r.submission_id == submission_id)
            .cloned())
    }

    fn lock_rows(&self) -> Result<std::sync::MutexGuard<'_, Vec<SubmissionRecord>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Backend("memory store mutex poisoned".to_string()))
    }
}

impl SubmissionStore for MemoryStore {
    fn find_by_manuscript_id(
        &self,
        manuscript_id: &str,
    ) -> Result<Option<SubmissionRecord>, StoreError> {
        let rows = self.lock_rows()?;
        Ok(rows
            .iter()
            .find(|r| r.manuscript_id.as_deref() == Some(manuscript_id))
            .cloned())
    }

    fn find_by_package_id(
        &self,
        package_id: &str,
    ) -> Result<Option<SubmissionRecord>, StoreError> {
        let rows = self.lock_rows()?;
        Ok(rows
            .iter()
            .find(|r| r.package_id.as_deref() == Some(package_id))
            .cloned())
    }

    fn update_status(
        &self,
        submission_id: &str,
        expected_version: i64,
        new_status: &str,
        updated_at: &str,
    ) -> Result<i64, StoreError> {
        let mut rows = self.lock_rows()?;

        let row = rows
            .iter_mut()
            .find(|r| r.submission_id == submission_id)
            .ok_or_else(|| StoreError::SubmissionNotFound {
                submission_id: submission_id.to_string(),
            })?;

        if row.version != expected_version {
            return Err(StoreError::ConcurrentConflict {
                submission_id: submission_id.to_string(),
                expected_version,
            });
        }

        row.status = new_status.to_string();
        row.version += 1;
        row.updated_at = updated_at.to_string();
        Ok(row.version)
    }
}
