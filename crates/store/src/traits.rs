use crate::error::StoreError;
use crate::record::SubmissionRecord;

/// The lookup and conditional-write surface the reconciliation engine needs
/// from a submission backend.
///
/// ## Read-Compute-Write Discipline
///
/// The engine's compute functions are pure, so callers run the usual
/// optimistic loop: read a record, compute the new state, then write it
/// conditionally with [`SubmissionStore::update_status`]. On
/// [`StoreError::ConcurrentConflict`] the caller re-reads and recomputes;
/// re-invoking the engine is always safe.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` so one store can serve webhook
/// handlers on multiple threads.
pub trait SubmissionStore: Send + Sync {
    /// Look up the submission holding the given NIHMS manuscript identifier.
    ///
    /// Returns `Ok(None)` when no submission matches; errors are reserved
    /// for backend failures.
    fn find_by_manuscript_id(
        &self,
        manuscript_id: &str,
    ) -> Result<Option<SubmissionRecord>, StoreError>;

    /// Look up the submission whose most recent deposit package has the
    /// given identifier.
    fn find_by_package_id(&self, package_id: &str)
        -> Result<Option<SubmissionRecord>, StoreError>;

    /// Apply a version-validated status update.
    ///
    /// The write is conditional on `version = expected_version`; if no row
    /// matches, returns `Err(StoreError::ConcurrentConflict)`. Returns the
    /// new version number on success.
    fn update_status(
        &self,
        submission_id: &str,
        expected_version: i64,
        new_status: &str,
        updated_at: &str,
    ) -> Result<i64, StoreError>;
}
