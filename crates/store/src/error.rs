/// All errors that can be returned by a SubmissionStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Optimistic concurrency conflict: another writer updated the submission
    /// between the caller's read and its conditional write.
    #[error("concurrent conflict on submission {submission_id}: expected version {expected_version}")]
    ConcurrentConflict {
        submission_id: String,
        expected_version: i64,
    },

    /// No submission with the given identifier.
    #[error("submission not found: {submission_id}")]
    SubmissionNotFound { submission_id: String },

    /// A backend-specific error (connection, serialization, etc.).
    #[error("store backend error: {0}")]
    Backend(String),
}
