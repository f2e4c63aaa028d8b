//! Port abstraction for transcription persistence adapters.
use async_trait::async_trait;

use crate::domain::{Transcription, TranscriptionId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by transcription repository adapters.
    pub enum TranscriptionPersistenceError {
        /// No record exists for the identifier.
        NotFound { id: String } => "transcription {id} not found",
        /// Query or mutation failed during execution.
        Query { message: String } => "transcription repository query failed: {message}",
    }
}

/// Transcription store with a per-user index kept in creation order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptionRepository: Send + Sync {
    /// Insert a new record and append it to its owner's index.
    async fn create(&self, transcription: &Transcription)
    -> Result<(), TranscriptionPersistenceError>;

    async fn find_by_id(
        &self,
        id: &TranscriptionId,
    ) -> Result<Option<Transcription>, TranscriptionPersistenceError>;

    /// All records owned by `user_id`, oldest first. Empty when none exist.
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Transcription>, TranscriptionPersistenceError>;

    /// Replace an existing record.
    async fn update(&self, transcription: &Transcription)
    -> Result<(), TranscriptionPersistenceError>;

    /// Remove a record, keeping the order of the owner's remaining entries.
    async fn delete(&self, id: &TranscriptionId) -> Result<(), TranscriptionPersistenceError>;
}
