//! Transcription record and its lifecycle.
//!
//! A record starts in [`TranscriptionStatus::Processing`] and moves exactly
//! once to either `Completed` or `Failed`. Terminal states are final.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Errors raised when parsing a [`TranscriptionId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transcription id must be a valid UUID")]
pub struct InvalidTranscriptionId;

/// Stable transcription identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranscriptionId(Uuid);

impl TranscriptionId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TranscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TranscriptionId {
    type Err = InvalidTranscriptionId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidTranscriptionId)
    }
}

/// Lifecycle state of a transcription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionStatus {
    Processing,
    Completed,
    Failed,
}

impl TranscriptionStatus {
    /// Wire representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transitions are allowed.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl fmt::Display for TranscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptionStateError {
    /// Completion requires non-empty text.
    #[error("transcription text is empty")]
    EmptyText,
    /// The record already reached a terminal state.
    #[error("transcription is already {status}")]
    AlreadyTerminal { status: TranscriptionStatus },
}

/// Transcription owned by a single user.
///
/// ## Invariants
/// - `text` is empty unless `status` is `Completed`.
/// - `duration_seconds` is finite and non-negative.
/// - once `status` is terminal it never changes again.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    id: TranscriptionId,
    user_id: UserId,
    text: String,
    status: TranscriptionStatus,
    duration_seconds: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Transcription {
    /// Start a new record in `processing`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use voiceline::domain::{Transcription, TranscriptionStatus, UserId};
    ///
    /// let owner = UserId::random();
    /// let record = Transcription::new(owner.clone(), Utc::now());
    /// assert_eq!(record.status(), TranscriptionStatus::Processing);
    /// assert!(record.belongs_to_user(&owner));
    /// ```
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: TranscriptionId::random(),
            user_id,
            text: String::new(),
            status: TranscriptionStatus::Processing,
            duration_seconds: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a successful transcription.
    ///
    /// Empty text is rejected and the record stays in `processing` so the
    /// caller can decide how to fail it. Negative or non-finite durations
    /// are stored as zero.
    pub fn complete(
        &mut self,
        text: impl Into<String>,
        duration_seconds: f64,
        now: DateTime<Utc>,
    ) -> Result<(), TranscriptionStateError> {
        self.ensure_processing()?;
        let text = text.into();
        if text.is_empty() {
            return Err(TranscriptionStateError::EmptyText);
        }
        self.text = text;
        self.duration_seconds = if duration_seconds.is_finite() && duration_seconds > 0.0 {
            duration_seconds
        } else {
            0.0
        };
        self.status = TranscriptionStatus::Completed;
        self.touch(now);
        Ok(())
    }

    /// Mark the record failed. Terminal records are left as they are.
    pub fn fail(&mut self, now: DateTime<Utc>) {
        if self.ensure_processing().is_ok() {
            self.status = TranscriptionStatus::Failed;
            self.touch(now);
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status == TranscriptionStatus::Processing
    }

    pub fn is_completed(&self) -> bool {
        self.status == TranscriptionStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == TranscriptionStatus::Failed
    }

    /// Whether `user_id` owns this record.
    pub fn belongs_to_user(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn id(&self) -> TranscriptionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn status(&self) -> TranscriptionStatus {
        self.status
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn ensure_processing(&self) -> Result<(), TranscriptionStateError> {
        if self.status.is_terminal() {
            return Err(TranscriptionStateError::AlreadyTerminal {
                status: self.status,
            });
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}
