//! Transcription domain service implementing the [`TranscriptionService`]
//! driving port.
//!
//! A request first persists a `processing` record, then calls the provider
//! on a detached task so the record still reaches a terminal state when the
//! HTTP caller goes away mid-flight.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AudioUpload, TranscriptionError, TranscriptionProvider, TranscriptionProviderError,
    TranscriptionRepository, TranscriptionService,
};
use crate::domain::{
    TraceId, Transcription, TranscriptionId, TranscriptionStateError, UserId,
};

/// Default provider timeout.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(120);
/// Default spoken-language hint.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Tunables for the provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionOptions {
    pub language: String,
    pub timeout: Duration,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_owned(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

/// Orchestrates the transcription store and the external provider.
#[derive(Clone)]
pub struct TranscriptionServiceImpl<R> {
    repo: Arc<R>,
    provider: Arc<dyn TranscriptionProvider>,
    clock: Arc<dyn Clock>,
    options: TranscriptionOptions,
}

impl<R> TranscriptionServiceImpl<R> {
    pub fn new(
        repo: Arc<R>,
        provider: Arc<dyn TranscriptionProvider>,
        clock: Arc<dyn Clock>,
        options: TranscriptionOptions,
    ) -> Self {
        Self {
            repo,
            provider,
            clock,
            options,
        }
    }
}

/// Everything the detached provider task needs, owned.
struct Job<R> {
    repo: Arc<R>,
    provider: Arc<dyn TranscriptionProvider>,
    clock: Arc<dyn Clock>,
    options: TranscriptionOptions,
    record: Transcription,
    audio: AudioUpload,
}

impl<R> Job<R>
where
    R: TranscriptionRepository,
{
    async fn run(self) -> Result<Transcription, TranscriptionError> {
        let Self {
            repo,
            provider,
            clock,
            options,
            mut record,
            audio,
        } = self;

        let outcome = tokio::time::timeout(
            options.timeout,
            provider.transcribe(&audio, &options.language),
        )
        .await
        .unwrap_or_else(|_| {
            Err(TranscriptionProviderError::timeout(format!(
                "no response within {}s",
                options.timeout.as_secs()
            )))
        });

        let transcript = match outcome {
            Ok(transcript) => transcript,
            Err(err) => {
                warn!(transcription_id = %record.id(), error = %err, "provider call failed");
                record.fail(clock.utc());
                persist_failure(repo.as_ref(), &record).await;
                return Err(err.into());
            }
        };

        let pending = record.clone();
        match record.complete(transcript.text, transcript.duration_seconds, clock.utc()) {
            Ok(()) => {}
            Err(TranscriptionStateError::EmptyText) => {
                warn!(transcription_id = %record.id(), "provider returned empty text");
                record.fail(clock.utc());
                persist_failure(repo.as_ref(), &record).await;
                return Err(TranscriptionError::EmptyText);
            }
            Err(err @ TranscriptionStateError::AlreadyTerminal { .. }) => {
                return Err(TranscriptionError::Interrupted {
                    message: err.to_string(),
                });
            }
        }

        if let Err(err) = repo.update(&record).await {
            warn!(
                transcription_id = %record.id(),
                error = %err,
                "failed to store completed transcription"
            );
            mark_failed(repo.as_ref(), pending, clock.as_ref()).await;
            return Err(err.into());
        }
        info!(
            transcription_id = %record.id(),
            duration_seconds = record.duration_seconds(),
            "transcription completed"
        );
        Ok(record)
    }
}

/// Persist a failed record. The caller already has a more useful error to
/// report, so update failures are only logged.
async fn persist_failure<R: TranscriptionRepository>(repo: &R, record: &Transcription) {
    if let Err(err) = repo.update(record).await {
        warn!(
            transcription_id = %record.id(),
            error = %err,
            "failed to persist failed transcription"
        );
    }
}

/// Move a still-processing record to `failed` and persist it best-effort.
async fn mark_failed<R: TranscriptionRepository>(
    repo: &R,
    mut record: Transcription,
    clock: &dyn Clock,
) {
    record.fail(clock.utc());
    persist_failure(repo, &record).await;
}

#[async_trait]
impl<R> TranscriptionService for TranscriptionServiceImpl<R>
where
    R: TranscriptionRepository + 'static,
{
    async fn transcribe(
        &self,
        user_id: &UserId,
        audio: AudioUpload,
    ) -> Result<Transcription, TranscriptionError> {
        let record = Transcription::new(user_id.clone(), self.clock.utc());
        self.repo.create(&record).await?;
        info!(
            transcription_id = %record.id(),
            user_id = %user_id,
            bytes = audio.len(),
            "transcription started"
        );

        let pending = record.clone();
        let job = Job {
            repo: Arc::clone(&self.repo),
            provider: Arc::clone(&self.provider),
            clock: Arc::clone(&self.clock),
            options: self.options.clone(),
            record,
            audio,
        };
        let handle = match TraceId::current() {
            Some(trace_id) => tokio::spawn(TraceId::scope(trace_id, job.run())),
            None => tokio::spawn(job.run()),
        };

        match handle.await {
            Ok(result) => result,
            Err(err) => {
                warn!(transcription_id = %pending.id(), error = %err, "transcription task aborted");
                mark_failed(self.repo.as_ref(), pending, self.clock.as_ref()).await;
                Err(TranscriptionError::Interrupted {
                    message: err.to_string(),
                })
            }
        }
    }

    async fn get_transcription(
        &self,
        id: &TranscriptionId,
        user_id: &UserId,
    ) -> Result<Transcription, TranscriptionError> {
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(TranscriptionError::NotFound)?;
        if !record.belongs_to_user(user_id) {
            return Err(TranscriptionError::UnauthorizedAccess);
        }
        Ok(record)
    }

    async fn get_user_transcriptions(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Transcription>, TranscriptionError> {
        Ok(self.repo.find_by_user_id(user_id).await?)
    }
}

#[cfg(test)]
#[path = "transcription_service_tests.rs"]
mod tests;
