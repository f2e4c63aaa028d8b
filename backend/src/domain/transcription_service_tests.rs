//! Tests for the transcription service.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::TranscriptionStatus;
use crate::domain::ports::{
    MockTranscriptionProvider, MockTranscriptionRepository, ProviderTranscript,
    TranscriptionPersistenceError,
};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

#[fixture]
fn owner() -> UserId {
    UserId::random()
}

fn audio() -> AudioUpload {
    AudioUpload::new("clip.wav", Some("audio/wav".to_owned()), vec![0_u8; 16])
}

fn transcript(text: &str) -> ProviderTranscript {
    ProviderTranscript {
        text: text.to_owned(),
        duration_seconds: 2.5,
    }
}

fn service_with<R: TranscriptionRepository>(
    repo: R,
    provider: impl TranscriptionProvider + 'static,
    timeout: Duration,
) -> TranscriptionServiceImpl<R> {
    TranscriptionServiceImpl::new(
        Arc::new(repo),
        Arc::new(provider),
        Arc::new(FixtureClock),
        TranscriptionOptions {
            language: "en".to_owned(),
            timeout,
        },
    )
}

fn accepting_repo(expected_final: TranscriptionStatus) -> MockTranscriptionRepository {
    let mut repo = MockTranscriptionRepository::new();
    repo.expect_create()
        .withf(|record| record.is_processing())
        .times(1)
        .return_once(|_| Ok(()));
    repo.expect_update()
        .withf(move |record| record.status() == expected_final)
        .times(1)
        .return_once(|_| Ok(()));
    repo
}

#[rstest]
#[tokio::test]
async fn transcribe_completes_record(owner: UserId) {
    let mut provider = MockTranscriptionProvider::new();
    provider
        .expect_transcribe()
        .withf(|audio, language| audio.file_name() == "clip.wav" && language == "en")
        .times(1)
        .return_once(|_, _| Ok(transcript("hello world")));

    let service = service_with(
        accepting_repo(TranscriptionStatus::Completed),
        provider,
        DEFAULT_PROVIDER_TIMEOUT,
    );
    let record = service
        .transcribe(&owner, audio())
        .await
        .expect("transcription succeeds");

    assert!(record.is_completed());
    assert_eq!(record.text(), "hello world");
    assert_eq!(record.duration_seconds(), 2.5);
    assert!(record.belongs_to_user(&owner));
}

#[rstest]
#[tokio::test]
async fn provider_failure_marks_record_failed(owner: UserId) {
    let mut provider = MockTranscriptionProvider::new();
    provider
        .expect_transcribe()
        .return_once(|_, _| Err(TranscriptionProviderError::transport("connection reset")));

    let service = service_with(
        accepting_repo(TranscriptionStatus::Failed),
        provider,
        DEFAULT_PROVIDER_TIMEOUT,
    );
    let err = service
        .transcribe(&owner, audio())
        .await
        .expect_err("provider failure must surface");

    assert_eq!(
        err,
        TranscriptionError::Provider(TranscriptionProviderError::transport("connection reset"))
    );
}

#[rstest]
#[tokio::test]
async fn failed_update_does_not_mask_provider_error(owner: UserId) {
    let mut repo = MockTranscriptionRepository::new();
    repo.expect_create().return_once(|_| Ok(()));
    repo.expect_update()
        .times(1)
        .return_once(|_| Err(TranscriptionPersistenceError::query("poisoned")));
    let mut provider = MockTranscriptionProvider::new();
    provider
        .expect_transcribe()
        .return_once(|_, _| Err(TranscriptionProviderError::not_configured()));

    let err = service_with(repo, provider, DEFAULT_PROVIDER_TIMEOUT)
        .transcribe(&owner, audio())
        .await
        .expect_err("provider failure must surface");

    assert_eq!(
        err,
        TranscriptionError::Provider(TranscriptionProviderError::NotConfigured)
    );
}

#[rstest]
#[tokio::test]
async fn empty_text_marks_record_failed(owner: UserId) {
    let mut provider = MockTranscriptionProvider::new();
    provider
        .expect_transcribe()
        .return_once(|_, _| Ok(transcript("")));

    let err = service_with(
        accepting_repo(TranscriptionStatus::Failed),
        provider,
        DEFAULT_PROVIDER_TIMEOUT,
    )
    .transcribe(&owner, audio())
    .await
    .expect_err("empty text must fail");

    assert_eq!(err, TranscriptionError::EmptyText);
}

#[rstest]
#[tokio::test]
async fn create_failure_skips_provider(owner: UserId) {
    let mut repo = MockTranscriptionRepository::new();
    repo.expect_create()
        .return_once(|_| Err(TranscriptionPersistenceError::query("poisoned")));
    repo.expect_update().times(0);
    let mut provider = MockTranscriptionProvider::new();
    provider.expect_transcribe().times(0);

    let err = service_with(repo, provider, DEFAULT_PROVIDER_TIMEOUT)
        .transcribe(&owner, audio())
        .await
        .expect_err("create failure must surface");

    assert!(matches!(err, TranscriptionError::Persistence(_)));
}

struct SlowProvider {
    delay: Duration,
}

#[async_trait]
impl TranscriptionProvider for SlowProvider {
    async fn transcribe(
        &self,
        _audio: &AudioUpload,
        _language: &str,
    ) -> Result<ProviderTranscript, TranscriptionProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(transcript("eventually"))
    }
}

#[rstest]
#[tokio::test]
async fn slow_provider_times_out_and_fails_record(owner: UserId) {
    let service = service_with(
        accepting_repo(TranscriptionStatus::Failed),
        SlowProvider {
            delay: Duration::from_secs(5),
        },
        Duration::from_millis(20),
    );

    let err = service
        .transcribe(&owner, audio())
        .await
        .expect_err("timeout must fail");

    assert!(matches!(
        err,
        TranscriptionError::Provider(TranscriptionProviderError::Timeout { .. })
    ));
}

/// Records every stored state so tests can inspect the final one.
#[derive(Default)]
struct RecordingRepository {
    states: Mutex<Vec<Transcription>>,
    reject_completed: bool,
}

impl RecordingRepository {
    fn last(&self) -> Option<Transcription> {
        self.states
            .lock()
            .expect("recording lock")
            .last()
            .cloned()
    }

    fn push(&self, record: &Transcription) {
        self.states
            .lock()
            .expect("recording lock")
            .push(record.clone());
    }
}

#[async_trait]
impl TranscriptionRepository for RecordingRepository {
    async fn create(&self, record: &Transcription) -> Result<(), TranscriptionPersistenceError> {
        self.push(record);
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &TranscriptionId,
    ) -> Result<Option<Transcription>, TranscriptionPersistenceError> {
        Ok(self.last())
    }

    async fn find_by_user_id(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Transcription>, TranscriptionPersistenceError> {
        Ok(self.last().into_iter().collect())
    }

    async fn update(&self, record: &Transcription) -> Result<(), TranscriptionPersistenceError> {
        if self.reject_completed && record.is_completed() {
            return Err(TranscriptionPersistenceError::query("transient"));
        }
        self.push(record);
        Ok(())
    }

    async fn delete(&self, _id: &TranscriptionId) -> Result<(), TranscriptionPersistenceError> {
        Ok(())
    }
}

#[rstest]
#[tokio::test]
async fn dropped_caller_still_reaches_terminal_state(owner: UserId) {
    let repo = Arc::new(RecordingRepository::default());
    let service = TranscriptionServiceImpl::new(
        Arc::clone(&repo),
        Arc::new(SlowProvider {
            delay: Duration::from_millis(50),
        }),
        Arc::new(FixtureClock),
        TranscriptionOptions::default(),
    );

    let abandoned =
        tokio::time::timeout(Duration::from_millis(10), service.transcribe(&owner, audio())).await;
    assert!(abandoned.is_err(), "caller should give up before the provider answers");
    assert!(repo.last().is_some_and(|record| record.is_processing()));

    tokio::time::sleep(Duration::from_millis(200)).await;
    let last = repo.last().expect("record stored");
    assert!(last.is_completed());
    assert_eq!(last.text(), "eventually");
}

#[rstest]
#[tokio::test]
async fn failed_completion_write_leaves_record_failed(owner: UserId) {
    let repo = Arc::new(RecordingRepository {
        reject_completed: true,
        ..RecordingRepository::default()
    });
    let mut provider = MockTranscriptionProvider::new();
    provider
        .expect_transcribe()
        .return_once(|_, _| Ok(transcript("hello")));
    let service = TranscriptionServiceImpl::new(
        Arc::clone(&repo),
        Arc::new(provider),
        Arc::new(FixtureClock),
        TranscriptionOptions::default(),
    );

    let err = service
        .transcribe(&owner, audio())
        .await
        .expect_err("store failure must surface");

    assert_eq!(
        err,
        TranscriptionError::Persistence(TranscriptionPersistenceError::query("transient"))
    );
    let last = repo.last().expect("record stored");
    assert!(last.is_failed());
    assert_eq!(last.text(), "");
}

#[rstest]
#[tokio::test]
async fn panicking_provider_leaves_record_failed(owner: UserId) {
    let repo = Arc::new(RecordingRepository::default());
    let mut provider = MockTranscriptionProvider::new();
    provider
        .expect_transcribe()
        .return_once(|_, _| panic!("provider bug"));
    let service = TranscriptionServiceImpl::new(
        Arc::clone(&repo),
        Arc::new(provider),
        Arc::new(FixtureClock),
        TranscriptionOptions::default(),
    );

    let err = service
        .transcribe(&owner, audio())
        .await
        .expect_err("aborted task must surface");

    assert!(
        matches!(err, TranscriptionError::Interrupted { ref message } if message.contains("provider bug")),
        "unexpected error: {err:?}"
    );
    let last = repo.last().expect("record stored");
    assert!(last.is_failed());
    assert!(last.belongs_to_user(&owner));
}

fn stored(owner: &UserId) -> Transcription {
    Transcription::new(owner.clone(), FixtureClock.utc())
}

#[rstest]
#[tokio::test]
async fn get_transcription_returns_owned_record(owner: UserId) {
    let record = stored(&owner);
    let id = record.id();
    let mut repo = MockTranscriptionRepository::new();
    repo.expect_find_by_id()
        .withf(move |candidate| *candidate == id)
        .return_once(move |_| Ok(Some(record)));

    let found = service_with(repo, MockTranscriptionProvider::new(), DEFAULT_PROVIDER_TIMEOUT)
        .get_transcription(&id, &owner)
        .await
        .expect("owner can read");

    assert_eq!(found.id(), id);
}

#[rstest]
#[tokio::test]
async fn get_transcription_rejects_other_users(owner: UserId) {
    let record = stored(&owner);
    let id = record.id();
    let mut repo = MockTranscriptionRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(record)));

    let err = service_with(repo, MockTranscriptionProvider::new(), DEFAULT_PROVIDER_TIMEOUT)
        .get_transcription(&id, &UserId::random())
        .await
        .expect_err("other users are refused");

    assert_eq!(err, TranscriptionError::UnauthorizedAccess);
}

#[rstest]
#[tokio::test]
async fn get_transcription_reports_missing_before_ownership(owner: UserId) {
    let mut repo = MockTranscriptionRepository::new();
    repo.expect_find_by_id().return_once(|_| Ok(None));

    let err = service_with(repo, MockTranscriptionProvider::new(), DEFAULT_PROVIDER_TIMEOUT)
        .get_transcription(&TranscriptionId::random(), &owner)
        .await
        .expect_err("missing record");

    assert_eq!(err, TranscriptionError::NotFound);
}

#[rstest]
#[tokio::test]
async fn get_user_transcriptions_returns_store_listing(owner: UserId) {
    let first = stored(&owner);
    let second = stored(&owner);
    let expected = vec![first.id(), second.id()];
    let mut repo = MockTranscriptionRepository::new();
    repo.expect_find_by_user_id()
        .return_once(move |_| Ok(vec![first, second]));

    let listed = service_with(repo, MockTranscriptionProvider::new(), DEFAULT_PROVIDER_TIMEOUT)
        .get_user_transcriptions(&owner)
        .await
        .expect("listing succeeds");

    let ids: Vec<_> = listed.iter().map(Transcription::id).collect();
    assert_eq!(ids, expected);
}
