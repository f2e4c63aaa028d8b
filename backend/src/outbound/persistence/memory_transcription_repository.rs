//! In-memory `TranscriptionRepository` adapter.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{TranscriptionPersistenceError, TranscriptionRepository};
use crate::domain::{Transcription, TranscriptionId, UserId};

#[derive(Debug, Default)]
struct TranscriptionTable {
    records: HashMap<TranscriptionId, Transcription>,
    by_user: HashMap<UserId, Vec<TranscriptionId>>,
}

/// Transcription store with a per-user index in creation order.
#[derive(Debug, Default)]
pub struct MemoryTranscriptionRepository {
    table: RwLock<TranscriptionTable>,
}

impl MemoryTranscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> TranscriptionPersistenceError {
    TranscriptionPersistenceError::query("transcription store lock poisoned")
}

#[async_trait]
impl TranscriptionRepository for MemoryTranscriptionRepository {
    async fn create(
        &self,
        transcription: &Transcription,
    ) -> Result<(), TranscriptionPersistenceError> {
        let mut table = self.table.write().map_err(poisoned)?;
        let id = transcription.id();
        if table.records.insert(id, transcription.clone()).is_none() {
            table
                .by_user
                .entry(transcription.user_id().clone())
                .or_default()
                .push(id);
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &TranscriptionId,
    ) -> Result<Option<Transcription>, TranscriptionPersistenceError> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.records.get(id).cloned())
    }

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Transcription>, TranscriptionPersistenceError> {
        let table = self.table.read().map_err(poisoned)?;
        let Some(ids) = table.by_user.get(user_id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| table.records.get(id))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        transcription: &Transcription,
    ) -> Result<(), TranscriptionPersistenceError> {
        let mut table = self.table.write().map_err(poisoned)?;
        match table.records.get_mut(&transcription.id()) {
            Some(existing) => {
                *existing = transcription.clone();
                Ok(())
            }
            None => Err(TranscriptionPersistenceError::not_found(
                transcription.id().to_string(),
            )),
        }
    }

    async fn delete(&self, id: &TranscriptionId) -> Result<(), TranscriptionPersistenceError> {
        let mut table = self.table.write().map_err(poisoned)?;
        let removed = table
            .records
            .remove(id)
            .ok_or_else(|| TranscriptionPersistenceError::not_found(id.to_string()))?;
        let owner = removed.user_id();
        let now_empty = match table.by_user.get_mut(owner) {
            Some(ids) => {
                ids.retain(|candidate| candidate != id);
                ids.is_empty()
            }
            None => false,
        };
        if now_empty {
            table.by_user.remove(owner);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn owner() -> UserId {
        UserId::random()
    }

    async fn seeded(owner: &UserId, count: usize) -> (MemoryTranscriptionRepository, Vec<TranscriptionId>) {
        let repo = MemoryTranscriptionRepository::new();
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let record = Transcription::new(owner.clone(), Utc::now());
            repo.create(&record).await.expect("create succeeds");
            ids.push(record.id());
        }
        (repo, ids)
    }

    fn ids_of(records: &[Transcription]) -> Vec<TranscriptionId> {
        records.iter().map(Transcription::id).collect()
    }

    #[rstest]
    #[tokio::test]
    async fn find_by_user_id_keeps_creation_order(owner: UserId) {
        let (repo, ids) = seeded(&owner, 3).await;
        let listed = repo.find_by_user_id(&owner).await.expect("listing");
        assert_eq!(ids_of(&listed), ids);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_user_has_empty_listing() {
        let repo = MemoryTranscriptionRepository::new();
        let listed = repo
            .find_by_user_id(&UserId::random())
            .await
            .expect("listing");
        assert!(listed.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn listings_are_scoped_to_owner(owner: UserId) {
        let (repo, ids) = seeded(&owner, 2).await;
        let stranger = UserId::random();
        repo.create(&Transcription::new(stranger.clone(), Utc::now()))
            .await
            .expect("create succeeds");

        assert_eq!(ids_of(&repo.find_by_user_id(&owner).await.expect("listing")), ids);
        assert_eq!(repo.find_by_user_id(&stranger).await.expect("listing").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_preserves_order_of_remaining_entries(owner: UserId) {
        let (repo, ids) = seeded(&owner, 3).await;
        let [first, middle, last] = ids.as_slice() else {
            panic!("expected three ids");
        };

        repo.delete(middle).await.expect("delete succeeds");

        let listed = repo.find_by_user_id(&owner).await.expect("listing");
        assert_eq!(ids_of(&listed), vec![*first, *last]);
        assert!(repo.find_by_id(middle).await.expect("lookup").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_last_entry_drops_the_index(owner: UserId) {
        let (repo, ids) = seeded(&owner, 1).await;
        for id in &ids {
            repo.delete(id).await.expect("delete succeeds");
        }
        assert!(repo.find_by_user_id(&owner).await.expect("listing").is_empty());
        let table = repo.table.read().expect("lock");
        assert!(!table.by_user.contains_key(&owner));
    }

    #[rstest]
    #[tokio::test]
    async fn update_replaces_record_and_missing_is_not_found(owner: UserId) {
        let repo = MemoryTranscriptionRepository::new();
        let mut record = Transcription::new(owner, Utc::now());

        let err = repo.update(&record).await.expect_err("unknown record");
        assert!(matches!(err, TranscriptionPersistenceError::NotFound { .. }));

        repo.create(&record).await.expect("create succeeds");
        record
            .complete("hello", 1.0, Utc::now())
            .expect("completion succeeds");
        repo.update(&record).await.expect("update succeeds");

        let stored = repo
            .find_by_id(&record.id())
            .await
            .expect("lookup")
            .expect("present");
        assert!(stored.is_completed());
        assert_eq!(stored.text(), "hello");
    }

    #[rstest]
    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let repo = MemoryTranscriptionRepository::new();
        let err = repo
            .delete(&TranscriptionId::random())
            .await
            .expect_err("unknown record");
        assert!(matches!(err, TranscriptionPersistenceError::NotFound { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_creates_are_all_indexed(owner: UserId) {
        let repo = std::sync::Arc::new(MemoryTranscriptionRepository::new());
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let repo = std::sync::Arc::clone(&repo);
                let owner = owner.clone();
                tokio::spawn(async move {
                    repo.create(&Transcription::new(owner, Utc::now())).await
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("task completes").expect("create succeeds");
        }
        assert_eq!(repo.find_by_user_id(&owner).await.expect("listing").len(), 16);
    }
}
