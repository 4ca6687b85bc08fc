use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::LatencyConfig;
use crate::model::{Entity, Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound {
        entity: &'static str,
        id: RecordId,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-operation delay applied before a store touches its collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latency {
    pub get_all: Duration,
    pub get_by_id: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Latency {
    pub fn none() -> Self {
        Self::default()
    }
}

impl From<&LatencyConfig> for Latency {
    fn from(cfg: &LatencyConfig) -> Self {
        Self {
            get_all: Duration::from_millis(cfg.get_all_ms),
            get_by_id: Duration::from_millis(cfg.get_by_id_ms),
            create: Duration::from_millis(cfg.create_ms),
            update: Duration::from_millis(cfg.update_ms),
            delete: Duration::from_millis(cfg.delete_ms),
        }
    }
}

async fn pause(d: Duration) {
    if !d.is_zero() {
        tokio::time::sleep(d).await;
    }
}

/// In-memory, insertion-ordered CRUD collection for one entity type.
///
/// Every read hands out clones; callers never hold references into the
/// collection.
pub struct DataStore<T: Entity> {
    records: RwLock<Vec<Record<T>>>,
    latency: Latency,
}

impl<T: Entity> DataStore<T> {
    pub fn new(seed: Vec<Record<T>>, latency: Latency) -> Self {
        Self {
            records: RwLock::new(seed),
            latency,
        }
    }

    fn not_found(id: RecordId) -> StoreError {
        StoreError::NotFound {
            entity: T::NAME,
            id,
        }
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns a `Result` like the other operations so page loaders can fan
    /// in over every store uniformly.
    pub async fn get_all(&self) -> StoreResult<Vec<Record<T>>> {
        pause(self.latency.get_all).await;
        Ok(self.records.read().await.clone())
    }

    pub async fn get_by_id(&self, id: RecordId) -> StoreResult<Record<T>> {
        pause(self.latency.get_by_id).await;
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    /// Appends a record with `Id = max(existing) + 1`, or 1 for an empty
    /// collection. Freed ids are reused when they are again the maximum.
    pub async fn create(&self, data: T) -> StoreResult<Record<T>> {
        pause(self.latency.create).await;
        let mut records = self.records.write().await;
        let id = records.iter().map(|r| r.id).max().map_or(1, |max| max + 1);
        let rec = Record { id, data };
        records.push(rec.clone());
        debug!(entity = T::NAME, id, "record created");
        Ok(rec)
    }

    pub async fn update(&self, id: RecordId, patch: T::Patch) -> StoreResult<Record<T>> {
        pause(self.latency.update).await;
        let mut records = self.records.write().await;
        let rec = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        rec.data.apply(patch);
        debug!(entity = T::NAME, id, "record updated");
        Ok(rec.clone())
    }

    pub async fn delete(&self, id: RecordId) -> StoreResult<()> {
        pause(self.latency.delete).await;
        let mut records = self.records.write().await;
        let idx = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        records.remove(idx);
        debug!(entity = T::NAME, id, "record deleted");
        Ok(())
    }
}
