/*!
 * In-memory content store.
 */

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::ContentStore;
use crate::content::record::{ContentRecord, ContentUpdate, NewContent};
use crate::errors::StoreError;

/// Content store backed by a shared map. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    records: Arc<RwLock<HashMap<String, ContentRecord>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current copy of a record, without going through the async API
    pub fn snapshot(&self, id: &str) -> Option<ContentRecord> {
        self.records.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn get(&self, id: &str) -> Result<ContentRecord, StoreError> {
        self.snapshot(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, update: ContentUpdate) -> Result<(), StoreError> {
        let mut records = self.records.write();
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.apply(&update);
        record.updated_at = Some(Utc::now());
        debug!("Updated content {} in memory", id);
        Ok(())
    }

    async fn insert(&self, content: NewContent) -> Result<ContentRecord, StoreError> {
        let record = ContentRecord {
            id: Uuid::new_v4().to_string(),
            title: content.title,
            document: content.document,
            title_secondary: content.title_secondary,
            document_secondary: content.document_secondary,
            status: content.status,
            updated_at: Some(Utc::now()),
        };
        self.records.write().insert(record.id.clone(), record.clone());
        Ok(record)
    }
}
