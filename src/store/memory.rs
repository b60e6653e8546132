//! In-process student store.

use super::{StoreError, StudentStore};
use crate::students::{NewStudent, Student, StudentId, StudentUpdate};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Student store held entirely in memory.
///
/// Updates run as a read-modify-write under the write lock, so the returned record always
/// reflects the write that produced it.
#[derive(Default)]
pub struct MemoryStudentStore {
    records: RwLock<HashMap<StudentId, Student>>,
}

impl MemoryStudentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn insert(&self, student: NewStudent) -> Result<StudentId, StoreError> {
        let mut records = self.records.write().await;
        let mut id = StudentId::generate();
        while records.contains_key(&id) {
            id = StudentId::generate();
        }
        records.insert(id, student.into_student(id));
        tracing::debug!(%id, "Inserted student into memory store");
        Ok(id)
    }

    async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_all(&self, limit: usize) -> Result<Vec<Student>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_by_id(
        &self,
        id: StudentId,
        update: StudentUpdate,
    ) -> Result<Option<Student>, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|student| {
            update.apply_to(student);
            student.clone()
        }))
    }

    async fn delete_by_id(&self, id: StudentId) -> Result<u64, StoreError> {
        let removed = self.records.write().await.remove(&id);
        Ok(u64::from(removed.is_some()))
    }
}
