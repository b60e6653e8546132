//! Document store seam for student records.
//!
//! Handlers talk to storage only through [`StudentStore`]. Two backends are provided: the
//! MongoDB-backed [`MongoStudentStore`] used in production, and [`MemoryStudentStore`], an
//! in-process map useful for tests and for running the API without a database.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStudentStore;
pub use mongo::MongoStudentStore;

use crate::students::{NewStudent, Student, StudentId, StudentUpdate};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The MongoDB driver reported a failure (connection, timeout, server error, decoding).
    #[error("MongoDB request failed: {0}")]
    Mongo(#[from] mongodb::error::Error),
    /// A stored document could not be mapped onto a student record.
    #[error("Malformed student document: {0}")]
    MalformedDocument(String),
}

/// Operations the HTTP surface needs from a student store.
///
/// Implementations must be safe to share across concurrently running request handlers.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Insert a new record and return the identifier assigned by the store.
    async fn insert(&self, student: NewStudent) -> Result<StudentId, StoreError>;

    /// Look up a record by id.
    async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, StoreError>;

    /// Return up to `limit` records in no particular order.
    async fn find_all(&self, limit: usize) -> Result<Vec<Student>, StoreError>;

    /// Atomically apply `update` to the matching record and return its post-update state.
    async fn update_by_id(
        &self,
        id: StudentId,
        update: StudentUpdate,
    ) -> Result<Option<Student>, StoreError>;

    /// Delete the matching record, returning how many records were removed.
    async fn delete_by_id(&self, id: StudentId) -> Result<u64, StoreError>;

    /// Verify the store is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Release pooled resources at process exit.
    async fn shutdown(&self) {}
}
