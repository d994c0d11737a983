/*!
 * Content store boundary.
 *
 * The portal keeps content records in a remote database; this crate only
 * needs the two operations the editor and reader paths use, plus `insert`
 * for importing content. Implementations:
 * - `MemoryContentStore` for tests and embedding
 * - `SqliteContentStore` for the local CLI
 */

use async_trait::async_trait;

use crate::content::record::{ContentRecord, ContentUpdate, NewContent};
use crate::errors::StoreError;

pub mod connection;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use connection::DatabaseConnection;
pub use memory::MemoryContentStore;
pub use sqlite::SqliteContentStore;

/// Access to stored content records
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a record by id. A missing record is `StoreError::NotFound`.
    async fn get(&self, id: &str) -> Result<ContentRecord, StoreError>;

    /// Apply a partial update. Fields left as `None` keep their stored value.
    async fn update(&self, id: &str, update: ContentUpdate) -> Result<(), StoreError>;

    /// Create a record and return it with its assigned id.
    async fn insert(&self, content: NewContent) -> Result<ContentRecord, StoreError>;
}
