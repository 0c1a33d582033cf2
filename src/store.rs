//! The book collection as seen by the service layer.
//!
//! Absence is never an error here: lookups, updates and deletes report a
//! missing id as `Ok(None)` and leave the translation to the caller.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Book, NewBook, UpdateBook};

pub use crate::id::is_valid_id;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    /// Case-insensitive substring of the title, matched literally.
    pub title_contains: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    pub limit: u64,
    pub skip: u64,
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Books matching `filter` in insertion order, honoring skip then limit.
    async fn find(&self, filter: &BookFilter, opts: FindOptions) -> Result<Vec<Book>, StoreError>;

    async fn create(&self, book: NewBook) -> Result<Book, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, StoreError>;

    /// Applies `changes`, validates the merged document and returns the
    /// post-update state.
    async fn find_by_id_and_update(
        &self,
        id: &str,
        changes: UpdateBook,
    ) -> Result<Option<Book>, StoreError>;

    /// Removes the book in one step and returns what was removed.
    async fn find_by_id_and_delete(&self, id: &str) -> Result<Option<Book>, StoreError>;

    async fn exists(&self, id: &str) -> Result<bool, StoreError>;
}
