//! Book use-case service.
//!
//! Sits between the HTTP handlers and the [`BookStore`]: checks id shape,
//! turns listing parameters into a filtered page query and maps store
//! outcomes onto [`ServiceError`] categories.

use std::sync::Arc;

use crate::api::ListParams;
use crate::error::{ServiceError, from_store};
use crate::id::normalize_id;
use crate::model::{Book, NewBook, UpdateBook};
use crate::store::{BookFilter, BookStore, FindOptions, is_valid_id};

const NOT_FOUND: &str = "Book not found";
const INVALID_ID: &str = "Invalid ID";

#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// One page of books, optionally narrowed to titles containing the
    /// keyword. Bad pagination input has already been defaulted by
    /// [`ListParams`], so only a store fault can fail here.
    pub async fn list_books(&self, params: &ListParams) -> Result<Vec<Book>, ServiceError> {
        let filter = BookFilter {
            title_contains: params.keyword.clone(),
        };
        let opts = FindOptions {
            limit: params.limit(),
            skip: params.skip(),
        };

        self.store
            .find(&filter, opts)
            .await
            .map_err(|e| from_store("Failed to list books", e))
    }

    pub async fn create_book(&self, book: NewBook) -> Result<Book, ServiceError> {
        let book = self
            .store
            .create(book)
            .await
            .map_err(|e| from_store("Failed to create book", e))?;

        tracing::info!(id = %book.id, "created book");
        Ok(book)
    }

    pub async fn get_book(&self, id: &str) -> Result<Book, ServiceError> {
        let id = checked_id(id)?;

        self.store
            .find_by_id(&id)
            .await
            .map_err(|e| from_store("Failed to get book", e))?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn update_book(&self, id: &str, changes: UpdateBook) -> Result<Book, ServiceError> {
        let id = checked_id(id)?;

        let book = self
            .store
            .find_by_id_and_update(&id, changes)
            .await
            .map_err(|e| from_store("Failed to update book", e))?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.to_string()))?;

        tracing::info!(id = %book.id, "updated book");
        Ok(book)
    }

    /// Deletes and returns the book. The id is checked before the store is
    /// touched; the delete itself is a single store call, so a book removed
    /// by someone else shows up as `NotFound`, and only a store fault as
    /// `Internal`.
    pub async fn delete_book(&self, id: &str) -> Result<Book, ServiceError> {
        let id = checked_id(id)?;

        let deleted = self.store.find_by_id_and_delete(&id).await.map_err(|e| {
            tracing::error!(id = %id, error = %crate::unpack_error(&e), "delete failed");
            ServiceError::Internal("An error occurred while deleting the book".to_string())
        })?;

        match deleted {
            Some(book) => {
                tracing::info!(id = %book.id, "deleted book");
                Ok(book)
            }
            None => Err(ServiceError::NotFound(NOT_FOUND.to_string())),
        }
    }

    pub async fn book_exists(&self, id: &str) -> Result<bool, ServiceError> {
        let id = checked_id(id)?;

        self.store
            .exists(&id)
            .await
            .map_err(|e| from_store("Failed to check book", e))
    }
}

fn checked_id(id: &str) -> Result<String, ServiceError> {
    if is_valid_id(id) {
        Ok(normalize_id(id))
    } else {
        Err(ServiceError::InvalidInput(INVALID_ID.to_string()))
    }
}
