//! Book catalog store operations

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::book::{Book, BookPatch, BookQuery, NewBook};

/// Persistence contract for the catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn insert(&self, book: NewBook) -> AppResult<Book>;

    async fn get(&self, id: i32) -> AppResult<Book>;

    /// Book registered under `isbn`, ignoring the one identified by
    /// `exclude_id`
    async fn find_by_isbn(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<Option<Book>>;

    /// Filtered page of books plus the total match count
    async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)>;

    /// Every book, unpaged (batch jobs and statistics)
    async fn all(&self) -> AppResult<Vec<Book>>;

    async fn update(&self, id: i32, patch: &BookPatch) -> AppResult<Book>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}
