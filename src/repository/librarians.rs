//! Staff registry store operations

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::librarian::{Librarian, LibrarianPatch, LibrarianQuery, NewLibrarian};

/// Persistence contract for the staff registry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibrarianRepository: Send + Sync {
    async fn insert(&self, librarian: NewLibrarian) -> AppResult<Librarian>;

    async fn get(&self, id: i32) -> AppResult<Librarian>;

    /// Librarian holding `employee_id`, ignoring the one identified by
    /// `exclude_id`
    async fn find_by_employee_id(
        &self,
        employee_id: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<Option<Librarian>>;

    /// Filtered page of librarians plus the total match count
    async fn list(&self, query: &LibrarianQuery) -> AppResult<(Vec<Librarian>, i64)>;

    async fn update(&self, id: i32, patch: &LibrarianPatch) -> AppResult<Librarian>;

    /// Removes the librarian; ledger records keep their history but lose
    /// the reference
    async fn delete(&self, id: i32) -> AppResult<()>;
}
