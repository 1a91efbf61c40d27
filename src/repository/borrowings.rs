//! Borrowing ledger store operations

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::AppResult;
use crate::models::borrowing::{
    BorrowingPatch, BorrowingQuery, BorrowingRecord, BorrowingStatus, NewBorrowing,
};

/// Persistence contract for the borrowing ledger
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowingRepository: Send + Sync {
    async fn insert(&self, record: NewBorrowing) -> AppResult<BorrowingRecord>;

    async fn get(&self, id: i32) -> AppResult<BorrowingRecord>;

    /// Filtered page of ledger records plus the total match count,
    /// newest borrow date first
    async fn list(&self, query: &BorrowingQuery) -> AppResult<(Vec<BorrowingRecord>, i64)>;

    /// Every record for one member, newest borrow date first
    async fn list_for_member(&self, member_id: i32) -> AppResult<Vec<BorrowingRecord>>;

    /// Records in `status` whose expected return date is before `date`,
    /// oldest due date first
    async fn due_before(
        &self,
        date: NaiveDate,
        status: BorrowingStatus,
    ) -> AppResult<Vec<BorrowingRecord>>;

    /// Count of the member's records in any of `statuses`; an empty slice
    /// counts every status
    async fn count_for_member(&self, member_id: i32, statuses: &[BorrowingStatus])
        -> AppResult<i64>;

    /// Count of the book's records in any of `statuses`; an empty slice
    /// counts every status
    async fn count_for_book(&self, book_id: i32, statuses: &[BorrowingStatus]) -> AppResult<i64>;

    /// Records processed by this librarian, any status
    async fn count_for_librarian(&self, librarian_id: i32) -> AppResult<i64>;

    async fn count_by_status(&self, status: BorrowingStatus) -> AppResult<i64>;

    /// Sum of fine amounts across the whole ledger
    async fn sum_fines(&self) -> AppResult<Decimal>;

    async fn has_any_for_member(&self, member_id: i32) -> AppResult<bool>;

    async fn has_any_for_book(&self, book_id: i32) -> AppResult<bool>;

    async fn update(&self, id: i32, patch: &BorrowingPatch) -> AppResult<BorrowingRecord>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}
