//! PostgreSQL borrowing ledger store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, Pool, Postgres};

use crate::error::{AppError, AppResult};
use crate::models::borrowing::{
    BorrowingPatch, BorrowingQuery, BorrowingRecord, BorrowingStatus, NewBorrowing,
};
use crate::repository::BorrowingRepository;

#[derive(Clone)]
pub struct PgBorrowingRepository {
    pool: Pool<Postgres>,
}

impl PgBorrowingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct BorrowingRow {
    id: i32,
    record_number: String,
    member_id: i32,
    book_id: i32,
    librarian_id: Option<i32>,
    borrow_date: NaiveDate,
    expected_return_date: NaiveDate,
    actual_return_date: Option<NaiveDate>,
    status: String,
    fine_per_day: Decimal,
    days_overdue: i64,
    fine_amount: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BorrowingRow> for BorrowingRecord {
    fn from(row: BorrowingRow) -> Self {
        BorrowingRecord {
            id: row.id,
            record_number: row.record_number,
            member_id: row.member_id,
            book_id: row.book_id,
            librarian_id: row.librarian_id,
            borrow_date: row.borrow_date,
            expected_return_date: row.expected_return_date,
            actual_return_date: row.actual_return_date,
            status: row.status.parse().unwrap_or(BorrowingStatus::Borrowed),
            fine_per_day: row.fine_per_day,
            days_overdue: row.days_overdue,
            fine_amount: row.fine_amount,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const RECORD_COLUMNS: &str = "id, record_number, member_id, book_id, librarian_id, \
     borrow_date, expected_return_date, actual_return_date, status, fine_per_day, \
     days_overdue, fine_amount, notes, created_at, updated_at";

fn status_filter(statuses: &[BorrowingStatus]) -> Option<Vec<String>> {
    if statuses.is_empty() {
        None
    } else {
        Some(statuses.iter().map(|s| s.as_str().to_string()).collect())
    }
}

#[async_trait]
impl BorrowingRepository for PgBorrowingRepository {
    async fn insert(&self, record: NewBorrowing) -> AppResult<BorrowingRecord> {
        let sql = format!(
            r#"
            INSERT INTO borrowing_records
                (record_number, member_id, book_id, librarian_id, borrow_date,
                 expected_return_date, status, fine_per_day, days_overdue,
                 fine_amount, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );

        let row = sqlx::query_as::<_, BorrowingRow>(&sql)
            .bind(&record.record_number)
            .bind(record.member_id)
            .bind(record.book_id)
            .bind(record.librarian_id)
            .bind(record.borrow_date)
            .bind(record.expected_return_date)
            .bind(record.status.as_str())
            .bind(record.fine_per_day)
            .bind(record.days_overdue)
            .bind(record.fine_amount)
            .bind(&record.notes)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn get(&self, id: i32) -> AppResult<BorrowingRecord> {
        let sql = format!(
            "SELECT {} FROM borrowing_records WHERE id = $1",
            RECORD_COLUMNS
        );

        let row = sqlx::query_as::<_, BorrowingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Borrowing record with id {} not found", id))
            })?;

        Ok(row.into())
    }

    async fn list(&self, query: &BorrowingQuery) -> AppResult<(Vec<BorrowingRecord>, i64)> {
        let status = query.status.map(|s| s.as_str());
        let sql = format!(
            r#"
            SELECT {}
            FROM borrowing_records
            WHERE ($1::int4 IS NULL OR member_id = $1)
              AND ($2::int4 IS NULL OR book_id = $2)
              AND ($3::int4 IS NULL OR librarian_id = $3)
              AND ($4::text IS NULL OR status = $4)
            ORDER BY borrow_date DESC, id DESC
            LIMIT $5 OFFSET $6
            "#,
            RECORD_COLUMNS
        );

        let rows = sqlx::query_as::<_, BorrowingRow>(&sql)
            .bind(query.member_id)
            .bind(query.book_id)
            .bind(query.librarian_id)
            .bind(status)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM borrowing_records
            WHERE ($1::int4 IS NULL OR member_id = $1)
              AND ($2::int4 IS NULL OR book_id = $2)
              AND ($3::int4 IS NULL OR librarian_id = $3)
              AND ($4::text IS NULL OR status = $4)
            "#,
        )
        .bind(query.member_id)
        .bind(query.book_id)
        .bind(query.librarian_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(BorrowingRecord::from).collect(), total))
    }

    async fn list_for_member(&self, member_id: i32) -> AppResult<Vec<BorrowingRecord>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM borrowing_records
            WHERE member_id = $1
            ORDER BY borrow_date DESC, id DESC
            "#,
            RECORD_COLUMNS
        );

        let rows = sqlx::query_as::<_, BorrowingRow>(&sql)
            .bind(member_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BorrowingRecord::from).collect())
    }

    async fn due_before(
        &self,
        date: NaiveDate,
        status: BorrowingStatus,
    ) -> AppResult<Vec<BorrowingRecord>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM borrowing_records
            WHERE status = $1 AND expected_return_date < $2
            ORDER BY expected_return_date, id
            "#,
            RECORD_COLUMNS
        );

        let rows = sqlx::query_as::<_, BorrowingRow>(&sql)
            .bind(status.as_str())
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BorrowingRecord::from).collect())
    }

    async fn count_for_member(
        &self,
        member_id: i32,
        statuses: &[BorrowingStatus],
    ) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM borrowing_records
            WHERE member_id = $1
              AND ($2::text[] IS NULL OR status = ANY($2))
            "#,
        )
        .bind(member_id)
        .bind(status_filter(statuses))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_for_book(&self, book_id: i32, statuses: &[BorrowingStatus]) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM borrowing_records
            WHERE book_id = $1
              AND ($2::text[] IS NULL OR status = ANY($2))
            "#,
        )
        .bind(book_id)
        .bind(status_filter(statuses))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_for_librarian(&self, librarian_id: i32) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM borrowing_records WHERE librarian_id = $1",
        )
        .bind(librarian_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_by_status(&self, status: BorrowingStatus) -> AppResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM borrowing_records WHERE status = $1")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn sum_fines(&self) -> AppResult<Decimal> {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(fine_amount), 0) FROM borrowing_records",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn has_any_for_member(&self, member_id: i32) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM borrowing_records WHERE member_id = $1)",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn has_any_for_book(&self, book_id: i32) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM borrowing_records WHERE book_id = $1)",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, id: i32, patch: &BorrowingPatch) -> AppResult<BorrowingRecord> {
        let sql = format!(
            r#"
            UPDATE borrowing_records SET
                status = COALESCE($2::text, status),
                expected_return_date = COALESCE($3::date, expected_return_date),
                actual_return_date = COALESCE($4::date, actual_return_date),
                days_overdue = COALESCE($5::int8, days_overdue),
                fine_amount = COALESCE($6::numeric, fine_amount),
                notes = COALESCE($7::text, notes),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );

        let row = sqlx::query_as::<_, BorrowingRow>(&sql)
            .bind(id)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.expected_return_date)
            .bind(patch.actual_return_date)
            .bind(patch.days_overdue)
            .bind(patch.fine_amount)
            .bind(patch.notes.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Borrowing record with id {} not found", id))
            })?;

        Ok(row.into())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM borrowing_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Borrowing record with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
