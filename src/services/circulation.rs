//! Circulation service: checkout, return and due-date management

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::borrowing::{
        BorrowingDetails, BorrowingPatch, BorrowingQuery, BorrowingRecord, BorrowingStatus,
        CreateBorrowing, NewBorrowing,
    },
    repository::Repository,
    sequence::SequenceGenerator,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    fine_per_day: Decimal,
    clock: Arc<dyn Clock>,
    sequences: Arc<dyn SequenceGenerator>,
    checkout_lock: Arc<Mutex<()>>,
}

impl CirculationService {
    pub fn new(
        repository: Repository,
        fine_per_day: Decimal,
        clock: Arc<dyn Clock>,
        sequences: Arc<dyn SequenceGenerator>,
    ) -> Self {
        Self {
            repository,
            fine_per_day,
            clock,
            sequences,
            checkout_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Check a book out to a member
    pub async fn checkout(&self, borrowing: CreateBorrowing) -> AppResult<BorrowingRecord> {
        borrowing.validate()?;

        let fine_per_day = borrowing.fine_per_day.unwrap_or(self.fine_per_day);
        if fine_per_day < Decimal::ZERO {
            return Err(AppError::Validation(
                "Fine per day must not be negative".to_string(),
            ));
        }

        let today = self.clock.today();
        let borrow_date = borrowing.borrow_date.unwrap_or(today);
        if borrowing.expected_return_date <= borrow_date {
            return Err(AppError::Validation(format!(
                "Expected return date {} must be after the borrow date {}",
                borrowing.expected_return_date, borrow_date
            )));
        }

        // No other checkout may run between the capacity checks and the insert
        let _guard = self.checkout_lock.lock().await;

        // Verify member exists and has borrowing capacity left
        let member = self.repository.members.get(borrowing.member_id).await?;
        let borrowed = self
            .repository
            .borrowings
            .count_for_member(member.id, &[BorrowingStatus::Borrowed])
            .await?;
        let limit = member.max_borrow_limit();
        if borrowed >= i64::from(limit) {
            return Err(AppError::LimitExceeded {
                member: member.name,
                limit,
            });
        }

        // Verify a copy is on the shelf
        let book = self.repository.books.get(borrowing.book_id).await?;
        let active_loans = self
            .repository
            .borrowings
            .count_for_book(book.id, &BorrowingStatus::ACTIVE)
            .await?;
        if i64::from(book.total_copies) - active_loans < 1 {
            return Err(AppError::NotAvailable { book: book.title });
        }

        // Verify the processing librarian exists
        let librarian = self
            .repository
            .librarians
            .get(borrowing.librarian_id)
            .await?;

        // A backdated transaction whose due date already passed starts out overdue
        let days_overdue = (today - borrowing.expected_return_date).num_days().max(0);
        let status = if days_overdue > 0 {
            BorrowingStatus::Overdue
        } else {
            BorrowingStatus::Borrowed
        };

        self.repository
            .borrowings
            .insert(NewBorrowing {
                record_number: self.sequences.record_number(),
                member_id: member.id,
                book_id: book.id,
                librarian_id: librarian.id,
                borrow_date,
                expected_return_date: borrowing.expected_return_date,
                status,
                fine_per_day,
                days_overdue,
                fine_amount: Decimal::from(days_overdue) * fine_per_day,
                notes: borrowing.notes,
            })
            .await
    }

    /// Return a borrowed book, freezing the accrued fine on the record
    pub async fn return_book(&self, id: i32) -> AppResult<BorrowingRecord> {
        let record = self.repository.borrowings.get(id).await?;
        if record.status == BorrowingStatus::Returned {
            return Err(AppError::AlreadyReturned);
        }

        let today = self.clock.today();
        if today < record.borrow_date {
            return Err(AppError::Validation(format!(
                "Return date {} is before the borrow date {}",
                today, record.borrow_date
            )));
        }

        let days_overdue = (today - record.expected_return_date).num_days().max(0);
        let patch = BorrowingPatch {
            status: Some(BorrowingStatus::Returned),
            actual_return_date: Some(today),
            days_overdue: Some(days_overdue),
            fine_amount: Some(Decimal::from(days_overdue) * record.fine_per_day),
            ..Default::default()
        };
        self.repository.borrowings.update(id, &patch).await
    }

    /// Move the due date of a borrowed record further out
    pub async fn extend_due_date(
        &self,
        id: i32,
        new_expected_return_date: NaiveDate,
    ) -> AppResult<BorrowingRecord> {
        let record = self.repository.borrowings.get(id).await?;
        match record.status {
            BorrowingStatus::Returned => return Err(AppError::AlreadyReturned),
            BorrowingStatus::Overdue => {
                return Err(AppError::Validation(format!(
                    "Only borrowed records can be extended; record \"{}\" is overdue",
                    record.record_number
                )));
            }
            BorrowingStatus::Borrowed => {}
        }
        if new_expected_return_date <= record.expected_return_date {
            return Err(AppError::Validation(format!(
                "New expected return date {} must be after the current one {}",
                new_expected_return_date, record.expected_return_date
            )));
        }

        let patch = BorrowingPatch {
            expected_return_date: Some(new_expected_return_date),
            ..Default::default()
        };
        self.repository.borrowings.update(id, &patch).await
    }

    /// Get a ledger record with display enrichment
    pub async fn get_details(&self, id: i32) -> AppResult<BorrowingDetails> {
        let record = self.repository.borrowings.get(id).await?;
        self.into_details(self.with_live_overdue(record)).await
    }

    /// Search the ledger
    pub async fn list(&self, query: &BorrowingQuery) -> AppResult<(Vec<BorrowingDetails>, i64)> {
        let (records, total) = self.repository.borrowings.list(query).await?;

        let mut details = Vec::with_capacity(records.len());
        for record in records {
            details.push(self.into_details(self.with_live_overdue(record)).await?);
        }

        Ok((details, total))
    }

    /// Full borrowing history for one member, newest first
    pub async fn member_borrowings(&self, member_id: i32) -> AppResult<Vec<BorrowingDetails>> {
        // Verify member exists
        self.repository.members.get(member_id).await?;

        let records = self.repository.borrowings.list_for_member(member_id).await?;
        let mut details = Vec::with_capacity(records.len());
        for record in records {
            details.push(self.into_details(self.with_live_overdue(record)).await?);
        }

        Ok(details)
    }

    /// Delete a returned ledger record
    pub async fn delete_record(&self, id: i32) -> AppResult<()> {
        let record = self.repository.borrowings.get(id).await?;
        if record.is_active() {
            return Err(AppError::ActiveRecordUndeletable {
                record: record.record_number,
                status: record.status.as_str().to_string(),
            });
        }
        self.repository.borrowings.delete(id).await
    }

    /// Active records are remeasured against the calendar so responses never
    /// lag behind the sweeper
    fn with_live_overdue(&self, mut record: BorrowingRecord) -> BorrowingRecord {
        if record.is_active() {
            let days_overdue = record.days_overdue_as_of(self.clock.today());
            record.days_overdue = days_overdue;
            record.fine_amount = Decimal::from(days_overdue) * record.fine_per_day;
        }
        record
    }

    async fn into_details(&self, record: BorrowingRecord) -> AppResult<BorrowingDetails> {
        let member = self.repository.members.get(record.member_id).await?;
        let book = self.repository.books.get(record.book_id).await?;
        let display_name = record.display_name(&member.name, &book.title);

        Ok(BorrowingDetails {
            record,
            member_name: member.name,
            book_title: book.title,
            display_name,
        })
    }
}
