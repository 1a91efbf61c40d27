//! In-memory store for development and tests

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use super::{BookRepository, BorrowingRepository, LibrarianRepository, MemberRepository};
use crate::error::{AppError, AppResult};
use crate::models::book::{Book, BookPatch, BookQuery, NewBook};
use crate::models::borrowing::{
    BorrowingPatch, BorrowingQuery, BorrowingRecord, BorrowingStatus, NewBorrowing,
};
use crate::models::librarian::{Librarian, LibrarianPatch, LibrarianQuery, NewLibrarian};
use crate::models::member::{Member, MemberPatch, MemberQuery, MemberStatus, NewMember};

#[derive(Default)]
struct Tables {
    members: IndexMap<i32, Member>,
    books: IndexMap<i32, Book>,
    librarians: IndexMap<i32, Librarian>,
    borrowings: IndexMap<i32, BorrowingRecord>,
    next_member_id: i32,
    next_book_id: i32,
    next_librarian_id: i32,
    next_borrowing_id: i32,
}

/// Shared in-process tables.
///
/// All four repository handles point at the same `RwLock`, so a librarian
/// deletion clears ledger references in the same critical section.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> MemoryMemberRepository {
        MemoryMemberRepository {
            store: self.clone(),
        }
    }

    pub fn books(&self) -> MemoryBookRepository {
        MemoryBookRepository {
            store: self.clone(),
        }
    }

    pub fn librarians(&self) -> MemoryLibrarianRepository {
        MemoryLibrarianRepository {
            store: self.clone(),
        }
    }

    pub fn borrowings(&self) -> MemoryBorrowingRepository {
        MemoryBorrowingRepository {
            store: self.clone(),
        }
    }
}

fn paginate<T>(mut rows: Vec<T>, limit: i64, offset: i64) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let offset = offset.max(0) as usize;
    let limit = limit.max(0) as usize;
    if offset >= rows.len() {
        return (Vec::new(), total);
    }
    rows.drain(..offset);
    rows.truncate(limit);
    (rows, total)
}

fn member_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Member with id {} not found", id))
}

fn book_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Book with id {} not found", id))
}

fn librarian_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Librarian with id {} not found", id))
}

fn borrowing_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Borrowing record with id {} not found", id))
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MemoryMemberRepository {
    store: MemoryStore,
}

fn member_matches(member: &Member, query: &MemberQuery) -> bool {
    if let Some(ref name) = query.name {
        if !member.name.to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }
    if let Some(status) = query.status {
        if member.status != status {
            return false;
        }
    }
    if let Some(ref phone) = query.phone {
        if &member.phone != phone {
            return false;
        }
    }
    true
}

#[async_trait]
impl MemberRepository for MemoryMemberRepository {
    async fn insert(&self, member: NewMember) -> AppResult<Member> {
        let mut tables = self.store.tables.write().await;
        tables.next_member_id += 1;
        let id = tables.next_member_id;
        let now = Utc::now();
        let member = Member {
            id,
            member_number: member.member_number,
            name: member.name,
            email: member.email,
            phone: member.phone,
            join_date: member.join_date,
            status: member.status,
            created_at: now,
            updated_at: now,
        };
        tables.members.insert(id, member.clone());
        Ok(member)
    }

    async fn get(&self, id: i32) -> AppResult<Member> {
        let tables = self.store.tables.read().await;
        tables
            .members
            .get(&id)
            .cloned()
            .ok_or_else(|| member_not_found(id))
    }

    async fn phone_holder(
        &self,
        phone: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<Option<Member>> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .members
            .values()
            .find(|m| {
                m.phone == phone && m.status != MemberStatus::Inactive && Some(m.id) != exclude_id
            })
            .cloned())
    }

    async fn list(&self, query: &MemberQuery) -> AppResult<(Vec<Member>, i64)> {
        let tables = self.store.tables.read().await;
        let mut members: Vec<Member> = tables
            .members
            .values()
            .filter(|m| member_matches(m, query))
            .cloned()
            .collect();
        members.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(paginate(members, query.limit(), query.offset()))
    }

    async fn all(&self) -> AppResult<Vec<Member>> {
        let tables = self.store.tables.read().await;
        let mut members: Vec<Member> = tables.members.values().cloned().collect();
        members.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(members)
    }

    async fn update(&self, id: i32, patch: &MemberPatch) -> AppResult<Member> {
        let mut tables = self.store.tables.write().await;
        let member = tables
            .members
            .get_mut(&id)
            .ok_or_else(|| member_not_found(id))?;
        if let Some(ref name) = patch.name {
            member.name = name.clone();
        }
        if let Some(ref email) = patch.email {
            member.email = email.clone();
        }
        if let Some(ref phone) = patch.phone {
            member.phone = phone.clone();
        }
        if let Some(status) = patch.status {
            member.status = status;
        }
        member.updated_at = Utc::now();
        Ok(member.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.store.tables.write().await;
        if tables.members.shift_remove(&id).is_none() {
            return Err(member_not_found(id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MemoryBookRepository {
    store: MemoryStore,
}

fn book_matches(book: &Book, query: &BookQuery) -> bool {
    if let Some(ref title) = query.title {
        if !book.title.to_lowercase().contains(&title.to_lowercase()) {
            return false;
        }
    }
    if let Some(ref author) = query.author {
        if !book.author.to_lowercase().contains(&author.to_lowercase()) {
            return false;
        }
    }
    if let Some(ref isbn) = query.isbn {
        if &book.isbn != isbn {
            return false;
        }
    }
    if let Some(category) = query.category {
        if book.category != category {
            return false;
        }
    }
    true
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn insert(&self, book: NewBook) -> AppResult<Book> {
        let mut tables = self.store.tables.write().await;
        tables.next_book_id += 1;
        let id = tables.next_book_id;
        let now = Utc::now();
        let book = Book {
            id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            category: book.category,
            total_copies: book.total_copies,
            publication_year: book.publication_year,
            publisher: book.publisher,
            description: book.description,
            created_at: now,
            updated_at: now,
        };
        tables.books.insert(id, book.clone());
        Ok(book)
    }

    async fn get(&self, id: i32) -> AppResult<Book> {
        let tables = self.store.tables.read().await;
        tables
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| book_not_found(id))
    }

    async fn find_by_isbn(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<Option<Book>> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .books
            .values()
            .find(|b| b.isbn == isbn && Some(b.id) != exclude_id)
            .cloned())
    }

    async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let tables = self.store.tables.read().await;
        let mut books: Vec<Book> = tables
            .books
            .values()
            .filter(|b| book_matches(b, query))
            .cloned()
            .collect();
        books.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(paginate(books, query.limit(), query.offset()))
    }

    async fn all(&self) -> AppResult<Vec<Book>> {
        let tables = self.store.tables.read().await;
        let mut books: Vec<Book> = tables.books.values().cloned().collect();
        books.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(books)
    }

    async fn update(&self, id: i32, patch: &BookPatch) -> AppResult<Book> {
        let mut tables = self.store.tables.write().await;
        let book = tables
            .books
            .get_mut(&id)
            .ok_or_else(|| book_not_found(id))?;
        if let Some(ref title) = patch.title {
            book.title = title.clone();
        }
        if let Some(ref author) = patch.author {
            book.author = author.clone();
        }
        if let Some(ref isbn) = patch.isbn {
            book.isbn = isbn.clone();
        }
        if let Some(category) = patch.category {
            book.category = category;
        }
        if let Some(total_copies) = patch.total_copies {
            book.total_copies = total_copies;
        }
        if let Some(year) = patch.publication_year {
            book.publication_year = Some(year);
        }
        if let Some(ref publisher) = patch.publisher {
            book.publisher = Some(publisher.clone());
        }
        if let Some(ref description) = patch.description {
            book.description = Some(description.clone());
        }
        book.updated_at = Utc::now();
        Ok(book.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.store.tables.write().await;
        if tables.books.shift_remove(&id).is_none() {
            return Err(book_not_found(id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Librarians
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MemoryLibrarianRepository {
    store: MemoryStore,
}

fn librarian_matches(librarian: &Librarian, query: &LibrarianQuery) -> bool {
    if let Some(ref name) = query.name {
        if !librarian.name.to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }
    if let Some(department) = query.department {
        if librarian.department != department {
            return false;
        }
    }
    if let Some(position) = query.position {
        if librarian.position != position {
            return false;
        }
    }
    if let Some(active) = query.active {
        if librarian.active != active {
            return false;
        }
    }
    true
}

#[async_trait]
impl LibrarianRepository for MemoryLibrarianRepository {
    async fn insert(&self, librarian: NewLibrarian) -> AppResult<Librarian> {
        let mut tables = self.store.tables.write().await;
        tables.next_librarian_id += 1;
        let id = tables.next_librarian_id;
        let now = Utc::now();
        let librarian = Librarian {
            id,
            name: librarian.name,
            employee_id: librarian.employee_id,
            email: librarian.email,
            phone: librarian.phone,
            hire_date: librarian.hire_date,
            department: librarian.department,
            position: librarian.position,
            active: librarian.active,
            created_at: now,
            updated_at: now,
        };
        tables.librarians.insert(id, librarian.clone());
        Ok(librarian)
    }

    async fn get(&self, id: i32) -> AppResult<Librarian> {
        let tables = self.store.tables.read().await;
        tables
            .librarians
            .get(&id)
            .cloned()
            .ok_or_else(|| librarian_not_found(id))
    }

    async fn find_by_employee_id(
        &self,
        employee_id: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<Option<Librarian>> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .librarians
            .values()
            .find(|l| l.employee_id == employee_id && Some(l.id) != exclude_id)
            .cloned())
    }

    async fn list(&self, query: &LibrarianQuery) -> AppResult<(Vec<Librarian>, i64)> {
        let tables = self.store.tables.read().await;
        let mut librarians: Vec<Librarian> = tables
            .librarians
            .values()
            .filter(|l| librarian_matches(l, query))
            .cloned()
            .collect();
        librarians.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(paginate(librarians, query.limit(), query.offset()))
    }

    async fn update(&self, id: i32, patch: &LibrarianPatch) -> AppResult<Librarian> {
        let mut tables = self.store.tables.write().await;
        let librarian = tables
            .librarians
            .get_mut(&id)
            .ok_or_else(|| librarian_not_found(id))?;
        if let Some(ref name) = patch.name {
            librarian.name = name.clone();
        }
        if let Some(ref employee_id) = patch.employee_id {
            librarian.employee_id = employee_id.clone();
        }
        if let Some(ref email) = patch.email {
            librarian.email = Some(email.clone());
        }
        if let Some(ref phone) = patch.phone {
            librarian.phone = Some(phone.clone());
        }
        if let Some(hire_date) = patch.hire_date {
            librarian.hire_date = hire_date;
        }
        if let Some(department) = patch.department {
            librarian.department = department;
        }
        if let Some(position) = patch.position {
            librarian.position = position;
        }
        if let Some(active) = patch.active {
            librarian.active = active;
        }
        librarian.updated_at = Utc::now();
        Ok(librarian.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.store.tables.write().await;
        if tables.librarians.shift_remove(&id).is_none() {
            return Err(librarian_not_found(id));
        }
        // History stays; only the staff reference is cleared
        let now = Utc::now();
        for record in tables.borrowings.values_mut() {
            if record.librarian_id == Some(id) {
                record.librarian_id = None;
                record.updated_at = now;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Borrowings
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MemoryBorrowingRepository {
    store: MemoryStore,
}

fn borrowing_matches(record: &BorrowingRecord, query: &BorrowingQuery) -> bool {
    if let Some(member_id) = query.member_id {
        if record.member_id != member_id {
            return false;
        }
    }
    if let Some(book_id) = query.book_id {
        if record.book_id != book_id {
            return false;
        }
    }
    if let Some(librarian_id) = query.librarian_id {
        if record.librarian_id != Some(librarian_id) {
            return false;
        }
    }
    if let Some(status) = query.status {
        if record.status != status {
            return false;
        }
    }
    true
}

fn newest_first(records: &mut [BorrowingRecord]) {
    records.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl BorrowingRepository for MemoryBorrowingRepository {
    async fn insert(&self, record: NewBorrowing) -> AppResult<BorrowingRecord> {
        let mut tables = self.store.tables.write().await;
        tables.next_borrowing_id += 1;
        let id = tables.next_borrowing_id;
        let now = Utc::now();
        let record = BorrowingRecord {
            id,
            record_number: record.record_number,
            member_id: record.member_id,
            book_id: record.book_id,
            librarian_id: Some(record.librarian_id),
            borrow_date: record.borrow_date,
            expected_return_date: record.expected_return_date,
            actual_return_date: None,
            status: record.status,
            fine_per_day: record.fine_per_day,
            days_overdue: record.days_overdue,
            fine_amount: record.fine_amount,
            notes: record.notes,
            created_at: now,
            updated_at: now,
        };
        tables.borrowings.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i32) -> AppResult<BorrowingRecord> {
        let tables = self.store.tables.read().await;
        tables
            .borrowings
            .get(&id)
            .cloned()
            .ok_or_else(|| borrowing_not_found(id))
    }

    async fn list(&self, query: &BorrowingQuery) -> AppResult<(Vec<BorrowingRecord>, i64)> {
        let tables = self.store.tables.read().await;
        let mut records: Vec<BorrowingRecord> = tables
            .borrowings
            .values()
            .filter(|r| borrowing_matches(r, query))
            .cloned()
            .collect();
        newest_first(&mut records);
        Ok(paginate(records, query.limit(), query.offset()))
    }

    async fn list_for_member(&self, member_id: i32) -> AppResult<Vec<BorrowingRecord>> {
        let tables = self.store.tables.read().await;
        let mut records: Vec<BorrowingRecord> = tables
            .borrowings
            .values()
            .filter(|r| r.member_id == member_id)
            .cloned()
            .collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn due_before(
        &self,
        date: NaiveDate,
        status: BorrowingStatus,
    ) -> AppResult<Vec<BorrowingRecord>> {
        let tables = self.store.tables.read().await;
        let mut records: Vec<BorrowingRecord> = tables
            .borrowings
            .values()
            .filter(|r| r.status == status && r.expected_return_date < date)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.expected_return_date
                .cmp(&b.expected_return_date)
                .then(a.id.cmp(&b.id))
        });
        Ok(records)
    }

    async fn count_for_member(
        &self,
        member_id: i32,
        statuses: &[BorrowingStatus],
    ) -> AppResult<i64> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .borrowings
            .values()
            .filter(|r| {
                r.member_id == member_id
                    && (statuses.is_empty() || statuses.contains(&r.status))
            })
            .count() as i64)
    }

    async fn count_for_book(&self, book_id: i32, statuses: &[BorrowingStatus]) -> AppResult<i64> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .borrowings
            .values()
            .filter(|r| {
                r.book_id == book_id && (statuses.is_empty() || statuses.contains(&r.status))
            })
            .count() as i64)
    }

    async fn count_for_librarian(&self, librarian_id: i32) -> AppResult<i64> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .borrowings
            .values()
            .filter(|r| r.librarian_id == Some(librarian_id))
            .count() as i64)
    }

    async fn count_by_status(&self, status: BorrowingStatus) -> AppResult<i64> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .borrowings
            .values()
            .filter(|r| r.status == status)
            .count() as i64)
    }

    async fn sum_fines(&self) -> AppResult<Decimal> {
        let tables = self.store.tables.read().await;
        Ok(tables.borrowings.values().map(|r| r.fine_amount).sum())
    }

    async fn has_any_for_member(&self, member_id: i32) -> AppResult<bool> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .borrowings
            .values()
            .any(|r| r.member_id == member_id))
    }

    async fn has_any_for_book(&self, book_id: i32) -> AppResult<bool> {
        let tables = self.store.tables.read().await;
        Ok(tables.borrowings.values().any(|r| r.book_id == book_id))
    }

    async fn update(&self, id: i32, patch: &BorrowingPatch) -> AppResult<BorrowingRecord> {
        let mut tables = self.store.tables.write().await;
        let record = tables
            .borrowings
            .get_mut(&id)
            .ok_or_else(|| borrowing_not_found(id))?;
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(date) = patch.expected_return_date {
            record.expected_return_date = date;
        }
        if let Some(date) = patch.actual_return_date {
            record.actual_return_date = Some(date);
        }
        if let Some(days) = patch.days_overdue {
            record.days_overdue = days;
        }
        if let Some(fine) = patch.fine_amount {
            record.fine_amount = fine;
        }
        if let Some(ref notes) = patch.notes {
            record.notes = Some(notes.clone());
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.store.tables.write().await;
        if tables.borrowings.shift_remove(&id).is_none() {
            return Err(borrowing_not_found(id));
        }
        Ok(())
    }
}
