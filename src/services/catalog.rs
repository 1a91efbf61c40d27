//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{
        Book, BookCategory, BookDetails, BookPatch, BookQuery, CreateBook, NewBook, UpdateBook,
    },
    models::borrowing::BorrowingStatus,
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book to the catalog
    pub async fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        self.ensure_isbn_free(&book.isbn, None).await?;

        let new_book = NewBook {
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            category: book.category.unwrap_or(BookCategory::Other),
            total_copies: book.total_copies.unwrap_or(1),
            publication_year: book.publication_year,
            publisher: book.publisher,
            description: book.description,
        };

        self.repository.books.insert(new_book).await
    }

    /// Get a book with its availability figures
    pub async fn get(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get(id).await?;
        self.with_availability(book).await
    }

    /// Search the catalog
    pub async fn list(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        let (books, total) = self.repository.books.list(query).await?;

        let mut details = Vec::with_capacity(books.len());
        for book in books {
            details.push(self.with_availability(book).await?);
        }

        Ok((details, total))
    }

    /// Update an existing book
    pub async fn update(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        update.validate()?;
        self.repository.books.get(id).await?;

        if let Some(ref isbn) = update.isbn {
            self.ensure_isbn_free(isbn, Some(id)).await?;
        }

        let patch = BookPatch {
            title: update.title,
            author: update.author,
            isbn: update.isbn,
            category: update.category,
            total_copies: update.total_copies,
            publication_year: update.publication_year,
            publisher: update.publisher,
            description: update.description,
        };
        self.repository.books.update(id, &patch).await
    }

    /// Delete a book the ledger does not reference
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let book = self.repository.books.get(id).await?;

        if self.repository.borrowings.has_any_for_book(id).await? {
            return Err(AppError::DeletionRestricted(format!(
                "Cannot delete book \"{}\" with borrowing history",
                book.title
            )));
        }

        self.repository.books.delete(id).await
    }

    async fn ensure_isbn_free(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<()> {
        if let Some(existing) = self.repository.books.find_by_isbn(isbn, exclude_id).await? {
            return Err(AppError::Duplicate(format!(
                "ISBN \"{}\" is already registered to \"{}\"",
                isbn, existing.title
            )));
        }
        Ok(())
    }

    /// Copies on the shelf, counted from the ledger and floored at zero
    async fn with_availability(&self, book: Book) -> AppResult<BookDetails> {
        let active_loans = self
            .repository
            .borrowings
            .count_for_book(book.id, &BorrowingStatus::ACTIVE)
            .await?;
        let available_copies = (i64::from(book.total_copies) - active_loans).max(0);

        Ok(BookDetails {
            available_copies,
            active_loans,
            book,
        })
    }
}
