//! PostgreSQL catalog store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};

use crate::error::{AppError, AppResult};
use crate::models::book::{Book, BookCategory, BookPatch, BookQuery, NewBook};
use crate::repository::BookRepository;

#[derive(Clone)]
pub struct PgBookRepository {
    pool: Pool<Postgres>,
}

impl PgBookRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct BookRow {
    id: i32,
    title: String,
    author: String,
    isbn: String,
    category: String,
    total_copies: i32,
    publication_year: Option<i32>,
    publisher: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            category: row.category.parse().unwrap_or(BookCategory::Other),
            total_copies: row.total_copies,
            publication_year: row.publication_year,
            publisher: row.publisher,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn insert(&self, book: NewBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (title, author, isbn, category, total_copies,
                               publication_year, publisher, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, author, isbn, category, total_copies,
                      publication_year, publisher, description, created_at, updated_at
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.category.as_str())
        .bind(book.total_copies)
        .bind(book.publication_year)
        .bind(&book.publisher)
        .bind(&book.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(&self, id: i32) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, author, isbn, category, total_copies,
                   publication_year, publisher, description, created_at, updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(row.into())
    }

    async fn find_by_isbn(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, author, isbn, category, total_copies,
                   publication_year, publisher, description, created_at, updated_at
            FROM books
            WHERE isbn = $1
              AND ($2::int4 IS NULL OR id <> $2)
            LIMIT 1
            "#,
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Book::from))
    }

    async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let category = query.category.map(|c| c.as_str());

        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, author, isbn, category, total_copies,
                   publication_year, publisher, description, created_at, updated_at
            FROM books
            WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR author ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL OR isbn = $3)
              AND ($4::text IS NULL OR category = $4)
            ORDER BY title, id
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(query.title.as_deref())
        .bind(query.author.as_deref())
        .bind(query.isbn.as_deref())
        .bind(category)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM books
            WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR author ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL OR isbn = $3)
              AND ($4::text IS NULL OR category = $4)
            "#,
        )
        .bind(query.title.as_deref())
        .bind(query.author.as_deref())
        .bind(query.isbn.as_deref())
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Book::from).collect(), total))
    }

    async fn all(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, author, isbn, category, total_copies,
                   publication_year, publisher, description, created_at, updated_at
            FROM books
            ORDER BY title, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn update(&self, id: i32, patch: &BookPatch) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books SET
                title = COALESCE($2::text, title),
                author = COALESCE($3::text, author),
                isbn = COALESCE($4::text, isbn),
                category = COALESCE($5::text, category),
                total_copies = COALESCE($6::int4, total_copies),
                publication_year = COALESCE($7::int4, publication_year),
                publisher = COALESCE($8::text, publisher),
                description = COALESCE($9::text, description),
                updated_at = now()
            WHERE id = $1
            RETURNING id, title, author, isbn, category, total_copies,
                      publication_year, publisher, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.author.as_deref())
        .bind(patch.isbn.as_deref())
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.total_copies)
        .bind(patch.publication_year)
        .bind(patch.publisher.as_deref())
        .bind(patch.description.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(row.into())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }
}
