//! Repository layer for store operations

pub mod books;
pub mod borrowings;
pub mod librarians;
pub mod members;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use books::BookRepository;
pub use borrowings::BorrowingRepository;
pub use librarians::LibrarianRepository;
pub use members::MemberRepository;

/// Main repository struct holding one handle per entity store
#[derive(Clone)]
pub struct Repository {
    pub members: Arc<dyn MemberRepository>,
    pub books: Arc<dyn BookRepository>,
    pub librarians: Arc<dyn LibrarianRepository>,
    pub borrowings: Arc<dyn BorrowingRepository>,
}

impl Repository {
    /// Repository backed by PostgreSQL
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            members: Arc::new(postgres::PgMemberRepository::new(pool.clone())),
            books: Arc::new(postgres::PgBookRepository::new(pool.clone())),
            librarians: Arc::new(postgres::PgLibrarianRepository::new(pool.clone())),
            borrowings: Arc::new(postgres::PgBorrowingRepository::new(pool)),
        }
    }

    /// Repository backed by in-process tables, for development and tests
    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::new();
        Self {
            members: Arc::new(store.members()),
            books: Arc::new(store.books()),
            librarians: Arc::new(store.librarians()),
            borrowings: Arc::new(store.borrowings()),
        }
    }
}
