//! PostgreSQL-backed stores

mod books;
mod borrowings;
mod librarians;
mod members;

pub use books::PgBookRepository;
pub use borrowings::PgBorrowingRepository;
pub use librarians::PgLibrarianRepository;
pub use members::PgMemberRepository;
