//! Domain models for the circulation system

pub mod book;
pub mod borrowing;
pub mod librarian;
pub mod member;

/// Effective page size for a list query (defaults to 20, capped at 100)
pub(crate) fn page_limit(per_page: Option<u32>) -> i64 {
    i64::from(per_page.unwrap_or(20).clamp(1, 100))
}

/// Row offset for a list query (pages are 1-based)
pub(crate) fn page_offset(page: Option<u32>, per_page: Option<u32>) -> i64 {
    (i64::from(page.unwrap_or(1).max(1)) - 1) * page_limit(per_page)
}
