//! Statistics service

use std::collections::BTreeMap;

use crate::{
    api::stats::{BookTotals, CirculationTotals, MemberTotals, StatEntry, StatsResponse},
    error::AppResult,
    models::borrowing::BorrowingStatus,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Library-wide snapshot of the registry, catalog and ledger
    pub async fn overview(&self) -> AppResult<StatsResponse> {
        Ok(StatsResponse {
            members: self.member_totals().await?,
            books: self.book_totals().await?,
            circulation: self.circulation_totals().await?,
        })
    }

    async fn member_totals(&self) -> AppResult<MemberTotals> {
        let members = self.repository.members.all().await?;

        let mut by_status: BTreeMap<&'static str, i64> = BTreeMap::new();
        for member in &members {
            *by_status.entry(member.status.as_str()).or_default() += 1;
        }

        Ok(MemberTotals {
            total: members.len() as i64,
            by_status: to_entries(by_status),
        })
    }

    async fn book_totals(&self) -> AppResult<BookTotals> {
        let books = self.repository.books.all().await?;

        let mut total_copies = 0;
        let mut available_copies = 0;
        let mut by_category: BTreeMap<&'static str, i64> = BTreeMap::new();
        for book in &books {
            let active_loans = self
                .repository
                .borrowings
                .count_for_book(book.id, &BorrowingStatus::ACTIVE)
                .await?;
            total_copies += i64::from(book.total_copies);
            available_copies += (i64::from(book.total_copies) - active_loans).max(0);
            *by_category.entry(book.category.as_str()).or_default() += 1;
        }

        Ok(BookTotals {
            total: books.len() as i64,
            total_copies,
            available_copies,
            by_category: to_entries(by_category),
        })
    }

    async fn circulation_totals(&self) -> AppResult<CirculationTotals> {
        let borrowed = self
            .repository
            .borrowings
            .count_by_status(BorrowingStatus::Borrowed)
            .await?;
        let overdue = self
            .repository
            .borrowings
            .count_by_status(BorrowingStatus::Overdue)
            .await?;
        let returned = self
            .repository
            .borrowings
            .count_by_status(BorrowingStatus::Returned)
            .await?;
        let total_fines = self.repository.borrowings.sum_fines().await?;

        Ok(CirculationTotals {
            total: borrowed + overdue + returned,
            borrowed,
            overdue,
            returned,
            total_fines,
        })
    }
}

fn to_entries(counts: BTreeMap<&'static str, i64>) -> Vec<StatEntry> {
    counts
        .into_iter()
        .map(|(label, value)| StatEntry {
            label: label.to_string(),
            value,
        })
        .collect()
}
