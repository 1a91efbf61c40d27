//! Borrowing ledger model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Ledger record lifecycle.
///
/// Transitions are `borrowed -> returned`, `borrowed -> overdue` and
/// `overdue -> returned`; `returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowingStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl BorrowingStatus {
    /// Statuses that tie up a physical copy
    pub const ACTIVE: [BorrowingStatus; 2] = [BorrowingStatus::Borrowed, BorrowingStatus::Overdue];

    pub fn is_active(self) -> bool {
        matches!(self, BorrowingStatus::Borrowed | BorrowingStatus::Overdue)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BorrowingStatus::Borrowed => "borrowed",
            BorrowingStatus::Returned => "returned",
            BorrowingStatus::Overdue => "overdue",
        }
    }

    /// Capitalised label used in display names
    pub fn label(self) -> &'static str {
        match self {
            BorrowingStatus::Borrowed => "Borrowed",
            BorrowingStatus::Returned => "Returned",
            BorrowingStatus::Overdue => "Overdue",
        }
    }
}

impl std::str::FromStr for BorrowingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrowed" => Ok(BorrowingStatus::Borrowed),
            "returned" => Ok(BorrowingStatus::Returned),
            "overdue" => Ok(BorrowingStatus::Overdue),
            unknown => Err(format!("unknown borrowing status: {}", unknown)),
        }
    }
}

impl std::fmt::Display for BorrowingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One borrowing transaction in the ledger
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingRecord {
    pub id: i32,
    /// Display number printed on receipts
    pub record_number: String,
    pub member_id: i32,
    pub book_id: i32,
    /// Cleared when the processing librarian is removed from the registry
    pub librarian_id: Option<i32>,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub status: BorrowingStatus,
    /// Daily fine rate frozen at creation time
    pub fine_per_day: Decimal,
    /// Persisted snapshot; active records are remeasured on read
    pub days_overdue: i64,
    pub fine_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BorrowingRecord {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Days past the expected return date as of `today`.
    ///
    /// Active records are measured against the calendar; returned records
    /// keep the snapshot taken when the book came back.
    pub fn days_overdue_as_of(&self, today: NaiveDate) -> i64 {
        match self.status {
            BorrowingStatus::Returned => self.days_overdue,
            BorrowingStatus::Borrowed | BorrowingStatus::Overdue => {
                (today - self.expected_return_date).num_days().max(0)
            }
        }
    }

    /// Display label, e.g. `Jane Doe - The Iliad (Borrowed)`
    pub fn display_name(&self, member_name: &str, book_title: &str) -> String {
        format!("{} - {} ({})", member_name, book_title, self.status)
    }
}

/// Ledger record enriched for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowingDetails {
    #[serde(flatten)]
    pub record: BorrowingRecord,
    pub member_name: String,
    pub book_title: String,
    pub display_name: String,
}

/// Checkout request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBorrowing {
    pub member_id: i32,
    pub book_id: i32,
    /// Librarian processing the checkout
    pub librarian_id: i32,
    /// Defaults to today
    pub borrow_date: Option<NaiveDate>,
    /// Must be after the borrow date
    pub expected_return_date: NaiveDate,
    /// Defaults to the configured rate
    pub fine_per_day: Option<Decimal>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Fully-resolved ledger row ready for insertion
#[derive(Debug, Clone)]
pub struct NewBorrowing {
    pub record_number: String,
    pub member_id: i32,
    pub book_id: i32,
    pub librarian_id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub status: BorrowingStatus,
    pub fine_per_day: Decimal,
    pub days_overdue: i64,
    pub fine_amount: Decimal,
    pub notes: Option<String>,
}

/// Store-level field changes
#[derive(Debug, Clone, Default)]
pub struct BorrowingPatch {
    pub status: Option<BorrowingStatus>,
    pub expected_return_date: Option<NaiveDate>,
    pub actual_return_date: Option<NaiveDate>,
    pub days_overdue: Option<i64>,
    pub fine_amount: Option<Decimal>,
    pub notes: Option<String>,
}

/// List/search parameters for the ledger
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BorrowingQuery {
    pub member_id: Option<i32>,
    pub book_id: Option<i32>,
    pub librarian_id: Option<i32>,
    pub status: Option<BorrowingStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl BorrowingQuery {
    pub fn limit(&self) -> i64 {
        super::page_limit(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        super::page_offset(self.page, self.per_page)
    }
}
