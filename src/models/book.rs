//! Book catalog model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Catalog classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookCategory {
    Fiction,
    NonFiction,
    Science,
    History,
    Biography,
    Technology,
    Children,
    Other,
}

impl BookCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            BookCategory::Fiction => "fiction",
            BookCategory::NonFiction => "non_fiction",
            BookCategory::Science => "science",
            BookCategory::History => "history",
            BookCategory::Biography => "biography",
            BookCategory::Technology => "technology",
            BookCategory::Children => "children",
            BookCategory::Other => "other",
        }
    }
}

impl std::str::FromStr for BookCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fiction" => Ok(BookCategory::Fiction),
            "non_fiction" => Ok(BookCategory::NonFiction),
            "science" => Ok(BookCategory::Science),
            "history" => Ok(BookCategory::History),
            "biography" => Ok(BookCategory::Biography),
            "technology" => Ok(BookCategory::Technology),
            "children" => Ok(BookCategory::Children),
            "other" => Ok(BookCategory::Other),
            unknown => Err(format!("unknown book category: {}", unknown)),
        }
    }
}

/// Book record as persisted; copy availability is derived from the ledger
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: BookCategory,
    /// Copies owned by the library, authoritative for availability
    pub total_copies: i32,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book with availability figures derived from the ledger
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    /// `total_copies` minus active loans, floored at zero
    pub available_copies: i64,
    /// Records in status `borrowed` or `overdue`
    pub active_loans: i64,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    #[validate(length(min = 10, max = 17))]
    pub isbn: String,
    /// Defaults to `other`
    pub category: Option<BookCategory>,
    /// Defaults to 1
    #[validate(range(min = 0, max = 10000))]
    pub total_copies: Option<i32>,
    #[validate(range(min = 1000, max = 9999))]
    pub publication_year: Option<i32>,
    #[validate(length(max = 255))]
    pub publisher: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Update book request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub author: Option<String>,
    #[validate(length(min = 10, max = 17))]
    pub isbn: Option<String>,
    pub category: Option<BookCategory>,
    #[validate(range(min = 0, max = 10000))]
    pub total_copies: Option<i32>,
    #[validate(range(min = 1000, max = 9999))]
    pub publication_year: Option<i32>,
    #[validate(length(max = 255))]
    pub publisher: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Fully-resolved book row ready for insertion
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: BookCategory,
    pub total_copies: i32,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub description: Option<String>,
}

/// Store-level field changes
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<BookCategory>,
    pub total_copies: Option<i32>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub description: Option<String>,
}

/// List/search parameters for the catalog
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring match on title
    pub title: Option<String>,
    /// Case-insensitive substring match on author
    pub author: Option<String>,
    /// Exact ISBN match
    pub isbn: Option<String>,
    pub category: Option<BookCategory>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl BookQuery {
    pub fn limit(&self) -> i64 {
        super::page_limit(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        super::page_offset(self.page, self.per_page)
    }
}
