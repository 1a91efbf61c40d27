//! Library member model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Membership lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
    Pending,
}

impl MemberStatus {
    /// How many books a member in this status may hold at once
    pub fn max_borrow_limit(self) -> i32 {
        match self {
            MemberStatus::Active => 10,
            MemberStatus::Inactive | MemberStatus::Pending => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
            MemberStatus::Pending => "pending",
        }
    }
}

impl std::str::FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MemberStatus::Active),
            "inactive" => Ok(MemberStatus::Inactive),
            "pending" => Ok(MemberStatus::Pending),
            other => Err(format!("unknown member status: {}", other)),
        }
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member record as persisted
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Member {
    pub id: i32,
    /// Display number printed on the membership card
    pub member_number: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub join_date: NaiveDate,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn max_borrow_limit(&self) -> i32 {
        self.status.max_borrow_limit()
    }
}

/// Circulation figures derived from the borrowing ledger, recomputed on read
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberStats {
    /// Books currently out (status `borrowed`)
    pub current_borrowed: i64,
    /// Every ledger record for this member, regardless of status
    pub total_books_borrowed: i64,
    pub overdue_books: i64,
    pub returned_books: i64,
    /// Sum of fine amounts across all of the member's records
    pub total_fines: Decimal,
    /// `current_borrowed` as a percentage of the status borrow limit
    pub borrow_limit_progress: f64,
}

/// Member with derived circulation figures
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberDetails {
    #[serde(flatten)]
    pub member: Member,
    pub max_borrow_limit: i32,
    pub stats: MemberStats,
}

/// List row with the current borrow count attached
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberSummary {
    #[serde(flatten)]
    pub member: Member,
    pub max_borrow_limit: i32,
    pub current_borrowed: i64,
}

/// Create member request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 3, max = 255))]
    pub email: String,
    #[validate(length(min = 7, max = 20))]
    pub phone: String,
    /// Defaults to today when omitted
    pub join_date: Option<NaiveDate>,
    /// Defaults to `active`
    pub status: Option<MemberStatus>,
}

/// Update member request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMember {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    pub status: Option<MemberStatus>,
}

/// Fully-resolved member row ready for insertion
#[derive(Debug, Clone)]
pub struct NewMember {
    pub member_number: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub join_date: NaiveDate,
    pub status: MemberStatus,
}

/// Store-level field changes
#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<MemberStatus>,
}

/// List/search parameters for members
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemberQuery {
    /// Case-insensitive substring match on name
    pub name: Option<String>,
    pub status: Option<MemberStatus>,
    /// Exact phone match
    pub phone: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl MemberQuery {
    pub fn limit(&self) -> i64 {
        super::page_limit(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        super::page_offset(self.page, self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrow_limit_follows_status() {
        assert_eq!(MemberStatus::Active.max_borrow_limit(), 10);
        assert_eq!(MemberStatus::Inactive.max_borrow_limit(), 5);
        assert_eq!(MemberStatus::Pending.max_borrow_limit(), 5);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            MemberStatus::Active,
            MemberStatus::Inactive,
            MemberStatus::Pending,
        ] {
            assert_eq!(status.as_str().parse::<MemberStatus>().unwrap(), status);
        }
        assert!("archived".parse::<MemberStatus>().is_err());
    }
}
