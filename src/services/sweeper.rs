//! Scheduled ledger maintenance: overdue sweep and member review

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    clock::Clock,
    error::AppResult,
    models::{
        borrowing::{BorrowingPatch, BorrowingStatus},
        member::MemberStatus,
    },
    repository::Repository,
};

/// Overdue count at which the member review flags a member
const EXCESSIVE_OVERDUE_THRESHOLD: i64 = 3;

/// Outcome of one overdue sweep
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SweepReport {
    pub run_date: NaiveDate,
    /// Records the sweep looked at across both passes
    pub examined: u64,
    /// Borrowed records transitioned to overdue
    pub newly_overdue: u64,
    /// Overdue records whose fine snapshot was brought up to date
    pub refreshed: u64,
    /// Overdue records already up to date
    pub unchanged: u64,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One record the sweep could not update
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SweepFailure {
    pub record_id: i32,
    pub reason: String,
}

/// Outcome of one member review
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberReviewReport {
    pub run_date: NaiveDate,
    pub members_reviewed: u64,
    /// Active members holding at least one overdue book
    pub active_with_overdue: u64,
    pub inactive_members: u64,
    pub pending_members: u64,
    pub flagged: Vec<FlaggedMember>,
}

/// Member flagged for holding too many overdue books
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FlaggedMember {
    pub member_id: i32,
    pub name: String,
    pub overdue_books: i64,
}

#[derive(Clone)]
pub struct SweeperService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl SweeperService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Sweep the ledger for lapsed due dates.
    ///
    /// A failure on one record is logged and reported but never halts the
    /// rest of the sweep.
    pub async fn run_sweep(&self) -> AppResult<SweepReport> {
        let today = self.clock.today();
        let mut report = SweepReport {
            run_date: today,
            examined: 0,
            newly_overdue: 0,
            refreshed: 0,
            unchanged: 0,
            failures: Vec::new(),
        };

        // Pass 1: borrowed records past their due date become overdue
        let lapsed = self
            .repository
            .borrowings
            .due_before(today, BorrowingStatus::Borrowed)
            .await?;
        for record in lapsed {
            report.examined += 1;
            let days_overdue = (today - record.expected_return_date).num_days();
            let patch = BorrowingPatch {
                status: Some(BorrowingStatus::Overdue),
                days_overdue: Some(days_overdue),
                fine_amount: Some(Decimal::from(days_overdue) * record.fine_per_day),
                ..Default::default()
            };
            match self.repository.borrowings.update(record.id, &patch).await {
                Ok(_) => report.newly_overdue += 1,
                Err(err) => {
                    tracing::warn!(record_id = record.id, error = %err, "sweep could not mark record overdue");
                    report.failures.push(SweepFailure {
                        record_id: record.id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        // Pass 2: refresh the fine snapshot on records already overdue
        let overdue = self
            .repository
            .borrowings
            .due_before(today, BorrowingStatus::Overdue)
            .await?;
        for record in overdue {
            report.examined += 1;
            let days_overdue = (today - record.expected_return_date).num_days();
            let fine_amount = Decimal::from(days_overdue) * record.fine_per_day;
            if days_overdue == record.days_overdue && fine_amount == record.fine_amount {
                report.unchanged += 1;
                continue;
            }
            let patch = BorrowingPatch {
                days_overdue: Some(days_overdue),
                fine_amount: Some(fine_amount),
                ..Default::default()
            };
            match self.repository.borrowings.update(record.id, &patch).await {
                Ok(_) => report.refreshed += 1,
                Err(err) => {
                    tracing::warn!(record_id = record.id, error = %err, "sweep could not refresh record");
                    report.failures.push(SweepFailure {
                        record_id: record.id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            run_date = %report.run_date,
            examined = report.examined,
            newly_overdue = report.newly_overdue,
            refreshed = report.refreshed,
            unchanged = report.unchanged,
            failures = report.failures.len(),
            "overdue sweep finished"
        );
        Ok(report)
    }

    /// Review every member's standing against the ledger.
    ///
    /// Read-only: flags members holding too many overdue books without
    /// mutating anything.
    pub async fn review_members(&self) -> AppResult<MemberReviewReport> {
        let today = self.clock.today();
        let members = self.repository.members.all().await?;

        let mut report = MemberReviewReport {
            run_date: today,
            members_reviewed: 0,
            active_with_overdue: 0,
            inactive_members: 0,
            pending_members: 0,
            flagged: Vec::new(),
        };

        for member in members {
            report.members_reviewed += 1;
            match member.status {
                MemberStatus::Inactive => report.inactive_members += 1,
                MemberStatus::Pending => report.pending_members += 1,
                MemberStatus::Active => {}
            }

            let overdue = match self
                .repository
                .borrowings
                .count_for_member(member.id, &[BorrowingStatus::Overdue])
                .await
            {
                Ok(count) => count,
                Err(err) => {
                    tracing::warn!(member_id = member.id, error = %err, "member review could not count overdue books");
                    continue;
                }
            };

            if member.status == MemberStatus::Active && overdue > 0 {
                report.active_with_overdue += 1;
            }
            if overdue >= EXCESSIVE_OVERDUE_THRESHOLD {
                tracing::warn!(
                    member_id = member.id,
                    member = %member.name,
                    overdue_books = overdue,
                    "member holds an excessive number of overdue books"
                );
                report.flagged.push(FlaggedMember {
                    member_id: member.id,
                    name: member.name,
                    overdue_books: overdue,
                });
            }
        }

        tracing::info!(
            run_date = %report.run_date,
            members_reviewed = report.members_reviewed,
            active_with_overdue = report.active_with_overdue,
            flagged = report.flagged.len(),
            "member review finished"
        );
        Ok(report)
    }
}
