//! Member registry service

use std::sync::Arc;

use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::borrowing::BorrowingStatus,
    models::member::{
        CreateMember, Member, MemberDetails, MemberPatch, MemberQuery, MemberStats, MemberStatus,
        MemberSummary, NewMember, UpdateMember,
    },
    repository::Repository,
    sequence::SequenceGenerator,
};

use super::{ensure_email_format, ensure_phone_format};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    sequences: Arc<dyn SequenceGenerator>,
}

impl MembersService {
    pub fn new(
        repository: Repository,
        clock: Arc<dyn Clock>,
        sequences: Arc<dyn SequenceGenerator>,
    ) -> Self {
        Self {
            repository,
            clock,
            sequences,
        }
    }

    /// Register a new member
    pub async fn register(&self, member: CreateMember) -> AppResult<Member> {
        member.validate()?;
        ensure_email_format(&member.email)?;
        ensure_phone_format(&member.phone)?;
        self.ensure_phone_free(&member.phone, None).await?;

        let new_member = NewMember {
            member_number: self.sequences.member_number(),
            name: member.name,
            email: member.email,
            phone: member.phone,
            join_date: member.join_date.unwrap_or_else(|| self.clock.today()),
            status: member.status.unwrap_or(MemberStatus::Active),
        };

        self.repository.members.insert(new_member).await
    }

    /// Get a member with its circulation figures
    pub async fn get(&self, id: i32) -> AppResult<MemberDetails> {
        let member = self.repository.members.get(id).await?;
        let stats = self.compute_stats(&member).await?;
        Ok(MemberDetails {
            max_borrow_limit: member.max_borrow_limit(),
            stats,
            member,
        })
    }

    /// Circulation figures alone, for the stats endpoint
    pub async fn stats(&self, id: i32) -> AppResult<MemberStats> {
        let member = self.repository.members.get(id).await?;
        self.compute_stats(&member).await
    }

    /// Search members
    pub async fn list(&self, query: &MemberQuery) -> AppResult<(Vec<MemberSummary>, i64)> {
        let (members, total) = self.repository.members.list(query).await?;

        let mut summaries = Vec::with_capacity(members.len());
        for member in members {
            let current_borrowed = self
                .repository
                .borrowings
                .count_for_member(member.id, &[BorrowingStatus::Borrowed])
                .await?;
            summaries.push(MemberSummary {
                max_borrow_limit: member.max_borrow_limit(),
                current_borrowed,
                member,
            });
        }

        Ok((summaries, total))
    }

    /// Update an existing member
    pub async fn update(&self, id: i32, update: UpdateMember) -> AppResult<Member> {
        update.validate()?;
        let member = self.repository.members.get(id).await?;

        if let Some(ref email) = update.email {
            ensure_email_format(email)?;
        }
        if let Some(ref phone) = update.phone {
            ensure_phone_format(phone)?;
            self.ensure_phone_free(phone, Some(id)).await?;
        }

        // A status change must not leave the member over the new limit
        if let Some(status) = update.status {
            let current_borrowed = self
                .repository
                .borrowings
                .count_for_member(id, &[BorrowingStatus::Borrowed])
                .await?;
            if current_borrowed > i64::from(status.max_borrow_limit()) {
                return Err(AppError::StatusChangeBlocked {
                    member: member.name,
                    status: status.as_str().to_string(),
                    current_borrowed,
                });
            }
        }

        let patch = MemberPatch {
            name: update.name,
            email: update.email,
            phone: update.phone,
            status: update.status,
        };
        self.repository.members.update(id, &patch).await
    }

    /// Delete a member without borrowing history
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let member = self.repository.members.get(id).await?;

        if self.repository.borrowings.has_any_for_member(id).await? {
            return Err(AppError::DeletionRestricted(format!(
                "Cannot delete member \"{}\" with borrowing history",
                member.name
            )));
        }

        self.repository.members.delete(id).await
    }

    async fn ensure_phone_free(&self, phone: &str, exclude_id: Option<i32>) -> AppResult<()> {
        if let Some(holder) = self.repository.members.phone_holder(phone, exclude_id).await? {
            return Err(AppError::Duplicate(format!(
                "Phone number \"{}\" is already registered to member \"{}\"",
                phone, holder.name
            )));
        }
        Ok(())
    }

    /// Aggregate the member's ledger entries.
    ///
    /// Fines on active records are measured against the calendar so the
    /// figures never lag behind the sweeper.
    async fn compute_stats(&self, member: &Member) -> AppResult<MemberStats> {
        let records = self.repository.borrowings.list_for_member(member.id).await?;
        let today = self.clock.today();

        let mut current_borrowed = 0i64;
        let mut overdue_books = 0i64;
        let mut returned_books = 0i64;
        let mut total_fines = Decimal::ZERO;

        for record in &records {
            match record.status {
                BorrowingStatus::Borrowed => current_borrowed += 1,
                BorrowingStatus::Overdue => overdue_books += 1,
                BorrowingStatus::Returned => returned_books += 1,
            }
            total_fines += if record.is_active() {
                Decimal::from(record.days_overdue_as_of(today)) * record.fine_per_day
            } else {
                record.fine_amount
            };
        }

        let limit = member.max_borrow_limit();
        let borrow_limit_progress =
            ((current_borrowed as f64 / f64::from(limit)) * 1000.0).round() / 10.0;

        Ok(MemberStats {
            current_borrowed,
            total_books_borrowed: records.len() as i64,
            overdue_books,
            returned_books,
            total_fines,
            borrow_limit_progress,
        })
    }
}
