//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod members;
pub mod staff;
pub mod stats;
pub mod sweeper;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    clock::{Clock, SystemClock},
    config::CirculationConfig,
    error::{AppError, AppResult},
    repository::Repository,
    sequence::{SequenceGenerator, SnowflakeSequencer},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub members: members::MembersService,
    pub catalog: catalog::CatalogService,
    pub staff: staff::StaffService,
    pub circulation: circulation::CirculationService,
    pub sweeper: sweeper::SweeperService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, circulation: &CirculationConfig) -> Self {
        Self::with_components(
            repository,
            circulation,
            Arc::new(SystemClock),
            Arc::new(SnowflakeSequencer::default()),
        )
    }

    /// Create services with explicit clock and sequence sources, used by
    /// tests to pin dates and numbering
    pub fn with_components(
        repository: Repository,
        circulation: &CirculationConfig,
        clock: Arc<dyn Clock>,
        sequences: Arc<dyn SequenceGenerator>,
    ) -> Self {
        Self {
            members: members::MembersService::new(
                repository.clone(),
                clock.clone(),
                sequences.clone(),
            ),
            catalog: catalog::CatalogService::new(repository.clone()),
            staff: staff::StaffService::new(repository.clone(), clock.clone()),
            circulation: circulation::CirculationService::new(
                repository.clone(),
                circulation.fine_per_day,
                clock.clone(),
                sequences,
            ),
            sweeper: sweeper::SweeperService::new(repository.clone(), clock),
            stats: stats::StatsService::new(repository),
        }
    }
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 .()-]*[0-9]$").unwrap());

pub(crate) fn ensure_email_format(email: &str) -> AppResult<()> {
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::FormatInvalid(format!(
            "Invalid email address \"{}\"",
            email
        )));
    }
    Ok(())
}

pub(crate) fn ensure_phone_format(phone: &str) -> AppResult<()> {
    if !PHONE_RE.is_match(phone) {
        return Err(AppError::FormatInvalid(format!(
            "Invalid phone number \"{}\": digits, spaces, dots, dashes and parentheses only",
            phone
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod harness {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use crate::{
        clock::FixedClock,
        config::CirculationConfig,
        models::{
            book::{Book, CreateBook},
            borrowing::{BorrowingRecord, CreateBorrowing},
            librarian::{CreateLibrarian, Librarian},
            member::{CreateMember, Member},
        },
        repository::Repository,
        sequence::SnowflakeSequencer,
        services::Services,
    };

    pub(crate) struct TestContext {
        pub services: Services,
        pub repository: Repository,
        pub clock: Arc<FixedClock>,
    }

    pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    pub(crate) fn context() -> TestContext {
        context_on(date(2024, 3, 15))
    }

    pub(crate) fn context_on(today: NaiveDate) -> TestContext {
        let repository = Repository::in_memory();
        let clock = Arc::new(FixedClock::new(today));
        let services = Services::with_components(
            repository.clone(),
            &CirculationConfig::default(),
            clock.clone(),
            Arc::new(SnowflakeSequencer::default()),
        );
        TestContext {
            services,
            repository,
            clock,
        }
    }

    pub(crate) async fn seed_member(ctx: &TestContext, name: &str, phone: &str) -> Member {
        let email = format!(
            "{}@example.com",
            name.to_lowercase().replace(' ', ".")
        );
        ctx.services
            .members
            .register(CreateMember {
                name: name.to_string(),
                email,
                phone: phone.to_string(),
                join_date: None,
                status: None,
            })
            .await
            .unwrap()
    }

    pub(crate) async fn seed_book(ctx: &TestContext, isbn: &str, total_copies: i32) -> Book {
        ctx.services
            .catalog
            .add_book(CreateBook {
                title: format!("Book {}", isbn),
                author: "Test Author".to_string(),
                isbn: isbn.to_string(),
                category: None,
                total_copies: Some(total_copies),
                publication_year: None,
                publisher: None,
                description: None,
            })
            .await
            .unwrap()
    }

    pub(crate) async fn seed_librarian(ctx: &TestContext, employee_id: &str) -> Librarian {
        ctx.services
            .staff
            .hire(CreateLibrarian {
                name: format!("Librarian {}", employee_id),
                employee_id: employee_id.to_string(),
                email: None,
                phone: None,
                hire_date: None,
                department: None,
                position: None,
            })
            .await
            .unwrap()
    }

    pub(crate) async fn seed_checkout(
        ctx: &TestContext,
        member: &Member,
        book: &Book,
        librarian: &Librarian,
        expected_return_date: NaiveDate,
    ) -> BorrowingRecord {
        ctx.services
            .circulation
            .checkout(CreateBorrowing {
                member_id: member.id,
                book_id: book.id,
                librarian_id: librarian.id,
                borrow_date: None,
                expected_return_date,
                fine_per_day: None,
                notes: None,
            })
            .await
            .unwrap()
    }
}
