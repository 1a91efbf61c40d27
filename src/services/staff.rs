//! Staff registry service

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::librarian::{
        CreateLibrarian, Department, Librarian, LibrarianDetails, LibrarianPatch, LibrarianQuery,
        NewLibrarian, Position, UpdateLibrarian,
    },
    repository::Repository,
};

use super::{ensure_email_format, ensure_phone_format};

static EMPLOYEE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^LIB[0-9]+$").unwrap());

#[derive(Clone)]
pub struct StaffService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl StaffService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Hire a new librarian
    pub async fn hire(&self, librarian: CreateLibrarian) -> AppResult<Librarian> {
        librarian.validate()?;
        ensure_employee_id_format(&librarian.employee_id)?;
        if let Some(ref email) = librarian.email {
            ensure_email_format(email)?;
        }
        if let Some(ref phone) = librarian.phone {
            ensure_phone_format(phone)?;
        }
        self.ensure_employee_id_free(&librarian.employee_id, None)
            .await?;

        let today = self.clock.today();
        let hire_date = librarian.hire_date.unwrap_or(today);
        if hire_date > today {
            return Err(AppError::FutureDateInvalid(format!(
                "Hire date {} is in the future",
                hire_date
            )));
        }

        let new_librarian = NewLibrarian {
            name: librarian.name,
            employee_id: librarian.employee_id,
            email: librarian.email,
            phone: librarian.phone,
            hire_date,
            department: librarian.department.unwrap_or(Department::Circulation),
            position: librarian.position.unwrap_or(Position::Librarian),
            active: true,
        };

        self.repository.librarians.insert(new_librarian).await
    }

    /// Get a librarian with its service figures
    pub async fn get(&self, id: i32) -> AppResult<LibrarianDetails> {
        let librarian = self.repository.librarians.get(id).await?;
        self.with_service_figures(librarian).await
    }

    /// Search the staff registry
    pub async fn list(&self, query: &LibrarianQuery) -> AppResult<(Vec<LibrarianDetails>, i64)> {
        let (librarians, total) = self.repository.librarians.list(query).await?;

        let mut details = Vec::with_capacity(librarians.len());
        for librarian in librarians {
            details.push(self.with_service_figures(librarian).await?);
        }

        Ok((details, total))
    }

    /// Update an existing librarian
    pub async fn update(&self, id: i32, update: UpdateLibrarian) -> AppResult<Librarian> {
        update.validate()?;
        self.repository.librarians.get(id).await?;

        if let Some(ref employee_id) = update.employee_id {
            ensure_employee_id_format(employee_id)?;
            self.ensure_employee_id_free(employee_id, Some(id)).await?;
        }
        if let Some(ref email) = update.email {
            ensure_email_format(email)?;
        }
        if let Some(ref phone) = update.phone {
            ensure_phone_format(phone)?;
        }
        if let Some(hire_date) = update.hire_date {
            if hire_date > self.clock.today() {
                return Err(AppError::FutureDateInvalid(format!(
                    "Hire date {} is in the future",
                    hire_date
                )));
            }
        }

        let patch = LibrarianPatch {
            name: update.name,
            employee_id: update.employee_id,
            email: update.email,
            phone: update.phone,
            hire_date: update.hire_date,
            department: update.department,
            position: update.position,
            active: update.active,
        };
        self.repository.librarians.update(id, &patch).await
    }

    /// Remove a librarian from the registry.
    ///
    /// Ledger records it processed keep their history with the staff
    /// reference cleared.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.librarians.get(id).await?;
        self.repository.librarians.delete(id).await
    }

    async fn ensure_employee_id_free(
        &self,
        employee_id: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<()> {
        if let Some(existing) = self
            .repository
            .librarians
            .find_by_employee_id(employee_id, exclude_id)
            .await?
        {
            return Err(AppError::Duplicate(format!(
                "Employee id \"{}\" is already assigned to \"{}\"",
                employee_id, existing.name
            )));
        }
        Ok(())
    }

    async fn with_service_figures(&self, librarian: Librarian) -> AppResult<LibrarianDetails> {
        let managed_borrowings = self
            .repository
            .borrowings
            .count_for_librarian(librarian.id)
            .await?;
        let years_of_service = librarian.years_of_service(self.clock.today());

        Ok(LibrarianDetails {
            years_of_service,
            managed_borrowings,
            librarian,
        })
    }
}

fn ensure_employee_id_format(employee_id: &str) -> AppResult<()> {
    if !EMPLOYEE_ID_RE.is_match(employee_id) {
        return Err(AppError::FormatInvalid(format!(
            "Invalid employee id \"{}\": expected \"LIB\" followed by digits",
            employee_id
        )));
    }
    Ok(())
}
