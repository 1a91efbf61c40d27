//! Librarian (staff) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Circulation,
    Reference,
    Cataloging,
    Children,
    Administration,
}

impl Department {
    pub fn as_str(self) -> &'static str {
        match self {
            Department::Circulation => "circulation",
            Department::Reference => "reference",
            Department::Cataloging => "cataloging",
            Department::Children => "children",
            Department::Administration => "administration",
        }
    }
}

impl std::str::FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circulation" => Ok(Department::Circulation),
            "reference" => Ok(Department::Reference),
            "cataloging" => Ok(Department::Cataloging),
            "children" => Ok(Department::Children),
            "administration" => Ok(Department::Administration),
            unknown => Err(format!("unknown department: {}", unknown)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Assistant,
    Librarian,
    SeniorLibrarian,
    HeadLibrarian,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Assistant => "assistant",
            Position::Librarian => "librarian",
            Position::SeniorLibrarian => "senior_librarian",
            Position::HeadLibrarian => "head_librarian",
        }
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assistant" => Ok(Position::Assistant),
            "librarian" => Ok(Position::Librarian),
            "senior_librarian" => Ok(Position::SeniorLibrarian),
            "head_librarian" => Ok(Position::HeadLibrarian),
            unknown => Err(format!("unknown position: {}", unknown)),
        }
    }
}

/// Staff record as persisted
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Librarian {
    pub id: i32,
    pub name: String,
    /// Badge identifier, `LIB` followed by digits
    pub employee_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hire_date: NaiveDate,
    pub department: Department,
    pub position: Position,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Librarian {
    /// Years since hire, to one decimal place
    pub fn years_of_service(&self, today: NaiveDate) -> f64 {
        let days = (today - self.hire_date).num_days();
        if days <= 0 {
            return 0.0;
        }
        ((days as f64 / 365.25) * 10.0).round() / 10.0
    }
}

/// Librarian with derived service figures
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LibrarianDetails {
    #[serde(flatten)]
    pub librarian: Librarian,
    pub years_of_service: f64,
    /// Ledger records this librarian has processed
    pub managed_borrowings: i64,
}

/// Hire librarian request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLibrarian {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// `LIB` followed by digits, e.g. `LIB001`
    #[validate(length(min = 4, max = 20))]
    pub employee_id: String,
    #[validate(length(min = 3, max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    /// Defaults to today; must not be in the future
    pub hire_date: Option<NaiveDate>,
    /// Defaults to `circulation`
    pub department: Option<Department>,
    /// Defaults to `librarian`
    pub position: Option<Position>,
}

/// Update librarian request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLibrarian {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 4, max = 20))]
    pub employee_id: Option<String>,
    #[validate(length(min = 3, max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub department: Option<Department>,
    pub position: Option<Position>,
    pub active: Option<bool>,
}

/// Fully-resolved librarian row ready for insertion
#[derive(Debug, Clone)]
pub struct NewLibrarian {
    pub name: String,
    pub employee_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hire_date: NaiveDate,
    pub department: Department,
    pub position: Position,
    pub active: bool,
}

/// Store-level field changes
#[derive(Debug, Clone, Default)]
pub struct LibrarianPatch {
    pub name: Option<String>,
    pub employee_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub department: Option<Department>,
    pub position: Option<Position>,
    pub active: Option<bool>,
}

/// List/search parameters for staff
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LibrarianQuery {
    /// Case-insensitive substring match on name
    pub name: Option<String>,
    pub department: Option<Department>,
    pub position: Option<Position>,
    pub active: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl LibrarianQuery {
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

    fn librarian_hired_on(hire_date: NaiveDate) -> Librarian {
        Librarian {
            id: 1,
            name: "Ada Quill".to_string(),
            employee_id: "LIB001".to_string(),
            email: None,
            phone: None,
            hire_date,
            department: Department::Circulation,
            position: Position::Librarian,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn years_of_service_uses_quarter_day_years() {
        let librarian = librarian_hired_on(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());

        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(librarian.years_of_service(today), 5.0);

        let today = NaiveDate::from_ymd_opt(2022, 7, 2).unwrap();
        assert_eq!(librarian.years_of_service(today), 2.5);
    }

    #[test]
    fn years_of_service_is_zero_on_hire_day() {
        let hire_date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let librarian = librarian_hired_on(hire_date);
        assert_eq!(librarian.years_of_service(hire_date), 0.0);
    }
}
