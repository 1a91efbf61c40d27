//! PostgreSQL staff registry store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, Pool, Postgres};

use crate::error::{AppError, AppResult};
use crate::models::librarian::{
    Department, Librarian, LibrarianPatch, LibrarianQuery, NewLibrarian, Position,
};
use crate::repository::LibrarianRepository;

#[derive(Clone)]
pub struct PgLibrarianRepository {
    pool: Pool<Postgres>,
}

impl PgLibrarianRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct LibrarianRow {
    id: i32,
    name: String,
    employee_id: String,
    email: Option<String>,
    phone: Option<String>,
    hire_date: NaiveDate,
    department: String,
    position: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LibrarianRow> for Librarian {
    fn from(row: LibrarianRow) -> Self {
        Librarian {
            id: row.id,
            name: row.name,
            employee_id: row.employee_id,
            email: row.email,
            phone: row.phone,
            hire_date: row.hire_date,
            department: row.department.parse().unwrap_or(Department::Circulation),
            position: row.position.parse().unwrap_or(Position::Librarian),
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl LibrarianRepository for PgLibrarianRepository {
    async fn insert(&self, librarian: NewLibrarian) -> AppResult<Librarian> {
        let row = sqlx::query_as::<_, LibrarianRow>(
            r#"
            INSERT INTO librarians (name, employee_id, email, phone, hire_date,
                                    department, "position", active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, employee_id, email, phone, hire_date, department,
                      "position", active, created_at, updated_at
            "#,
        )
        .bind(&librarian.name)
        .bind(&librarian.employee_id)
        .bind(&librarian.email)
        .bind(&librarian.phone)
        .bind(librarian.hire_date)
        .bind(librarian.department.as_str())
        .bind(librarian.position.as_str())
        .bind(librarian.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(&self, id: i32) -> AppResult<Librarian> {
        let row = sqlx::query_as::<_, LibrarianRow>(
            r#"
            SELECT id, name, employee_id, email, phone, hire_date, department,
                   "position", active, created_at, updated_at
            FROM librarians
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Librarian with id {} not found", id)))?;

        Ok(row.into())
    }

    async fn find_by_employee_id(
        &self,
        employee_id: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<Option<Librarian>> {
        let row = sqlx::query_as::<_, LibrarianRow>(
            r#"
            SELECT id, name, employee_id, email, phone, hire_date, department,
                   "position", active, created_at, updated_at
            FROM librarians
            WHERE employee_id = $1
              AND ($2::int4 IS NULL OR id <> $2)
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Librarian::from))
    }

    async fn list(&self, query: &LibrarianQuery) -> AppResult<(Vec<Librarian>, i64)> {
        let department = query.department.map(|d| d.as_str());
        let position = query.position.map(|p| p.as_str());

        let rows = sqlx::query_as::<_, LibrarianRow>(
            r#"
            SELECT id, name, employee_id, email, phone, hire_date, department,
                   "position", active, created_at, updated_at
            FROM librarians
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR department = $2)
              AND ($3::text IS NULL OR "position" = $3)
              AND ($4::bool IS NULL OR active = $4)
            ORDER BY name, id
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(query.name.as_deref())
        .bind(department)
        .bind(position)
        .bind(query.active)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM librarians
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR department = $2)
              AND ($3::text IS NULL OR "position" = $3)
              AND ($4::bool IS NULL OR active = $4)
            "#,
        )
        .bind(query.name.as_deref())
        .bind(department)
        .bind(position)
        .bind(query.active)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Librarian::from).collect(), total))
    }

    async fn update(&self, id: i32, patch: &LibrarianPatch) -> AppResult<Librarian> {
        let row = sqlx::query_as::<_, LibrarianRow>(
            r#"
            UPDATE librarians SET
                name = COALESCE($2::text, name),
                employee_id = COALESCE($3::text, employee_id),
                email = COALESCE($4::text, email),
                phone = COALESCE($5::text, phone),
                hire_date = COALESCE($6::date, hire_date),
                department = COALESCE($7::text, department),
                "position" = COALESCE($8::text, "position"),
                active = COALESCE($9::bool, active),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, employee_id, email, phone, hire_date, department,
                      "position", active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.employee_id.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.phone.as_deref())
        .bind(patch.hire_date)
        .bind(patch.department.map(|d| d.as_str()))
        .bind(patch.position.map(|p| p.as_str()))
        .bind(patch.active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Librarian with id {} not found", id)))?;

        Ok(row.into())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        // The ledger keeps its history; the FK clears the staff reference
        let result = sqlx::query("DELETE FROM librarians WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Librarian with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
