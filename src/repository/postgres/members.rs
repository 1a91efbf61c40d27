//! PostgreSQL member store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, Pool, Postgres};

use crate::error::{AppError, AppResult};
use crate::models::member::{Member, MemberPatch, MemberQuery, MemberStatus, NewMember};
use crate::repository::MemberRepository;

#[derive(Clone)]
pub struct PgMemberRepository {
    pool: Pool<Postgres>,
}

impl PgMemberRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MemberRow {
    id: i32,
    member_number: String,
    name: String,
    email: String,
    phone: String,
    join_date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.id,
            member_number: row.member_number,
            name: row.name,
            email: row.email,
            phone: row.phone,
            join_date: row.join_date,
            // The schema check constraint keeps the column valid
            status: row.status.parse().unwrap_or(MemberStatus::Active),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn insert(&self, member: NewMember) -> AppResult<Member> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            INSERT INTO members (member_number, name, email, phone, join_date, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, member_number, name, email, phone, join_date, status,
                      created_at, updated_at
            "#,
        )
        .bind(&member.member_number)
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(member.join_date)
        .bind(member.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(&self, id: i32) -> AppResult<Member> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, member_number, name, email, phone, join_date, status,
                   created_at, updated_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))?;

        Ok(row.into())
    }

    async fn phone_holder(
        &self,
        phone: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, member_number, name, email, phone, join_date, status,
                   created_at, updated_at
            FROM members
            WHERE phone = $1
              AND status <> 'inactive'
              AND ($2::int4 IS NULL OR id <> $2)
            LIMIT 1
            "#,
        )
        .bind(phone)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Member::from))
    }

    async fn list(&self, query: &MemberQuery) -> AppResult<(Vec<Member>, i64)> {
        let status = query.status.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, member_number, name, email, phone, join_date, status,
                   created_at, updated_at
            FROM members
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR phone = $3)
            ORDER BY name, id
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(query.name.as_deref())
        .bind(status)
        .bind(query.phone.as_deref())
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM members
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR phone = $3)
            "#,
        )
        .bind(query.name.as_deref())
        .bind(status)
        .bind(query.phone.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Member::from).collect(), total))
    }

    async fn all(&self) -> AppResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, member_number, name, email, phone, join_date, status,
                   created_at, updated_at
            FROM members
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn update(&self, id: i32, patch: &MemberPatch) -> AppResult<Member> {
        let now = Utc::now();
        let status = patch.status.map(|s| s.as_str().to_string());

        // Build dynamic update query
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut param_idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(patch.name, "name");
        add_field!(patch.email, "email");
        add_field!(patch.phone, "phone");

        if status.is_some() {
            sets.push(format!("status = ${}", param_idx));
        }

        let query = format!("UPDATE members SET {} WHERE id = {}", sets.join(", "), id);

        let mut builder = sqlx::query(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(patch.name);
        bind_field!(patch.email);
        bind_field!(patch.phone);
        bind_field!(status);

        let result = builder.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Member with id {} not found",
                id
            )));
        }

        self.get(id).await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Member with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
