//! Circulation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrowing::{BorrowingDetails, BorrowingQuery, BorrowingRecord, CreateBorrowing},
};

use super::PaginatedResponse;

/// Extend due date request
#[derive(Deserialize, ToSchema)]
pub struct ExtendDueDateRequest {
    /// Replacement due date; must be after the current one
    pub new_expected_return_date: NaiveDate,
}

/// Return response with the settled record
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    /// Days past the expected return date
    pub days_overdue: i64,
    /// Fine charged for the late return
    pub fine_amount: Decimal,
    /// Status message
    pub message: String,
    /// Settled ledger record
    pub record: BorrowingRecord,
}

/// List borrowing records with filters and pagination
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    params(BorrowingQuery),
    responses(
        (status = 200, description = "List of borrowing records", body = PaginatedResponse<BorrowingDetails>)
    )
)]
pub async fn list_borrowings(
    State(state): State<crate::AppState>,
    Query(query): Query<BorrowingQuery>,
) -> AppResult<Json<PaginatedResponse<BorrowingDetails>>> {
    let (records, total) = state.services.circulation.list(&query).await?;

    Ok(Json(PaginatedResponse {
        items: records,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get a borrowing record by ID
#[utoipa::path(
    get,
    path = "/borrowings/{id}",
    tag = "borrowings",
    params(
        ("id" = i32, Path, description = "Borrowing record ID")
    ),
    responses(
        (status = 200, description = "Borrowing record", body = BorrowingDetails),
        (status = 404, description = "Record not found")
    )
)]
pub async fn get_borrowing(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowingDetails>> {
    let details = state.services.circulation.get_details(id).await?;
    Ok(Json(details))
}

/// Get a member's borrowing history
#[utoipa::path(
    get,
    path = "/members/{id}/borrowings",
    tag = "borrowings",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member's borrowing records, newest first", body = Vec<BorrowingDetails>),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member_borrowings(
    State(state): State<crate::AppState>,
    Path(member_id): Path<i32>,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let records = state
        .services
        .circulation
        .member_borrowings(member_id)
        .await?;
    Ok(Json(records))
}

/// Check a book out to a member
#[utoipa::path(
    post,
    path = "/borrowings",
    tag = "borrowings",
    request_body = CreateBorrowing,
    responses(
        (status = 201, description = "Borrowing record created", body = BorrowingRecord),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Member, book or librarian not found"),
        (status = 422, description = "Borrowing limit reached or no copy available")
    )
)]
pub async fn create_borrowing(
    State(state): State<crate::AppState>,
    Json(borrowing): Json<CreateBorrowing>,
) -> AppResult<(StatusCode, Json<BorrowingRecord>)> {
    let created = state.services.circulation.checkout(borrowing).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrowings/{id}/return",
    tag = "borrowings",
    params(
        ("id" = i32, Path, description = "Borrowing record ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "Record not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_borrowing(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let record = state.services.circulation.return_book(id).await?;

    let message = if record.days_overdue > 0 {
        format!(
            "Book returned {} days late. Fine: {}",
            record.days_overdue, record.fine_amount
        )
    } else {
        "Book returned on time".to_string()
    };

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        days_overdue: record.days_overdue,
        fine_amount: record.fine_amount,
        message,
        record,
    }))
}

/// Extend the due date of a borrowed book
#[utoipa::path(
    post,
    path = "/borrowings/{id}/extend",
    tag = "borrowings",
    params(
        ("id" = i32, Path, description = "Borrowing record ID")
    ),
    request_body = ExtendDueDateRequest,
    responses(
        (status = 200, description = "Due date extended", body = BorrowingRecord),
        (status = 400, description = "Record is not extendable"),
        (status = 404, description = "Record not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn extend_borrowing(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<ExtendDueDateRequest>,
) -> AppResult<Json<BorrowingRecord>> {
    let extended = state
        .services
        .circulation
        .extend_due_date(id, request.new_expected_return_date)
        .await?;
    Ok(Json(extended))
}

/// Delete a returned borrowing record
#[utoipa::path(
    delete,
    path = "/borrowings/{id}",
    tag = "borrowings",
    params(
        ("id" = i32, Path, description = "Borrowing record ID")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Record not found"),
        (status = 422, description = "Record still active")
    )
)]
pub async fn delete_borrowing(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.circulation.delete_record(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
