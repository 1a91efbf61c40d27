//! Staff registry endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::librarian::{
        CreateLibrarian, Librarian, LibrarianDetails, LibrarianQuery, UpdateLibrarian,
    },
};

use super::PaginatedResponse;

/// List librarians with search and pagination
#[utoipa::path(
    get,
    path = "/librarians",
    tag = "librarians",
    params(LibrarianQuery),
    responses(
        (status = 200, description = "List of librarians", body = PaginatedResponse<LibrarianDetails>)
    )
)]
pub async fn list_librarians(
    State(state): State<crate::AppState>,
    Query(query): Query<LibrarianQuery>,
) -> AppResult<Json<PaginatedResponse<LibrarianDetails>>> {
    let (librarians, total) = state.services.staff.list(&query).await?;

    Ok(Json(PaginatedResponse {
        items: librarians,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get librarian details by ID
#[utoipa::path(
    get,
    path = "/librarians/{id}",
    tag = "librarians",
    params(
        ("id" = i32, Path, description = "Librarian ID")
    ),
    responses(
        (status = 200, description = "Librarian with service figures", body = LibrarianDetails),
        (status = 404, description = "Librarian not found")
    )
)]
pub async fn get_librarian(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<LibrarianDetails>> {
    let librarian = state.services.staff.get(id).await?;
    Ok(Json(librarian))
}

/// Hire a new librarian
#[utoipa::path(
    post,
    path = "/librarians",
    tag = "librarians",
    request_body = CreateLibrarian,
    responses(
        (status = 201, description = "Librarian hired", body = Librarian),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Employee id already assigned")
    )
)]
pub async fn create_librarian(
    State(state): State<crate::AppState>,
    Json(librarian): Json<CreateLibrarian>,
) -> AppResult<(StatusCode, Json<Librarian>)> {
    let hired = state.services.staff.hire(librarian).await?;
    Ok((StatusCode::CREATED, Json(hired)))
}

/// Update an existing librarian
#[utoipa::path(
    put,
    path = "/librarians/{id}",
    tag = "librarians",
    params(
        ("id" = i32, Path, description = "Librarian ID")
    ),
    request_body = UpdateLibrarian,
    responses(
        (status = 200, description = "Librarian updated", body = Librarian),
        (status = 404, description = "Librarian not found")
    )
)]
pub async fn update_librarian(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(librarian): Json<UpdateLibrarian>,
) -> AppResult<Json<Librarian>> {
    let updated = state.services.staff.update(id, librarian).await?;
    Ok(Json(updated))
}

/// Remove a librarian from the registry
#[utoipa::path(
    delete,
    path = "/librarians/{id}",
    tag = "librarians",
    params(
        ("id" = i32, Path, description = "Librarian ID")
    ),
    responses(
        (status = 204, description = "Librarian removed"),
        (status = 404, description = "Librarian not found")
    )
)]
pub async fn delete_librarian(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.staff.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
