//! In-process router tests backed by the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use biblos_server::config::AppConfig;
use biblos_server::repository::Repository;
use biblos_server::services::Services;
use biblos_server::{api, AppState};

fn app() -> Router {
    let config = AppConfig {
        server: Default::default(),
        store: Default::default(),
        database: Default::default(),
        logging: Default::default(),
        circulation: Default::default(),
        scheduler: Default::default(),
    };
    let services = Services::new(Repository::in_memory(), &config.circulation);

    api::create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse body")
    };

    (status, body)
}

async fn create_member(app: &Router, name: &str, phone: &str) -> i64 {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/members",
        Some(json!({ "name": name, "email": email, "phone": phone })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("No member ID")
}

async fn create_book(app: &Router, title: &str, isbn: &str, copies: i32) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/books",
        Some(json!({
            "title": title,
            "author": "N. Author",
            "isbn": isbn,
            "total_copies": copies
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("No book ID")
}

async fn create_librarian(app: &Router, employee_id: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/librarians",
        Some(json!({ "name": "Desk Librarian", "employee_id": employee_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("No librarian ID")
}

async fn checkout(app: &Router, member_id: i64, book_id: i64, librarian_id: i64) -> Value {
    let due = (Utc::now().date_naive() + Duration::days(14)).to_string();
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/borrowings",
        Some(json!({
            "member_id": member_id,
            "book_id": book_id,
            "librarian_id": librarian_id,
            "expected_return_date": due
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn health_and_readiness_respond() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = send(&app, "GET", "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Biblos API");
    assert!(body["paths"]["/members"].is_object());
}

#[tokio::test]
async fn member_registration_flow() {
    let app = app();
    let today = Utc::now().date_naive().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/members",
        Some(json!({
            "name": "Alice Reader",
            "email": "alice.reader@example.com",
            "phone": "+33612345678"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "active");
    assert_eq!(body["join_date"], today);
    assert!(body["member_number"]
        .as_str()
        .expect("No member number")
        .starts_with("MBR"));
    let id = body["id"].as_i64().expect("No member ID");

    // Details carry the borrow limit and zeroed figures
    let (status, body) = send(&app, "GET", &format!("/api/v1/members/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["max_borrow_limit"], 10);
    assert_eq!(body["stats"]["current_borrowed"], 0);
    assert_eq!(body["stats"]["total_books_borrowed"], 0);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/members/{}", id),
        Some(json!({ "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "inactive");

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/members/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/v1/members/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn invalid_member_payloads_are_rejected() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/members",
        Some(json!({
            "name": "Bad Email",
            "email": "not-an-email",
            "phone": "0612345678"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 12);

    // Same phone twice is a conflict
    create_member(&app, "First Holder", "0699000001").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/members",
        Some(json!({
            "name": "Second Holder",
            "email": "second.holder@example.com",
            "phone": "0699000001"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 11);
    assert!(body["message"]
        .as_str()
        .expect("No message")
        .contains("First Holder"));
}

#[tokio::test]
async fn full_circulation_flow() {
    let app = app();
    let member_id = create_member(&app, "Flow Member", "0612000001").await;
    let book_id = create_book(&app, "The Left Hand of Darkness", "9780441478125", 2).await;
    let librarian_id = create_librarian(&app, "LIB001").await;

    let record = checkout(&app, member_id, book_id, librarian_id).await;
    let record_id = record["id"].as_i64().expect("No record ID");
    assert_eq!(record["status"], "borrowed");
    assert_eq!(record["days_overdue"], 0);
    assert!(record["record_number"]
        .as_str()
        .expect("No record number")
        .starts_with("BRW"));

    // One of the two copies is out
    let (_, body) = send(&app, "GET", &format!("/api/v1/books/{}", book_id), None).await;
    assert_eq!(body["available_copies"], 1);
    assert_eq!(body["active_loans"], 1);

    let (_, body) = send(&app, "GET", &format!("/api/v1/members/{}", member_id), None).await;
    assert_eq!(body["stats"]["current_borrowed"], 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/members/{}/borrowings", member_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("Not an array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["book_title"], "The Left Hand of Darkness");

    // Return the book
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/borrowings/{}/return", record_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "returned");
    assert_eq!(body["days_overdue"], 0);
    assert_eq!(body["message"], "Book returned on time");
    assert_eq!(body["record"]["status"], "returned");

    let (_, body) = send(&app, "GET", &format!("/api/v1/books/{}", book_id), None).await;
    assert_eq!(body["available_copies"], 2);

    // A returned record can be deleted, then the member has no history left
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/borrowings/{}", record_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/members/{}", member_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn checkout_conflicts_and_unknown_parties() {
    let app = app();
    let first = create_member(&app, "First Borrower", "0612000002").await;
    let second = create_member(&app, "Second Borrower", "0612000003").await;
    let book_id = create_book(&app, "Single Copy", "9780441478126", 1).await;
    let librarian_id = create_librarian(&app, "LIB002").await;

    checkout(&app, first, book_id, librarian_id).await;

    // The only copy is out
    let due = (Utc::now().date_naive() + Duration::days(14)).to_string();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/borrowings",
        Some(json!({
            "member_id": second,
            "book_id": book_id,
            "librarian_id": librarian_id,
            "expected_return_date": &due
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 6);
    assert!(body["message"]
        .as_str()
        .expect("No message")
        .contains("Single Copy"));

    // Unknown member
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/borrowings",
        Some(json!({
            "member_id": 9999,
            "book_id": book_id,
            "librarian_id": librarian_id,
            "expected_return_date": &due
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn returning_twice_is_a_conflict() {
    let app = app();
    let member_id = create_member(&app, "Prompt Returner", "0612000004").await;
    let book_id = create_book(&app, "Returnable", "9780441478127", 1).await;
    let librarian_id = create_librarian(&app, "LIB003").await;

    let record = checkout(&app, member_id, book_id, librarian_id).await;
    let record_id = record["id"].as_i64().expect("No record ID");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/borrowings/{}/return", record_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/borrowings/{}/return", record_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7);
}

#[tokio::test]
async fn backdated_checkout_accrues_and_extensions_move_dates() {
    let app = app();
    let member_id = create_member(&app, "Late Member", "0612000005").await;
    let book_id = create_book(&app, "Overdue Book", "9780441478128", 2).await;
    let librarian_id = create_librarian(&app, "LIB004").await;

    let today = Utc::now().date_naive();

    // Backdated past its due date: the record starts out overdue
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/borrowings",
        Some(json!({
            "member_id": member_id,
            "book_id": book_id,
            "librarian_id": librarian_id,
            "borrow_date": (today - Duration::days(10)).to_string(),
            "expected_return_date": (today - Duration::days(3)).to_string()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "overdue");
    assert_eq!(body["days_overdue"], 3);
    assert_eq!(body["fine_amount"], "15.00");
    let overdue_id = body["id"].as_i64().expect("No record ID");

    // Overdue records cannot be extended
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/borrowings/{}/extend", overdue_id),
        Some(json!({
            "new_expected_return_date": (today + Duration::days(7)).to_string()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4);

    // A borrowed record can be, as long as the date moves forward
    let record = checkout(&app, member_id, book_id, librarian_id).await;
    let record_id = record["id"].as_i64().expect("No record ID");
    let new_due = (today + Duration::days(21)).to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/borrowings/{}/extend", record_id),
        Some(json!({ "new_expected_return_date": &new_due })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expected_return_date"], new_due);
}

#[tokio::test]
async fn active_records_cannot_be_deleted() {
    let app = app();
    let member_id = create_member(&app, "Keeper", "0612000006").await;
    let book_id = create_book(&app, "Held Book", "9780441478129", 1).await;
    let librarian_id = create_librarian(&app, "LIB005").await;

    let record = checkout(&app, member_id, book_id, librarian_id).await;
    let record_id = record["id"].as_i64().expect("No record ID");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/borrowings/{}", record_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 8);

    // The member now has history and cannot be deleted either
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/members/{}", member_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 9);
}

#[tokio::test]
async fn lists_paginate_with_defaults() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/v1/members?page=1&per_page=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 5);
    assert_eq!(body["items"].as_array().expect("Not an array").len(), 0);

    let (status, body) = send(&app, "GET", "/api/v1/borrowings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 20);
}

#[tokio::test]
async fn maintenance_jobs_run_on_demand() {
    let app = app();
    let member_id = create_member(&app, "Sweep Target", "0612000007").await;
    let book_id = create_book(&app, "Swept Book", "9780441478130", 1).await;
    let librarian_id = create_librarian(&app, "LIB006").await;

    let today = Utc::now().date_naive();
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/borrowings",
        Some(json!({
            "member_id": member_id,
            "book_id": book_id,
            "librarian_id": librarian_id,
            "borrow_date": (today - Duration::days(10)).to_string(),
            "expected_return_date": (today - Duration::days(3)).to_string()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // The record is already overdue with a current fine, so the sweep
    // examines it and leaves it alone
    let (status, body) = send(&app, "POST", "/api/v1/jobs/sweep", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["examined"], 1);
    assert_eq!(body["newly_overdue"], 0);
    assert_eq!(body["unchanged"], 1);
    assert_eq!(body["failures"].as_array().expect("Not an array").len(), 0);

    let (status, body) = send(&app, "POST", "/api/v1/jobs/member-review", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members_reviewed"], 1);
    assert_eq!(body["active_with_overdue"], 1);
    assert_eq!(body["flagged"].as_array().expect("Not an array").len(), 0);
}

#[tokio::test]
async fn stats_reflect_the_ledger() {
    let app = app();
    let member_id = create_member(&app, "Stats Member", "0612000008").await;
    let book_id = create_book(&app, "Counted Book", "9780441478131", 2).await;
    let librarian_id = create_librarian(&app, "LIB007").await;

    checkout(&app, member_id, book_id, librarian_id).await;

    let (status, body) = send(&app, "GET", "/api/v1/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"]["total"], 1);
    assert_eq!(body["members"]["by_status"][0]["label"], "active");
    assert_eq!(body["members"]["by_status"][0]["value"], 1);
    assert_eq!(body["books"]["total"], 1);
    assert_eq!(body["books"]["total_copies"], 2);
    assert_eq!(body["books"]["available_copies"], 1);
    assert_eq!(body["circulation"]["total"], 1);
    assert_eq!(body["circulation"]["borrowed"], 1);
    assert_eq!(body["circulation"]["returned"], 0);
}
