//! Biblos Library Circulation Management System
//!
//! A Rust implementation of the Biblos circulation server, providing a REST
//! JSON API for managing members, the book catalog, staff and the borrowing
//! ledger.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduler;
pub mod sequence;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
