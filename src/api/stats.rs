//! Statistics endpoints

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

/// Statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Member registry figures
    pub members: MemberTotals,
    /// Catalog figures
    pub books: BookTotals,
    /// Ledger figures
    pub circulation: CirculationTotals,
}

#[derive(Serialize, ToSchema)]
pub struct MemberTotals {
    /// Total number of members
    pub total: i64,
    /// Members by status
    pub by_status: Vec<StatEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct BookTotals {
    /// Distinct titles in the catalog
    pub total: i64,
    /// Copies owned across all titles
    pub total_copies: i64,
    /// Copies on the shelf right now
    pub available_copies: i64,
    /// Titles by category
    pub by_category: Vec<StatEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct CirculationTotals {
    /// Every ledger record regardless of status
    pub total: i64,
    pub borrowed: i64,
    pub overdue: i64,
    pub returned: i64,
    /// Fine amounts summed across the whole ledger
    pub total_fines: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct StatEntry {
    /// Label
    pub label: String,
    /// Value
    pub value: i64,
}

/// Get library statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(State(state): State<crate::AppState>) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.stats.overview().await?;
    Ok(Json(stats))
}
