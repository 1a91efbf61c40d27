//! On-demand runs of the maintenance jobs

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    services::sweeper::{MemberReviewReport, SweepReport},
};

/// Run the overdue sweep now
#[utoipa::path(
    post,
    path = "/jobs/sweep",
    tag = "jobs",
    responses(
        (status = 200, description = "Sweep finished", body = SweepReport)
    )
)]
pub async fn run_sweep(State(state): State<crate::AppState>) -> AppResult<Json<SweepReport>> {
    let report = state.services.sweeper.run_sweep().await?;
    Ok(Json(report))
}

/// Run the member review now
#[utoipa::path(
    post,
    path = "/jobs/member-review",
    tag = "jobs",
    responses(
        (status = 200, description = "Review finished", body = MemberReviewReport)
    )
)]
pub async fn run_member_review(
    State(state): State<crate::AppState>,
) -> AppResult<Json<MemberReviewReport>> {
    let report = state.services.sweeper.review_members().await?;
    Ok(Json(report))
}
