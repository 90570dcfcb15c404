use crate::{services::dashboard::DashboardSummary, ApiResponse, ApiResult, AppState};
use axum::{extract::State, routing::get, Json, Router};

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// Entity counts plus month and year activity, amounts in the reference currency
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses((status = 200, description = "Dashboard summary", body = crate::ApiResponse<DashboardSummary>)),
    tag = "Dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let summary = state.services.dashboard.summary().await?;
    Ok(Json(ApiResponse::success(summary)))
}
