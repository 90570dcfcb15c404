use super::common::{no_content_response, success_response, Actor};
use crate::{
    entities::setting::Model as Setting,
    errors::ServiceError,
    services::settings::UpsertSettingRequest,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(list_settings))
        .route(
            "/settings/:key",
            get(get_setting).put(upsert_setting).delete(delete_setting),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses((status = 200, description = "All settings", body = crate::ApiResponse<Vec<Setting>>)),
    tag = "Settings"
)]
pub async fn list_settings(State(state): State<AppState>) -> ApiResult<Vec<Setting>> {
    let settings = state.services.settings.list().await?;
    Ok(Json(ApiResponse::success(settings)))
}

#[utoipa::path(
    get,
    path = "/api/v1/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting", body = crate::ApiResponse<Setting>),
        (status = 404, description = "Setting not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Settings"
)]
pub async fn get_setting(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<Setting> {
    let setting = state.services.settings.get(&key).await?;
    Ok(Json(ApiResponse::success(setting)))
}

/// Create or replace a setting; `company_profile` must hold a valid seller block
#[utoipa::path(
    put,
    path = "/api/v1/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpsertSettingRequest,
    responses(
        (status = 200, description = "Setting stored", body = crate::ApiResponse<Setting>),
        (status = 400, description = "Invalid key or value", body = crate::errors::ErrorResponse)
    ),
    tag = "Settings"
)]
pub async fn upsert_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Actor(actor): Actor,
    Json(payload): Json<UpsertSettingRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let setting = state.services.settings.upsert(&key, payload, actor).await?;
    Ok(success_response(setting))
}

#[utoipa::path(
    delete,
    path = "/api/v1/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 204, description = "Setting deleted"),
        (status = 404, description = "Setting not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Settings"
)]
pub async fn delete_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.settings.delete(&key).await?;
    Ok(no_content_response())
}
