use super::common::{created_response, no_content_response, success_response, Actor};
use crate::{
    entities::dictionary_entry::Model as DictionaryEntry,
    errors::ServiceError,
    services::dictionary::{CreateEntryRequest, UpdateEntryRequest},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dictionary", get(list_entries).post(create_entry))
        .route("/dictionary/:id", put(update_entry).delete(delete_entry))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DictionaryQuery {
    pub category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dictionary",
    params(DictionaryQuery),
    responses((status = 200, description = "Dictionary entries", body = crate::ApiResponse<Vec<DictionaryEntry>>)),
    tag = "Dictionary"
)]
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<DictionaryQuery>,
) -> ApiResult<Vec<DictionaryEntry>> {
    let entries = state.services.dictionary.list(query.category).await?;
    Ok(Json(ApiResponse::success(entries)))
}

#[utoipa::path(
    post,
    path = "/api/v1/dictionary",
    request_body = CreateEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = crate::ApiResponse<DictionaryEntry>),
        (status = 409, description = "Key already exists in category", body = crate::errors::ErrorResponse)
    ),
    tag = "Dictionary"
)]
pub async fn create_entry(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let entry = state.services.dictionary.create(payload, actor).await?;
    Ok(created_response(entry))
}

#[utoipa::path(
    put,
    path = "/api/v1/dictionary/{id}",
    params(("id" = Uuid, Path, description = "Entry ID")),
    request_body = UpdateEntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = crate::ApiResponse<DictionaryEntry>),
        (status = 404, description = "Entry not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Dictionary"
)]
pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEntryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let entry = state.services.dictionary.update(id, payload).await?;
    Ok(success_response(entry))
}

#[utoipa::path(
    delete,
    path = "/api/v1/dictionary/{id}",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Entry not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Dictionary"
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.dictionary.delete(id).await?;
    Ok(no_content_response())
}
