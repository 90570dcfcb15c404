use super::common::{created_response, no_content_response, success_response, Actor, CompanyScope};
use crate::{
    entities::note::Model as Note,
    errors::ServiceError,
    services::notes::{CreateNoteRequest, UpdateNoteRequest},
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/:id", get(get_note).put(update_note).delete(delete_note))
}

#[utoipa::path(
    get,
    path = "/api/v1/notes",
    params(ListQuery, CompanyScope),
    responses((status = 200, description = "Notes page", body = crate::ApiResponse<PaginatedResponse<Note>>)),
    tag = "Notes"
)]
pub async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(scope): Query<CompanyScope>,
) -> ApiResult<PaginatedResponse<Note>> {
    let params = state.page_params(query);
    let page = state.services.notes.list(params, scope.company_id).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note", body = crate::ApiResponse<Note>),
        (status = 404, description = "Note not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Notes"
)]
pub async fn get_note(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Note> {
    let note = state.services.notes.get(id).await?;
    Ok(Json(ApiResponse::success(note)))
}

#[utoipa::path(
    post,
    path = "/api/v1/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = crate::ApiResponse<Note>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "Notes"
)]
pub async fn create_note(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let note = state.services.notes.create(payload, actor).await?;
    Ok(created_response(note))
}

#[utoipa::path(
    put,
    path = "/api/v1/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated", body = crate::ApiResponse<Note>),
        (status = 404, description = "Note not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Notes"
)]
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let note = state.services.notes.update(id, payload).await?;
    Ok(success_response(note))
}

#[utoipa::path(
    delete,
    path = "/api/v1/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "Note not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Notes"
)]
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.notes.delete(id).await?;
    Ok(no_content_response())
}
