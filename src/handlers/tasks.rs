use super::common::{created_response, no_content_response, success_response, Actor};
use crate::{
    entities::task::Model as Task,
    errors::ServiceError,
    services::tasks::{CreateTaskRequest, TaskFilter, UpdateTaskRequest},
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
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", get(get_task).put(update_task).delete(delete_task))
}

/// List tasks by status, assignee or company
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    params(ListQuery, TaskFilter),
    responses((status = 200, description = "Tasks page", body = crate::ApiResponse<PaginatedResponse<Task>>)),
    tag = "Tasks"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<PaginatedResponse<Task>> {
    let params = state.page_params(query);
    let page = state.services.tasks.list(params, filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task", body = crate::ApiResponse<Task>),
        (status = 404, description = "Task not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Task> {
    let task = state.services.tasks.get(id).await?;
    Ok(Json(ApiResponse::success(task)))
}

#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = crate::ApiResponse<Task>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Assignee or company not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let task = state.services.tasks.create(payload, actor).await?;
    Ok(created_response(task))
}

#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = crate::ApiResponse<Task>),
        (status = 404, description = "Task not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let task = state.services.tasks.update(id, payload).await?;
    Ok(success_response(task))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.tasks.delete(id).await?;
    Ok(no_content_response())
}
