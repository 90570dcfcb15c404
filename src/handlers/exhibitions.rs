use super::common::{created_response, no_content_response, success_response, Actor};
use crate::{
    entities::{exhibition::Model as Exhibition, exhibition_cost::Model as ExhibitionCost},
    errors::ServiceError,
    services::exhibitions::{CreateCostRequest, CreateExhibitionRequest, UpdateExhibitionRequest},
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exhibitions", get(list_exhibitions).post(create_exhibition))
        .route(
            "/exhibitions/:id",
            get(get_exhibition).put(update_exhibition).delete(delete_exhibition),
        )
        .route(
            "/exhibitions/:id/costs",
            get(list_exhibition_costs).post(add_exhibition_cost),
        )
        .route("/exhibitions/:id/costs/:cost_id", delete(delete_exhibition_cost))
}

#[utoipa::path(
    get,
    path = "/api/v1/exhibitions",
    params(ListQuery),
    responses((status = 200, description = "Exhibitions page", body = crate::ApiResponse<PaginatedResponse<Exhibition>>)),
    tag = "Exhibitions"
)]
pub async fn list_exhibitions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<Exhibition>> {
    let params = state.page_params(query);
    let page = state.services.exhibitions.list(params).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/exhibitions/{id}",
    params(("id" = Uuid, Path, description = "Exhibition ID")),
    responses(
        (status = 200, description = "Exhibition", body = crate::ApiResponse<Exhibition>),
        (status = 404, description = "Exhibition not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Exhibitions"
)]
pub async fn get_exhibition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Exhibition> {
    let exhibition = state.services.exhibitions.get(id).await?;
    Ok(Json(ApiResponse::success(exhibition)))
}

#[utoipa::path(
    post,
    path = "/api/v1/exhibitions",
    request_body = CreateExhibitionRequest,
    responses(
        (status = 201, description = "Exhibition created", body = crate::ApiResponse<Exhibition>),
        (status = 400, description = "Invalid request or date range", body = crate::errors::ErrorResponse)
    ),
    tag = "Exhibitions"
)]
pub async fn create_exhibition(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateExhibitionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let exhibition = state.services.exhibitions.create(payload, actor).await?;
    Ok(created_response(exhibition))
}

#[utoipa::path(
    put,
    path = "/api/v1/exhibitions/{id}",
    params(("id" = Uuid, Path, description = "Exhibition ID")),
    request_body = UpdateExhibitionRequest,
    responses(
        (status = 200, description = "Exhibition updated", body = crate::ApiResponse<Exhibition>),
        (status = 404, description = "Exhibition not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Exhibitions"
)]
pub async fn update_exhibition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExhibitionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let exhibition = state.services.exhibitions.update(id, payload).await?;
    Ok(success_response(exhibition))
}

#[utoipa::path(
    delete,
    path = "/api/v1/exhibitions/{id}",
    params(("id" = Uuid, Path, description = "Exhibition ID")),
    responses(
        (status = 204, description = "Exhibition and its costs deleted"),
        (status = 404, description = "Exhibition not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Exhibitions"
)]
pub async fn delete_exhibition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.exhibitions.delete(id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/exhibitions/{id}/costs",
    params(("id" = Uuid, Path, description = "Exhibition ID")),
    responses((status = 200, description = "Costs of the exhibition", body = crate::ApiResponse<Vec<ExhibitionCost>>)),
    tag = "Exhibitions"
)]
pub async fn list_exhibition_costs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<ExhibitionCost>> {
    let costs = state.services.exhibitions.costs(id).await?;
    Ok(Json(ApiResponse::success(costs)))
}

#[utoipa::path(
    post,
    path = "/api/v1/exhibitions/{id}/costs",
    params(("id" = Uuid, Path, description = "Exhibition ID")),
    request_body = CreateCostRequest,
    responses(
        (status = 201, description = "Cost recorded", body = crate::ApiResponse<ExhibitionCost>),
        (status = 404, description = "Exhibition not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Exhibitions"
)]
pub async fn add_exhibition_cost(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
    Json(payload): Json<CreateCostRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let cost = state.services.exhibitions.add_cost(id, payload, actor).await?;
    Ok(created_response(cost))
}

#[utoipa::path(
    delete,
    path = "/api/v1/exhibitions/{id}/costs/{cost_id}",
    params(
        ("id" = Uuid, Path, description = "Exhibition ID"),
        ("cost_id" = Uuid, Path, description = "Cost ID")
    ),
    responses(
        (status = 204, description = "Cost deleted"),
        (status = 404, description = "Cost not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Exhibitions"
)]
pub async fn delete_exhibition_cost(
    State(state): State<AppState>,
    Path((id, cost_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.exhibitions.delete_cost(id, cost_id).await?;
    Ok(no_content_response())
}
