use super::common::{created_response, no_content_response, success_response, Actor};
use crate::{
    entities::product_category::Model as ProductCategory,
    errors::ServiceError,
    services::product_categories::{CreateCategoryRequest, UpdateCategoryRequest},
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
        .route("/product-categories", get(list_categories).post(create_category))
        .route(
            "/product-categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/product-categories",
    params(ListQuery),
    responses((status = 200, description = "Categories page", body = crate::ApiResponse<PaginatedResponse<ProductCategory>>)),
    tag = "Products"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<ProductCategory>> {
    let params = state.page_params(query);
    let page = state.services.product_categories.list(params).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/product-categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = crate::ApiResponse<ProductCategory>),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductCategory> {
    let category = state.services.product_categories.get(id).await?;
    Ok(Json(ApiResponse::success(category)))
}

#[utoipa::path(
    post,
    path = "/api/v1/product-categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = crate::ApiResponse<ProductCategory>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.services.product_categories.create(payload, actor).await?;
    Ok(created_response(category))
}

#[utoipa::path(
    put,
    path = "/api/v1/product-categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = crate::ApiResponse<ProductCategory>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.services.product_categories.update(id, payload).await?;
    Ok(success_response(category))
}

#[utoipa::path(
    delete,
    path = "/api/v1/product-categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.product_categories.delete(id).await?;
    Ok(no_content_response())
}
