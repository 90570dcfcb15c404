use super::common::{created_response, no_content_response, success_response, Actor};
use crate::{
    entities::product::Model as Product,
    errors::ServiceError,
    services::products::{CreateProductRequest, ProductFilter, UpdateProductRequest},
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
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// List products, optionally by category or active flag
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ListQuery, ProductFilter),
    responses((status = 200, description = "Products page", body = crate::ApiResponse<PaginatedResponse<Product>>)),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<ProductFilter>,
) -> ApiResult<PaginatedResponse<Product>> {
    let params = state.page_params(query);
    let page = state.services.products.list(params, filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = crate::ApiResponse<Product>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Product> {
    let product = state.services.products.get(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = crate::ApiResponse<Product>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.create(payload, actor).await?;
    Ok(created_response(product))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = crate::ApiResponse<Product>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.update(id, payload).await?;
    Ok(success_response(product))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete(id).await?;
    Ok(no_content_response())
}
