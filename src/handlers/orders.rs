use super::common::{created_response, no_content_response, success_response, Actor};
use crate::{
    entities::order::Model as Order,
    errors::ServiceError,
    services::orders::{
        CreateOrderItemRequest, CreateOrderRequest, OrderDetail, OrderFilter, UpdateOrderRequest,
    },
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order).put(update_order).delete(delete_order))
        .route("/orders/:id/items", post(add_order_item))
        .route("/orders/:id/items/:item_id", delete(delete_order_item))
}

/// List orders
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(ListQuery, OrderFilter),
    responses((status = 200, description = "Orders page", body = crate::ApiResponse<PaginatedResponse<Order>>)),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<PaginatedResponse<Order>> {
    let params = state.page_params(query);
    let page = state.services.orders.list(params, filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// Get order by ID, with its items and company
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items", body = crate::ApiResponse<OrderDetail>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<OrderDetail> {
    let detail = state.services.orders.get_detail(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// Create a new order
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = crate::ApiResponse<OrderDetail>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order number already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.orders.create(payload, actor).await?;
    Ok(created_response(detail))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = crate::ApiResponse<OrderDetail>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.orders.update(id, payload).await?;
    Ok(success_response(detail))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.delete(id).await?;
    Ok(no_content_response())
}

/// Add item to order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/items",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = CreateOrderItemRequest,
    responses(
        (status = 201, description = "Item added", body = crate::ApiResponse<OrderDetail>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn add_order_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
    Json(payload): Json<CreateOrderItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.orders.add_item(id, payload, actor).await?;
    Ok(created_response(detail))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item removed", body = crate::ApiResponse<OrderDetail>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn delete_order_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<OrderDetail> {
    let detail = state.services.orders.delete_item(id, item_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}
