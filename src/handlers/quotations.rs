use super::common::{created_response, no_content_response, success_response, Actor};
use crate::{
    entities::quotation::Model as Quotation,
    errors::ServiceError,
    services::{
        orders::OrderDetail,
        quotations::{
            CreateQuotationItemRequest, CreateQuotationRequest, QuotationDetail, QuotationFilter,
            UpdateQuotationItemRequest, UpdateQuotationRequest,
        },
    },
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotations", get(list_quotations).post(create_quotation))
        .route(
            "/quotations/:id",
            get(get_quotation).put(update_quotation).delete(delete_quotation),
        )
        .route("/quotations/:id/items", post(add_quotation_item))
        .route(
            "/quotations/:id/items/:item_id",
            put(update_quotation_item).delete(delete_quotation_item),
        )
        .route("/quotations/:id/pdf", get(quotation_pdf))
        .route("/quotations/:id/convert", post(convert_quotation))
}

/// List quotations, optionally by company or status
#[utoipa::path(
    get,
    path = "/api/v1/quotations",
    params(ListQuery, QuotationFilter),
    responses((status = 200, description = "Quotations page", body = crate::ApiResponse<PaginatedResponse<Quotation>>)),
    tag = "Quotations"
)]
pub async fn list_quotations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<QuotationFilter>,
) -> ApiResult<PaginatedResponse<Quotation>> {
    let params = state.page_params(query);
    let page = state.services.quotations.list(params, filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// Get a quotation with its items, company and contact
#[utoipa::path(
    get,
    path = "/api/v1/quotations/{id}",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    responses(
        (status = 200, description = "Quotation with items", body = crate::ApiResponse<QuotationDetail>),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotations"
)]
pub async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<QuotationDetail> {
    let detail = state.services.quotations.get_detail(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// Create a quotation, optionally with its initial items
#[utoipa::path(
    post,
    path = "/api/v1/quotations",
    request_body = CreateQuotationRequest,
    responses(
        (status = 201, description = "Quotation created", body = crate::ApiResponse<QuotationDetail>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Company, contact or product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotations"
)]
pub async fn create_quotation(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateQuotationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.quotations.create(payload, actor).await?;
    Ok(created_response(detail))
}

#[utoipa::path(
    put,
    path = "/api/v1/quotations/{id}",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    request_body = UpdateQuotationRequest,
    responses(
        (status = 200, description = "Quotation updated", body = crate::ApiResponse<QuotationDetail>),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotations"
)]
pub async fn update_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuotationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.quotations.update(id, payload).await?;
    Ok(success_response(detail))
}

#[utoipa::path(
    delete,
    path = "/api/v1/quotations/{id}",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    responses(
        (status = 204, description = "Quotation deleted"),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotations"
)]
pub async fn delete_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.quotations.delete(id).await?;
    Ok(no_content_response())
}

/// Add a line item; the quotation total is recomputed in the same transaction
#[utoipa::path(
    post,
    path = "/api/v1/quotations/{id}/items",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    request_body = CreateQuotationItemRequest,
    responses(
        (status = 201, description = "Item added", body = crate::ApiResponse<QuotationDetail>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quotation or product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotations"
)]
pub async fn add_quotation_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
    Json(payload): Json<CreateQuotationItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.quotations.add_item(id, payload, actor).await?;
    Ok(created_response(detail))
}

#[utoipa::path(
    put,
    path = "/api/v1/quotations/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Quotation ID"),
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    request_body = UpdateQuotationItemRequest,
    responses(
        (status = 200, description = "Item updated", body = crate::ApiResponse<QuotationDetail>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotations"
)]
pub async fn update_quotation_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateQuotationItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.quotations.update_item(id, item_id, payload).await?;
    Ok(success_response(detail))
}

#[utoipa::path(
    delete,
    path = "/api/v1/quotations/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Quotation ID"),
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item removed, total recomputed", body = crate::ApiResponse<QuotationDetail>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotations"
)]
pub async fn delete_quotation_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<QuotationDetail> {
    let detail = state.services.quotations.delete_item(id, item_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// Download the quotation as PDF
#[utoipa::path(
    get,
    path = "/api/v1/quotations/{id}/pdf",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf"),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotations"
)]
pub async fn quotation_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let (file_name, bytes) = state.services.quotations.render_pdf(id).await?;
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Convert the quotation into an order
#[utoipa::path(
    post,
    path = "/api/v1/quotations/{id}/convert",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    responses(
        (status = 201, description = "Order created from the quotation", body = crate::ApiResponse<OrderDetail>),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Quotation already converted, rejected or expired", body = crate::errors::ErrorResponse)
    ),
    tag = "Quotations"
)]
pub async fn convert_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.quotations.convert_to_order(id, actor).await?;
    Ok(created_response(order))
}
