use super::common::{created_response, no_content_response, success_response, Actor};
use crate::{
    entities::{company::Model as Company, contact::Model as Contact, note::Model as Note},
    errors::ServiceError,
    services::companies::{CreateCompanyRequest, UpdateCompanyRequest},
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
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/:id",
            get(get_company).put(update_company).delete(delete_company),
        )
        .route("/companies/:id/contacts", get(list_company_contacts))
        .route("/companies/:id/notes", get(list_company_notes))
}

/// List companies
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    params(ListQuery),
    responses(
        (status = 200, description = "Companies page", body = crate::ApiResponse<PaginatedResponse<Company>>)
    ),
    tag = "Companies"
)]
pub async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<Company>> {
    let params = state.page_params(query);
    let page = state.services.companies.list(params).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company", body = crate::ApiResponse<Company>),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Companies"
)]
pub async fn get_company(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Company> {
    let company = state.services.companies.get(id).await?;
    Ok(Json(ApiResponse::success(company)))
}

/// Create a company
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = crate::ApiResponse<Company>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "Companies"
)]
pub async fn create_company(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let company = state.services.companies.create(payload, actor).await?;
    Ok(created_response(company))
}

#[utoipa::path(
    put,
    path = "/api/v1/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated", body = crate::ApiResponse<Company>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Companies"
)]
pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let company = state.services.companies.update(id, payload).await?;
    Ok(success_response(company))
}

/// Delete a company; refused while quotations or orders reference it
#[utoipa::path(
    delete,
    path = "/api/v1/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 204, description = "Company deleted"),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Company still referenced", body = crate::errors::ErrorResponse)
    ),
    tag = "Companies"
)]
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.companies.delete(id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}/contacts",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses((status = 200, description = "Contacts of the company", body = crate::ApiResponse<Vec<Contact>>)),
    tag = "Companies"
)]
pub async fn list_company_contacts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Contact>> {
    let contacts = state.services.companies.contacts(id).await?;
    Ok(Json(ApiResponse::success(contacts)))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}/notes",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses((status = 200, description = "Notes about the company", body = crate::ApiResponse<Vec<Note>>)),
    tag = "Companies"
)]
pub async fn list_company_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Note>> {
    let notes = state.services.companies.notes(id).await?;
    Ok(Json(ApiResponse::success(notes)))
}
