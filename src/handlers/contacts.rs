use super::common::{created_response, no_content_response, success_response, Actor, CompanyScope};
use crate::{
    entities::contact::Model as Contact,
    errors::ServiceError,
    services::contacts::{CreateContactRequest, UpdateContactRequest},
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
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/contacts",
    params(ListQuery, CompanyScope),
    responses((status = 200, description = "Contacts page", body = crate::ApiResponse<PaginatedResponse<Contact>>)),
    tag = "Contacts"
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(scope): Query<CompanyScope>,
) -> ApiResult<PaginatedResponse<Contact>> {
    let params = state.page_params(query);
    let page = state.services.contacts.list(params, scope.company_id).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact", body = crate::ApiResponse<Contact>),
        (status = 404, description = "Contact not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Contacts"
)]
pub async fn get_contact(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Contact> {
    let contact = state.services.contacts.get(id).await?;
    Ok(Json(ApiResponse::success(contact)))
}

#[utoipa::path(
    post,
    path = "/api/v1/contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Contact created", body = crate::ApiResponse<Contact>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Contacts"
)]
pub async fn create_contact(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateContactRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let contact = state.services.contacts.create(payload, actor).await?;
    Ok(created_response(contact))
}

#[utoipa::path(
    put,
    path = "/api/v1/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact ID")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Contact updated", body = crate::ApiResponse<Contact>),
        (status = 404, description = "Contact not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Contacts"
)]
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let contact = state.services.contacts.update(id, payload).await?;
    Ok(success_response(contact))
}

#[utoipa::path(
    delete,
    path = "/api/v1/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 404, description = "Contact not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Contacts"
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.contacts.delete(id).await?;
    Ok(no_content_response())
}
