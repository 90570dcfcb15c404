use super::common::{created_response, no_content_response, Actor};
use crate::{
    entities::document::Model as Document,
    errors::ServiceError,
    services::documents::{DocumentFilter, NewDocument},
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents", get(list_documents).post(upload_document))
        .route("/documents/:id", get(get_document).delete(delete_document))
        .route("/documents/:id/content", get(download_document))
}

/// Query parameters accompanying a raw upload body.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadParams {
    pub file_name: String,
    pub company_id: Option<Uuid>,
    pub quotation_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/v1/documents",
    params(ListQuery, DocumentFilter),
    responses((status = 200, description = "Documents page", body = crate::ApiResponse<PaginatedResponse<Document>>)),
    tag = "Documents"
)]
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<DocumentFilter>,
) -> ApiResult<PaginatedResponse<Document>> {
    let params = state.page_params(query);
    let page = state.services.documents.list(params, filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document metadata", body = crate::ApiResponse<Document>),
        (status = 404, description = "Document not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Documents"
)]
pub async fn get_document(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Document> {
    let document = state.services.documents.get(id).await?;
    Ok(Json(ApiResponse::success(document)))
}

/// Upload a document; the request body is the raw file content
#[utoipa::path(
    post,
    path = "/api/v1/documents",
    params(UploadParams),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Document stored", body = crate::ApiResponse<Document>),
        (status = 400, description = "Empty upload or blank file name", body = crate::errors::ErrorResponse),
        (status = 413, description = "Upload too large", body = crate::errors::ErrorResponse)
    ),
    tag = "Documents"
)]
pub async fn upload_document(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let body = body.map_err(|rejection| {
        upload_rejection(rejection, state.config.storage.max_upload_bytes)
    })?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let upload = NewDocument {
        file_name: params.file_name,
        content_type,
        company_id: params.company_id,
        quotation_id: params.quotation_id,
        data: body,
    };
    let document = state.services.documents.upload(upload, actor).await?;
    Ok(created_response(document))
}

/// Download the stored bytes with their original content type
/// Body-limit rejections carry plain text; report them like every other error.
fn upload_rejection(rejection: BytesRejection, max_upload_bytes: usize) -> ServiceError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::PayloadTooLarge(format!(
            "Upload exceeds the limit of {max_upload_bytes} bytes"
        ))
    } else {
        ServiceError::BadRequest(rejection.body_text())
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}/content",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document content", content_type = "application/octet-stream"),
        (status = 404, description = "Document not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Documents"
)]
pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let (document, data) = state.services.documents.content(id).await?;

    let content_type = HeaderValue::from_str(&document.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let file_name = document.file_name.replace(['"', '\\', '\r', '\n'], "_");
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/api/v1/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Documents"
)]
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.documents.delete(id).await?;
    Ok(no_content_response())
}
