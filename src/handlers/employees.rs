use super::common::{created_response, no_content_response, success_response, Actor};
use crate::{
    entities::{employee::Model as Employee, employee_role::Model as EmployeeRole},
    errors::ServiceError,
    services::employees::{
        CreateEmployeeRequest, CreateRoleRequest, UpdateEmployeeRequest, UpdateRoleRequest,
    },
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .route("/employee-roles", get(list_roles).post(create_role))
        .route("/employee-roles/:id", put(update_role).delete(delete_role))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(ListQuery),
    responses((status = 200, description = "Employees page", body = crate::ApiResponse<PaginatedResponse<Employee>>)),
    tag = "Employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<Employee>> {
    let params = state.page_params(query);
    let page = state.services.employees.list(params).await?;
    Ok(Json(ApiResponse::success(page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee", body = crate::ApiResponse<Employee>),
        (status = 404, description = "Employee not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Employees"
)]
pub async fn get_employee(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Employee> {
    let employee = state.services.employees.get(id).await?;
    Ok(Json(ApiResponse::success(employee)))
}

#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = crate::ApiResponse<Employee>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "Employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let employee = state.services.employees.create(payload, actor).await?;
    Ok(created_response(employee))
}

#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = crate::ApiResponse<Employee>),
        (status = 404, description = "Employee not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Employees"
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let employee = state.services.employees.update(id, payload).await?;
    Ok(success_response(employee))
}

#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Employees"
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.employees.delete(id).await?;
    Ok(no_content_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/employee-roles",
    responses((status = 200, description = "All roles", body = crate::ApiResponse<Vec<EmployeeRole>>)),
    tag = "Employees"
)]
pub async fn list_roles(State(state): State<AppState>) -> ApiResult<Vec<EmployeeRole>> {
    let roles = state.services.employees.list_roles().await?;
    Ok(Json(ApiResponse::success(roles)))
}

#[utoipa::path(
    post,
    path = "/api/v1/employee-roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = crate::ApiResponse<EmployeeRole>),
        (status = 409, description = "Role name already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "Employees"
)]
pub async fn create_role(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let role = state.services.employees.create_role(payload, actor).await?;
    Ok(created_response(role))
}

#[utoipa::path(
    put,
    path = "/api/v1/employee-roles/{id}",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = crate::ApiResponse<EmployeeRole>),
        (status = 404, description = "Role not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Employees"
)]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let role = state.services.employees.update_role(id, payload).await?;
    Ok(success_response(role))
}

#[utoipa::path(
    delete,
    path = "/api/v1/employee-roles/{id}",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "Role not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Employees"
)]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.employees.delete_role(id).await?;
    Ok(no_content_response())
}
