use crate::{
    entities::{
        employee::{self, ActiveModel as EmployeeActiveModel, Entity as EmployeeEntity, Model as EmployeeModel},
        employee_role::{self, ActiveModel as RoleActiveModel, Entity as RoleEntity, Model as RoleModel},
    },
    errors::ServiceError,
    services::{db_error, fetch_page, normalize_optional, validate_not_blank, PageParams, ServiceContext},
    PaginatedResponse,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub(crate) const TABLE: &str = "employees";
pub(crate) const ROLES_TABLE: &str = "employee_roles";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEmployeeRequest {
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub first_name: String,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub role_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateEmployeeRequest {
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub first_name: Option<String>,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub role_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRoleRequest {
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

/// Deduplicated, sorted permission names as stored in the role's JSON column.
fn permissions_json(permissions: Vec<String>) -> serde_json::Value {
    let mut names: Vec<String> = permissions
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    names.sort();
    names.dedup();
    serde_json::Value::from(names)
}

#[derive(Clone)]
pub struct EmployeeService {
    ctx: ServiceContext,
}

impl EmployeeService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, params: PageParams) -> Result<PaginatedResponse<EmployeeModel>, ServiceError> {
        let key = format!("{TABLE}:list:{}", params.cache_fragment());
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                let mut select = EmployeeEntity::find()
                    .order_by_asc(employee::Column::LastName)
                    .order_by_asc(employee::Column::FirstName);
                if let Some(term) = &params.search {
                    select = select.filter(
                        Condition::any()
                            .add(employee::Column::FirstName.contains(term))
                            .add(employee::Column::LastName.contains(term))
                            .add(employee::Column::Email.contains(term)),
                    );
                }
                fetch_page(&db, select, &params).await.map_err(db_error("employee"))
            })
            .await
    }

    #[instrument(skip(self), fields(employee_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<EmployeeModel, ServiceError> {
        find_employee(self.ctx.db(), id).await
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        request: CreateEmployeeRequest,
        actor: Option<Uuid>,
    ) -> Result<EmployeeModel, ServiceError> {
        request.validate()?;
        if let Some(role_id) = request.role_id {
            find_role(self.ctx.db(), role_id).await?;
        }

        let model = EmployeeActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: Set(request.first_name.trim().to_string()),
            last_name: Set(request.last_name.trim().to_string()),
            email: Set(request.email.trim().to_ascii_lowercase()),
            phone: Set(normalize_optional(request.phone)),
            position: Set(normalize_optional(request.position)),
            role_id: Set(request.role_id),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await
        .map_err(db_error("employee"))?;

        info!(employee_id = %model.id, "Employee created");
        self.ctx.invalidate(&[TABLE]);
        Ok(model)
    }

    #[instrument(skip(self, request), fields(employee_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateEmployeeRequest) -> Result<EmployeeModel, ServiceError> {
        request.validate()?;

        let mut active: EmployeeActiveModel = find_employee(self.ctx.db(), id).await?.into();
        if let Some(first_name) = request.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = request.last_name {
            active.last_name = Set(last_name.trim().to_string());
        }
        if let Some(email) = request.email {
            active.email = Set(email.trim().to_ascii_lowercase());
        }
        if request.phone.is_some() {
            active.phone = Set(normalize_optional(request.phone));
        }
        if request.position.is_some() {
            active.position = Set(normalize_optional(request.position));
        }
        if let Some(role_id) = request.role_id {
            find_role(self.ctx.db(), role_id).await?;
            active.role_id = Set(Some(role_id));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        let model = active.update(self.ctx.db()).await.map_err(db_error("employee"))?;
        info!(employee_id = %id, "Employee updated");
        self.ctx.invalidate(&[TABLE]);
        Ok(model)
    }

    /// Tasks assigned to the employee become unassigned.
    #[instrument(skip(self), fields(employee_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        find_employee(self.ctx.db(), id)
            .await?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("employee"))?;
        info!(employee_id = %id, "Employee deleted");
        self.ctx.invalidate(&[TABLE, super::tasks::TABLE]);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_roles(&self) -> Result<Vec<RoleModel>, ServiceError> {
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&format!("{ROLES_TABLE}:all"), || async move {
                RoleEntity::find()
                    .order_by_asc(employee_role::Column::Name)
                    .all(&*db)
                    .await
                    .map_err(db_error("employee role"))
            })
            .await
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_role(&self, request: CreateRoleRequest, actor: Option<Uuid>) -> Result<RoleModel, ServiceError> {
        request.validate()?;

        let model = RoleActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            description: Set(normalize_optional(request.description)),
            permissions: Set(permissions_json(request.permissions)),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await
        .map_err(db_error("employee role"))?;

        info!(role_id = %model.id, "Employee role created");
        self.ctx.invalidate(&[ROLES_TABLE]);
        Ok(model)
    }

    #[instrument(skip(self, request), fields(role_id = %id))]
    pub async fn update_role(&self, id: Uuid, request: UpdateRoleRequest) -> Result<RoleModel, ServiceError> {
        request.validate()?;

        let mut active: RoleActiveModel = find_role(self.ctx.db(), id).await?.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if request.description.is_some() {
            active.description = Set(normalize_optional(request.description));
        }
        if let Some(permissions) = request.permissions {
            active.permissions = Set(permissions_json(permissions));
        }

        let model = active.update(self.ctx.db()).await.map_err(db_error("employee role"))?;
        info!(role_id = %id, "Employee role updated");
        self.ctx.invalidate(&[ROLES_TABLE]);
        Ok(model)
    }

    #[instrument(skip(self), fields(role_id = %id))]
    pub async fn delete_role(&self, id: Uuid) -> Result<(), ServiceError> {
        find_role(self.ctx.db(), id)
            .await?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("employee role"))?;
        info!(role_id = %id, "Employee role deleted");
        self.ctx.invalidate(&[ROLES_TABLE, TABLE]);
        Ok(())
    }
}

pub(crate) async fn find_employee(db: &impl ConnectionTrait, id: Uuid) -> Result<EmployeeModel, ServiceError> {
    EmployeeEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("employee"))?
        .ok_or_else(|| ServiceError::not_found("Employee", id))
}

async fn find_role(db: &impl ConnectionTrait, id: Uuid) -> Result<RoleModel, ServiceError> {
    RoleEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("employee role"))?
        .ok_or_else(|| ServiceError::not_found("Employee role", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn permissions_are_trimmed_sorted_and_unique() {
        let stored = permissions_json(vec![
            "quotations.write".into(),
            " companies.read ".into(),
            "".into(),
            "quotations.write".into(),
        ]);
        assert_eq!(stored, json!(["companies.read", "quotations.write"]));
    }

    #[test]
    fn employee_email_is_required_and_valid() {
        let request = CreateEmployeeRequest {
            first_name: "Ann".into(),
            last_name: "Nowak".into(),
            email: "ann@".into(),
            phone: None,
            position: None,
            role_id: None,
            is_active: None,
        };
        assert!(request.validate().is_err());
    }
}
