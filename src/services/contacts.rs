use crate::{
    entities::contact::{self, ActiveModel as ContactActiveModel, Entity as ContactEntity, Model as ContactModel},
    errors::ServiceError,
    events::Event,
    services::{
        companies::find_company, db_error, fetch_page, normalize_optional, validate_not_blank,
        PageParams, ServiceContext,
    },
    PaginatedResponse,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub(crate) const TABLE: &str = "contacts";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateContactRequest {
    pub company_id: Uuid,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub first_name: String,
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateContactRequest {
    pub company_id: Option<Uuid>,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
}

#[derive(Clone)]
pub struct ContactService {
    ctx: ServiceContext,
}

impl ContactService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: PageParams,
        company_id: Option<Uuid>,
    ) -> Result<PaginatedResponse<ContactModel>, ServiceError> {
        let key = format!(
            "{TABLE}:list:{}:c={}",
            params.cache_fragment(),
            company_id.map(|id| id.to_string()).unwrap_or_default()
        );
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                let mut select = ContactEntity::find()
                    .order_by_asc(contact::Column::LastName)
                    .order_by_asc(contact::Column::FirstName);
                if let Some(company_id) = company_id {
                    select = select.filter(contact::Column::CompanyId.eq(company_id));
                }
                if let Some(term) = &params.search {
                    select = select.filter(
                        Condition::any()
                            .add(contact::Column::FirstName.contains(term))
                            .add(contact::Column::LastName.contains(term))
                            .add(contact::Column::Email.contains(term)),
                    );
                }
                fetch_page(&db, select, &params).await.map_err(db_error("contact"))
            })
            .await
    }

    #[instrument(skip(self), fields(contact_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<ContactModel, ServiceError> {
        let key = format!("{TABLE}:{id}");
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move { find_contact(&*db, id).await })
            .await
    }

    #[instrument(skip(self, request), fields(company_id = %request.company_id))]
    pub async fn create(
        &self,
        request: CreateContactRequest,
        actor: Option<Uuid>,
    ) -> Result<ContactModel, ServiceError> {
        request.validate()?;
        find_company(self.ctx.db(), request.company_id).await?;

        let model = ContactActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(request.company_id),
            first_name: Set(request.first_name.trim().to_string()),
            last_name: Set(normalize_optional(request.last_name)),
            email: Set(normalize_optional(request.email)),
            phone: Set(normalize_optional(request.phone)),
            position: Set(normalize_optional(request.position)),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await
        .map_err(db_error("contact"))?;

        info!(contact_id = %model.id, company_id = %model.company_id, "Contact created");
        self.ctx.invalidate(&[TABLE]);
        self.ctx
            .emit(Event::ContactCreated {
                contact_id: model.id,
                company_id: model.company_id,
            })
            .await;
        Ok(model)
    }

    #[instrument(skip(self, request), fields(contact_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateContactRequest) -> Result<ContactModel, ServiceError> {
        request.validate()?;

        let mut active: ContactActiveModel = find_contact(self.ctx.db(), id).await?.into();
        if let Some(company_id) = request.company_id {
            find_company(self.ctx.db(), company_id).await?;
            active.company_id = Set(company_id);
        }
        if let Some(first_name) = request.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if request.last_name.is_some() {
            active.last_name = Set(normalize_optional(request.last_name));
        }
        if request.email.is_some() {
            active.email = Set(normalize_optional(request.email));
        }
        if request.phone.is_some() {
            active.phone = Set(normalize_optional(request.phone));
        }
        if request.position.is_some() {
            active.position = Set(normalize_optional(request.position));
        }

        let model = active.update(self.ctx.db()).await.map_err(db_error("contact"))?;
        info!(contact_id = %id, "Contact updated");
        self.ctx.invalidate(&[TABLE, super::quotations::TABLE]);
        Ok(model)
    }

    #[instrument(skip(self), fields(contact_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        find_contact(self.ctx.db(), id)
            .await?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("contact"))?;

        info!(contact_id = %id, "Contact deleted");
        // quotations reference contacts with ON DELETE SET NULL
        self.ctx.invalidate(&[TABLE, super::quotations::TABLE]);
        Ok(())
    }
}

async fn find_contact(db: &impl sea_orm::ConnectionTrait, id: Uuid) -> Result<ContactModel, ServiceError> {
    ContactEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("contact"))?
        .ok_or_else(|| ServiceError::not_found("Contact", id))
}
