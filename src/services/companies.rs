use crate::{
    entities::{
        company::{self, ActiveModel as CompanyActiveModel, Entity as CompanyEntity, Model as CompanyModel},
        contact::{self, Entity as ContactEntity, Model as ContactModel},
        note::{self, Entity as NoteEntity, Model as NoteModel},
        order::Entity as OrderEntity,
        quotation::Entity as QuotationEntity,
    },
    errors::ServiceError,
    events::Event,
    services::{db_error, fetch_page, normalize_optional, validate_not_blank, PageParams, ServiceContext},
    PaginatedResponse,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub(crate) const TABLE: &str = "companies";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCompanyRequest {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: String,
    pub tax_id: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub industry: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCompanyRequest {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: Option<String>,
    pub tax_id: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub industry: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct CompanyService {
    ctx: ServiceContext,
}

impl CompanyService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, params: PageParams) -> Result<PaginatedResponse<CompanyModel>, ServiceError> {
        let key = format!("{TABLE}:list:{}", params.cache_fragment());
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                let mut select = CompanyEntity::find().order_by_asc(company::Column::Name);
                if let Some(term) = &params.search {
                    select = select.filter(
                        Condition::any()
                            .add(company::Column::Name.contains(term))
                            .add(company::Column::City.contains(term))
                            .add(company::Column::TaxId.contains(term))
                            .add(company::Column::Email.contains(term)),
                    );
                }
                fetch_page(&db, select, &params)
                    .await
                    .map_err(db_error("company"))
            })
            .await
    }

    #[instrument(skip(self), fields(company_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<CompanyModel, ServiceError> {
        let key = format!("{TABLE}:{id}");
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move { find_company(&*db, id).await })
            .await
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: CreateCompanyRequest,
        actor: Option<Uuid>,
    ) -> Result<CompanyModel, ServiceError> {
        request.validate()?;

        let model = CompanyActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            tax_id: Set(normalize_optional(request.tax_id)),
            email: Set(normalize_optional(request.email)),
            phone: Set(normalize_optional(request.phone)),
            website: Set(normalize_optional(request.website)),
            address: Set(normalize_optional(request.address)),
            city: Set(normalize_optional(request.city)),
            country: Set(normalize_optional(request.country)),
            industry: Set(normalize_optional(request.industry)),
            status: Set(normalize_optional(request.status)),
            notes: Set(normalize_optional(request.notes)),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await
        .map_err(db_error("company"))?;

        info!(company_id = %model.id, "Company created");
        self.ctx.invalidate(&[TABLE]);
        self.ctx.emit(Event::CompanyCreated(model.id)).await;
        Ok(model)
    }

    #[instrument(skip(self, request), fields(company_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateCompanyRequest) -> Result<CompanyModel, ServiceError> {
        request.validate()?;

        let mut active: CompanyActiveModel = find_company(self.ctx.db(), id).await?.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        macro_rules! set_optional {
            ($($field:ident),*) => {
                $(if request.$field.is_some() {
                    active.$field = Set(normalize_optional(request.$field));
                })*
            };
        }
        set_optional!(tax_id, email, phone, website, address, city, country, industry, status, notes);

        let model = active.update(self.ctx.db()).await.map_err(db_error("company"))?;

        info!(company_id = %id, "Company updated");
        // quotation details embed the company
        self.ctx.invalidate(&[TABLE, super::quotations::TABLE]);
        self.ctx.emit(Event::CompanyUpdated(id)).await;
        Ok(model)
    }

    /// Deletes the company with its contacts and notes; fails with a conflict while quotations
    /// or orders still reference it.
    #[instrument(skip(self), fields(company_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let company = find_company(self.ctx.db(), id).await?;

        let quotations = company
            .find_related(QuotationEntity)
            .count(self.ctx.db())
            .await
            .map_err(db_error("quotation"))?;
        let orders = company
            .find_related(OrderEntity)
            .count(self.ctx.db())
            .await
            .map_err(db_error("order"))?;
        if quotations + orders > 0 {
            warn!(company_id = %id, quotations, orders, "Refusing to delete company with sales documents");
            return Err(ServiceError::Conflict(format!(
                "Company has {quotations} quotation(s) and {orders} order(s); delete them first"
            )));
        }

        company
            .delete(self.ctx.db())
            .await
            .map_err(db_error("company"))?;

        info!(company_id = %id, "Company deleted");
        self.ctx
            .invalidate(&[TABLE, super::contacts::TABLE, super::notes::TABLE, "tasks", "documents"]);
        self.ctx.emit(Event::CompanyDeleted(id)).await;
        Ok(())
    }

    #[instrument(skip(self), fields(company_id = %id))]
    pub async fn contacts(&self, id: Uuid) -> Result<Vec<ContactModel>, ServiceError> {
        let key = format!("{}:company:{id}", super::contacts::TABLE);
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                find_company(&*db, id).await?;
                ContactEntity::find()
                    .filter(contact::Column::CompanyId.eq(id))
                    .order_by_asc(contact::Column::FirstName)
                    .all(&*db)
                    .await
                    .map_err(db_error("contact"))
            })
            .await
    }

    #[instrument(skip(self), fields(company_id = %id))]
    pub async fn notes(&self, id: Uuid) -> Result<Vec<NoteModel>, ServiceError> {
        let key = format!("{}:company:{id}", super::notes::TABLE);
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                find_company(&*db, id).await?;
                NoteEntity::find()
                    .filter(note::Column::CompanyId.eq(id))
                    .order_by_desc(note::Column::CreatedAt)
                    .all(&*db)
                    .await
                    .map_err(db_error("note"))
            })
            .await
    }
}

pub(crate) async fn find_company(
    db: &impl sea_orm::ConnectionTrait,
    id: Uuid,
) -> Result<CompanyModel, ServiceError> {
    CompanyEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("company"))?
        .ok_or_else(|| ServiceError::not_found("Company", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_company_name_fails_validation() {
        let request = CreateCompanyRequest {
            name: "   ".into(),
            tax_id: None,
            email: None,
            phone: None,
            website: None,
            address: None,
            city: None,
            country: None,
            industry: None,
            status: None,
            notes: None,
        };
        let err = ServiceError::from(request.validate().unwrap_err());
        assert!(matches!(err, ServiceError::ValidationError(ref m) if m.contains("name")));
    }

    #[test]
    fn malformed_email_fails_validation() {
        let request = UpdateCompanyRequest {
            email: Some("not-an-email".into()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateCompanyRequest::default().validate().is_ok());
    }
}
