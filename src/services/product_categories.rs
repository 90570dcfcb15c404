use crate::{
    entities::product_category::{
        self, ActiveModel as CategoryActiveModel, Entity as CategoryEntity, Model as CategoryModel,
    },
    errors::ServiceError,
    services::{db_error, fetch_page, normalize_optional, validate_not_blank, PageParams, ServiceContext},
    PaginatedResponse,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub(crate) const TABLE: &str = "product_categories";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct ProductCategoryService {
    ctx: ServiceContext,
}

impl ProductCategoryService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, params: PageParams) -> Result<PaginatedResponse<CategoryModel>, ServiceError> {
        let key = format!("{TABLE}:list:{}", params.cache_fragment());
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                let mut select = CategoryEntity::find().order_by_asc(product_category::Column::Name);
                if let Some(term) = &params.search {
                    select = select.filter(product_category::Column::Name.contains(term));
                }
                fetch_page(&db, select, &params)
                    .await
                    .map_err(db_error("product category"))
            })
            .await
    }

    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<CategoryModel, ServiceError> {
        find_category(self.ctx.db(), id).await
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: CreateCategoryRequest,
        actor: Option<Uuid>,
    ) -> Result<CategoryModel, ServiceError> {
        request.validate()?;
        if let Some(parent_id) = request.parent_id {
            find_category(self.ctx.db(), parent_id).await?;
        }

        let model = CategoryActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            description: Set(normalize_optional(request.description)),
            parent_id: Set(request.parent_id),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await
        .map_err(db_error("product category"))?;

        info!(category_id = %model.id, "Product category created");
        self.ctx.invalidate(&[TABLE]);
        Ok(model)
    }

    #[instrument(skip(self, request), fields(category_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateCategoryRequest) -> Result<CategoryModel, ServiceError> {
        request.validate()?;

        let mut active: CategoryActiveModel = find_category(self.ctx.db(), id).await?.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if request.description.is_some() {
            active.description = Set(normalize_optional(request.description));
        }
        if let Some(parent_id) = request.parent_id {
            if parent_id == id {
                return Err(ServiceError::ValidationError(
                    "parent_id: a category cannot be its own parent".to_string(),
                ));
            }
            find_category(self.ctx.db(), parent_id).await?;
            active.parent_id = Set(Some(parent_id));
        }

        let model = active
            .update(self.ctx.db())
            .await
            .map_err(db_error("product category"))?;
        info!(category_id = %id, "Product category updated");
        self.ctx.invalidate(&[TABLE]);
        Ok(model)
    }

    /// Products of the category keep existing with no category.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        find_category(self.ctx.db(), id)
            .await?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("product category"))?;
        info!(category_id = %id, "Product category deleted");
        self.ctx.invalidate(&[TABLE, super::products::TABLE]);
        Ok(())
    }
}

pub(crate) async fn find_category(
    db: &impl sea_orm::ConnectionTrait,
    id: Uuid,
) -> Result<CategoryModel, ServiceError> {
    CategoryEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("product category"))?
        .ok_or_else(|| ServiceError::not_found("Product category", id))
}
