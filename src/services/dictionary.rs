use crate::{
    entities::dictionary_entry::{self, ActiveModel as EntryActiveModel, Entity as EntryEntity, Model as EntryModel},
    errors::ServiceError,
    services::{db_error, validate_not_blank, ServiceContext},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub(crate) const TABLE: &str = "dictionary";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEntryRequest {
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub category: String,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub key: String,
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub value: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateEntryRequest {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub value: Option<String>,
    pub sort_order: Option<i32>,
}

/// Lookup values (industries, cost categories, units) grouped by category.
#[derive(Clone)]
pub struct DictionaryService {
    ctx: ServiceContext,
}

impl DictionaryService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, category: Option<String>) -> Result<Vec<EntryModel>, ServiceError> {
        let category = category.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        let key = format!("{TABLE}:list:{}", category.as_deref().unwrap_or("*"));
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                let mut select = EntryEntity::find()
                    .order_by_asc(dictionary_entry::Column::Category)
                    .order_by_asc(dictionary_entry::Column::SortOrder)
                    .order_by_asc(dictionary_entry::Column::Key);
                if let Some(category) = category {
                    select = select.filter(dictionary_entry::Column::Category.eq(category));
                }
                select.all(&*db).await.map_err(db_error("dictionary entry"))
            })
            .await
    }

    #[instrument(skip(self, request), fields(category = %request.category, key = %request.key))]
    pub async fn create(&self, request: CreateEntryRequest, actor: Option<Uuid>) -> Result<EntryModel, ServiceError> {
        request.validate()?;

        let model = EntryActiveModel {
            id: Set(Uuid::new_v4()),
            category: Set(request.category.trim().to_string()),
            key: Set(request.key.trim().to_string()),
            value: Set(request.value.trim().to_string()),
            sort_order: Set(request.sort_order.unwrap_or(0)),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await
        .map_err(db_error("dictionary entry"))?;

        info!(entry_id = %model.id, "Dictionary entry created");
        self.ctx.invalidate(&[TABLE]);
        Ok(model)
    }

    #[instrument(skip(self, request), fields(entry_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateEntryRequest) -> Result<EntryModel, ServiceError> {
        request.validate()?;

        let mut active: EntryActiveModel = self.find(id).await?.into();
        if let Some(value) = request.value {
            active.value = Set(value.trim().to_string());
        }
        if let Some(sort_order) = request.sort_order {
            active.sort_order = Set(sort_order);
        }
        let model = active
            .update(self.ctx.db())
            .await
            .map_err(db_error("dictionary entry"))?;

        info!(entry_id = %id, "Dictionary entry updated");
        self.ctx.invalidate(&[TABLE]);
        Ok(model)
    }

    #[instrument(skip(self), fields(entry_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.find(id)
            .await?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("dictionary entry"))?;
        info!(entry_id = %id, "Dictionary entry deleted");
        self.ctx.invalidate(&[TABLE]);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<EntryModel, ServiceError> {
        EntryEntity::find_by_id(id)
            .one(self.ctx.db())
            .await
            .map_err(db_error("dictionary entry"))?
            .ok_or_else(|| ServiceError::not_found("Dictionary entry", id))
    }
}
