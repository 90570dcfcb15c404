use crate::{
    entities::product::{self, ActiveModel as ProductActiveModel, Entity as ProductEntity, Model as ProductModel},
    errors::ServiceError,
    events::Event,
    services::{
        db_error, fetch_page, normalize_currency, normalize_optional, product_categories::find_category,
        validate_currency_code, validate_non_negative, validate_not_blank, PageParams, ServiceContext,
    },
    PaginatedResponse,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub(crate) const TABLE: &str = "products";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: String,
    #[validate(length(max = 100))]
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit: Option<String>,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[validate(custom = "validate_currency_code")]
    pub currency: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit: Option<String>,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    #[validate(custom = "validate_currency_code")]
    pub currency: Option<String>,
    pub is_active: Option<bool>,
}

/// Filters accepted by the product list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub active: Option<bool>,
}

#[derive(Clone)]
pub struct ProductService {
    ctx: ServiceContext,
}

impl ProductService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: PageParams,
        filter: ProductFilter,
    ) -> Result<PaginatedResponse<ProductModel>, ServiceError> {
        let key = format!(
            "{TABLE}:list:{}:cat={}:a={}",
            params.cache_fragment(),
            filter.category_id.map(|id| id.to_string()).unwrap_or_default(),
            filter.active.map(|a| a.to_string()).unwrap_or_default()
        );
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                let mut select = ProductEntity::find().order_by_asc(product::Column::Name);
                if let Some(category_id) = filter.category_id {
                    select = select.filter(product::Column::CategoryId.eq(category_id));
                }
                if let Some(active) = filter.active {
                    select = select.filter(product::Column::IsActive.eq(active));
                }
                if let Some(term) = &params.search {
                    select = select.filter(
                        Condition::any()
                            .add(product::Column::Name.contains(term))
                            .add(product::Column::Sku.contains(term)),
                    );
                }
                fetch_page(&db, select, &params).await.map_err(db_error("product"))
            })
            .await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<ProductModel, ServiceError> {
        let key = format!("{TABLE}:{id}");
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move { find_product(&*db, id).await })
            .await
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: CreateProductRequest,
        actor: Option<Uuid>,
    ) -> Result<ProductModel, ServiceError> {
        request.validate()?;
        if let Some(category_id) = request.category_id {
            find_category(self.ctx.db(), category_id).await?;
        }

        let model = ProductActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            sku: Set(normalize_optional(request.sku)),
            description: Set(normalize_optional(request.description)),
            category_id: Set(request.category_id),
            unit: Set(normalize_optional(request.unit)),
            unit_price: Set(request.unit_price),
            currency: Set(normalize_currency(&request.currency)),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await
        .map_err(db_error("product"))?;

        info!(product_id = %model.id, "Product created");
        self.ctx.invalidate(&[TABLE]);
        self.ctx.emit(Event::ProductCreated(model.id)).await;
        Ok(model)
    }

    #[instrument(skip(self, request), fields(product_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateProductRequest) -> Result<ProductModel, ServiceError> {
        request.validate()?;

        let mut active: ProductActiveModel = find_product(self.ctx.db(), id).await?.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if request.sku.is_some() {
            active.sku = Set(normalize_optional(request.sku));
        }
        if request.description.is_some() {
            active.description = Set(normalize_optional(request.description));
        }
        if let Some(category_id) = request.category_id {
            find_category(self.ctx.db(), category_id).await?;
            active.category_id = Set(Some(category_id));
        }
        if request.unit.is_some() {
            active.unit = Set(normalize_optional(request.unit));
        }
        if let Some(unit_price) = request.unit_price {
            active.unit_price = Set(unit_price);
        }
        if let Some(currency) = request.currency {
            active.currency = Set(normalize_currency(&currency));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        let model = active.update(self.ctx.db()).await.map_err(db_error("product"))?;
        info!(product_id = %id, "Product updated");
        self.ctx.invalidate(&[TABLE]);
        self.ctx.emit(Event::ProductUpdated(id)).await;
        Ok(model)
    }

    /// Line items that referenced the product keep their copied description and price.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        find_product(self.ctx.db(), id)
            .await?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("product"))?;
        info!(product_id = %id, "Product deleted");
        self.ctx.invalidate(&[TABLE, "quotation_items", "order_items"]);
        Ok(())
    }
}

pub(crate) async fn find_product(
    db: &impl sea_orm::ConnectionTrait,
    id: Uuid,
) -> Result<ProductModel, ServiceError> {
    ProductEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("product"))?
        .ok_or_else(|| ServiceError::not_found("Product", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> CreateProductRequest {
        CreateProductRequest {
            name: "Booth panel".into(),
            sku: Some("BP-01".into()),
            description: None,
            category_id: None,
            unit: Some("pcs".into()),
            unit_price: dec!(120.00),
            currency: "eur".into(),
            is_active: None,
        }
    }

    #[test]
    fn valid_product_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut req = request();
        req.unit_price = dec!(-1);
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("unit_price"));
    }

    #[test]
    fn currency_must_be_three_letters() {
        let mut req = request();
        req.currency = "euro".into();
        assert!(req.validate().is_err());
    }
}
