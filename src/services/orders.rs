use crate::{
    entities::{
        company::Model as CompanyModel,
        order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel, OrderStatus},
        order_item::{self, ActiveModel as OrderItemActiveModel, Entity as OrderItemEntity, Model as OrderItemModel},
    },
    errors::ServiceError,
    events::Event,
    services::{
        companies::find_company,
        db_error, document_number, fetch_page, normalize_currency, normalize_optional,
        pricing::{calculate_total, LineItem},
        products::find_product,
        quotations::find_quotation,
        validate_currency_code, validate_non_negative, validate_not_blank, validate_percentage,
        validate_positive, PageParams, ServiceContext,
    },
    PaginatedResponse,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub(crate) const TABLE: &str = "orders";
pub(crate) const ITEMS_TABLE: &str = "order_items";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: Option<Uuid>,
    #[validate(custom = "validate_not_blank", length(max = 500))]
    pub description: Option<String>,
    #[validate(custom = "validate_positive")]
    #[schema(value_type = String)]
    pub quantity: Decimal,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    #[validate(custom = "validate_percentage")]
    #[schema(value_type = Option<String>)]
    pub discount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    /// Generated when omitted
    #[validate(length(min = 1, max = 50))]
    pub order_number: Option<String>,
    pub company_id: Uuid,
    pub quotation_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    #[validate(custom = "validate_currency_code")]
    pub currency: String,
    /// Defaults to today
    pub order_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate]
    #[serde(default)]
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    #[validate(custom = "validate_currency_code")]
    pub currency: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct OrderFilter {
    pub company_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderModel,
    pub items: Vec<OrderItemModel>,
    pub company: CompanyModel,
}

#[derive(Clone)]
pub struct OrderService {
    ctx: ServiceContext,
}

impl OrderService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: PageParams,
        filter: OrderFilter,
    ) -> Result<PaginatedResponse<OrderModel>, ServiceError> {
        let key = format!(
            "{TABLE}:list:{}:c={}:st={}",
            params.cache_fragment(),
            filter.company_id.map(|id| id.to_string()).unwrap_or_default(),
            filter.status.map(|s| s.to_string()).unwrap_or_default()
        );
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                let mut select = OrderEntity::find()
                    .order_by_desc(order::Column::OrderDate)
                    .order_by_desc(order::Column::CreatedAt);
                if let Some(company_id) = filter.company_id {
                    select = select.filter(order::Column::CompanyId.eq(company_id));
                }
                if let Some(status) = filter.status {
                    select = select.filter(order::Column::Status.eq(status));
                }
                if let Some(term) = &params.search {
                    select = select.filter(order::Column::OrderNumber.contains(term));
                }
                fetch_page(&db, select, &params).await.map_err(db_error("order"))
            })
            .await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_detail(&self, id: Uuid) -> Result<OrderDetail, ServiceError> {
        let key = format!("{TABLE}:{id}:detail");
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move { load_detail(&*db, id).await })
            .await
    }

    #[instrument(skip(self, request), fields(company_id = %request.company_id, items = request.items.len()))]
    pub async fn create(&self, request: CreateOrderRequest, actor: Option<Uuid>) -> Result<OrderDetail, ServiceError> {
        request.validate()?;

        let txn = self.ctx.db().begin().await.map_err(db_error("order"))?;
        find_company(&txn, request.company_id).await?;
        if let Some(quotation_id) = request.quotation_id {
            find_quotation(&txn, quotation_id).await?;
        }

        let order_id = Uuid::new_v4();
        let order = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(request
                .order_number
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| document_number("ORD"))),
            company_id: Set(request.company_id),
            quotation_id: Set(request.quotation_id),
            status: Set(request.status.unwrap_or(OrderStatus::New)),
            currency: Set(normalize_currency(&request.currency)),
            order_date: Set(request.order_date.unwrap_or_else(|| Utc::now().date_naive())),
            notes: Set(normalize_optional(request.notes)),
            total_amount: Set(Decimal::ZERO),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_error("order"))?;

        for item in request.items {
            insert_item(&txn, order_id, item, actor).await?;
        }
        let order = recalculate_total(&txn, order).await?;
        txn.commit().await.map_err(db_error("order"))?;

        info!(order_id = %order_id, order_number = %order.order_number, total_amount = %order.total_amount, "Order created");
        self.ctx.invalidate(&[TABLE, ITEMS_TABLE]);
        self.ctx.emit(Event::OrderCreated(order_id)).await;
        load_detail(self.ctx.db(), order_id).await
    }

    #[instrument(skip(self, request), fields(order_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateOrderRequest) -> Result<OrderDetail, ServiceError> {
        request.validate()?;

        let mut active: OrderActiveModel = find_order(self.ctx.db(), id).await?.into();
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(currency) = request.currency {
            active.currency = Set(normalize_currency(&currency));
        }
        if let Some(order_date) = request.order_date {
            active.order_date = Set(order_date);
        }
        if request.notes.is_some() {
            active.notes = Set(normalize_optional(request.notes));
        }
        active.update(self.ctx.db()).await.map_err(db_error("order"))?;

        info!(order_id = %id, "Order updated");
        self.ctx.invalidate(&[TABLE]);
        self.ctx.emit(Event::OrderUpdated(id)).await;
        load_detail(self.ctx.db(), id).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        find_order(self.ctx.db(), id)
            .await?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("order"))?;
        info!(order_id = %id, "Order deleted");
        self.ctx.invalidate(&[TABLE, ITEMS_TABLE]);
        self.ctx.emit(Event::OrderDeleted(id)).await;
        Ok(())
    }

    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn add_item(
        &self,
        order_id: Uuid,
        request: CreateOrderItemRequest,
        actor: Option<Uuid>,
    ) -> Result<OrderDetail, ServiceError> {
        request.validate()?;

        let txn = self.ctx.db().begin().await.map_err(db_error("order item"))?;
        let order = find_order(&txn, order_id).await?;
        let item = insert_item(&txn, order_id, request, actor).await?;
        let order = recalculate_total(&txn, order).await?;
        txn.commit().await.map_err(db_error("order item"))?;

        info!(item_id = %item.id, total_amount = %order.total_amount, "Order item added");
        self.after_item_change(&order).await;
        load_detail(self.ctx.db(), order_id).await
    }

    #[instrument(skip(self), fields(order_id = %order_id, item_id = %item_id))]
    pub async fn delete_item(&self, order_id: Uuid, item_id: Uuid) -> Result<OrderDetail, ServiceError> {
        let txn = self.ctx.db().begin().await.map_err(db_error("order item"))?;
        let order = find_order(&txn, order_id).await?;
        OrderItemEntity::find_by_id(item_id)
            .filter(order_item::Column::OrderId.eq(order_id))
            .one(&txn)
            .await
            .map_err(db_error("order item"))?
            .ok_or_else(|| ServiceError::not_found("Order item", item_id))?
            .delete(&txn)
            .await
            .map_err(db_error("order item"))?;
        let order = recalculate_total(&txn, order).await?;
        txn.commit().await.map_err(db_error("order item"))?;

        info!(total_amount = %order.total_amount, "Order item deleted");
        self.after_item_change(&order).await;
        load_detail(self.ctx.db(), order_id).await
    }

    async fn after_item_change(&self, order: &OrderModel) {
        self.ctx.invalidate(&[TABLE, ITEMS_TABLE]);
        self.ctx
            .emit(Event::OrderTotalRecalculated {
                order_id: order.id,
                total_amount: order.total_amount,
            })
            .await;
    }
}

async fn find_order(db: &impl ConnectionTrait, id: Uuid) -> Result<OrderModel, ServiceError> {
    OrderEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("order"))?
        .ok_or_else(|| ServiceError::not_found("Order", id))
}

pub(crate) async fn find_by_quotation(
    db: &impl ConnectionTrait,
    quotation_id: Uuid,
) -> Result<Option<OrderModel>, ServiceError> {
    OrderEntity::find()
        .filter(order::Column::QuotationId.eq(quotation_id))
        .one(db)
        .await
        .map_err(db_error("order"))
}

async fn load_items(db: &impl ConnectionTrait, order_id: Uuid) -> Result<Vec<OrderItemModel>, ServiceError> {
    OrderItemEntity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::CreatedAt)
        .all(db)
        .await
        .map_err(db_error("order item"))
}

pub(crate) async fn load_detail(db: &impl ConnectionTrait, id: Uuid) -> Result<OrderDetail, ServiceError> {
    let order = find_order(db, id).await?;
    let items = load_items(db, id).await?;
    let company = find_company(db, order.company_id).await?;
    Ok(OrderDetail { order, items, company })
}

async fn insert_item(
    db: &impl ConnectionTrait,
    order_id: Uuid,
    request: CreateOrderItemRequest,
    actor: Option<Uuid>,
) -> Result<OrderItemModel, ServiceError> {
    let product = match request.product_id {
        Some(product_id) => Some(find_product(db, product_id).await?),
        None => None,
    };
    let description = normalize_optional(request.description)
        .or_else(|| product.as_ref().map(|p| p.name.clone()))
        .ok_or_else(|| {
            ServiceError::ValidationError("description: required when no product is given".to_string())
        })?;
    let unit_price = request
        .unit_price
        .or_else(|| product.as_ref().map(|p| p.unit_price))
        .ok_or_else(|| {
            ServiceError::ValidationError("unit_price: required when no product is given".to_string())
        })?;

    OrderItemActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        product_id: Set(request.product_id),
        description: Set(description),
        quantity: Set(request.quantity),
        unit_price: Set(unit_price),
        discount: Set(request.discount.unwrap_or(Decimal::ZERO)),
        created_by: Set(actor),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(db_error("order item"))
}

async fn recalculate_total(db: &impl ConnectionTrait, order: OrderModel) -> Result<OrderModel, ServiceError> {
    let items = load_items(db, order.id).await?;
    let lines: Vec<LineItem> = items.iter().map(LineItem::from).collect();
    let mut active: OrderActiveModel = order.into();
    active.total_amount = Set(calculate_total(&lines));
    active.update(db).await.map_err(db_error("order"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_item_requires_positive_quantity() {
        let request = CreateOrderItemRequest {
            product_id: None,
            description: Some("Banner".into()),
            quantity: dec!(-2),
            unit_price: Some(dec!(10)),
            discount: None,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
    }

    #[test]
    fn blank_item_description_is_rejected() {
        let request = CreateOrderItemRequest {
            product_id: None,
            description: Some("  ".into()),
            quantity: dec!(1),
            unit_price: Some(dec!(10)),
            discount: Some(dec!(5)),
        };
        assert!(request.validate().is_err());
    }
}
