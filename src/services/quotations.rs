//! Quotations and their line items.
//!
//! Every item mutation recomputes the quotation's `total_amount` inside the same transaction, so
//! the stored total always equals the sum of the committed items' line totals.

use crate::{
    config::CompanyProfile,
    entities::{
        company::Model as CompanyModel,
        contact::{Entity as ContactEntity, Model as ContactModel},
        order::{ActiveModel as OrderActiveModel, OrderStatus},
        order_item::ActiveModel as OrderItemActiveModel,
        quotation::{
            self, ActiveModel as QuotationActiveModel, Entity as QuotationEntity, Model as QuotationModel,
            QuotationStatus,
        },
        quotation_item::{
            self, ActiveModel as QuotationItemActiveModel, Entity as QuotationItemEntity,
            Model as QuotationItemModel,
        },
    },
    errors::ServiceError,
    events::Event,
    reports::quotation_pdf::{self, DocumentLine, Party, QuotationDocument},
    services::{
        companies::find_company,
        db_error, document_number, fetch_page, normalize_currency, normalize_optional,
        orders::{self, OrderDetail},
        pricing::{calculate_total, line_total, LineItem},
        products::find_product,
        settings::company_profile,
        validate_currency_code, validate_non_negative, validate_not_blank, validate_percentage,
        validate_positive, PageParams, ServiceContext,
    },
    PaginatedResponse,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub(crate) const TABLE: &str = "quotations";
pub(crate) const ITEMS_TABLE: &str = "quotation_items";

fn validate_parameters(value: &serde_json::Value) -> Result<(), ValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        let mut err = ValidationError::new("parameters");
        err.message = Some("must be a JSON object".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuotationItemRequest {
    pub product_id: Option<Uuid>,
    /// Defaults to the product name
    #[validate(custom = "validate_not_blank", length(max = 500))]
    pub description: Option<String>,
    #[validate(custom = "validate_positive")]
    #[schema(value_type = String)]
    pub quantity: Decimal,
    /// Defaults to the product's catalog price
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    #[validate(custom = "validate_percentage")]
    #[schema(value_type = Option<String>)]
    pub discount: Option<Decimal>,
    #[validate(custom = "validate_parameters")]
    #[schema(value_type = Option<Object>)]
    pub parameters: Option<serde_json::Value>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateQuotationItemRequest {
    #[validate(custom = "validate_not_blank", length(max = 500))]
    pub description: Option<String>,
    #[validate(custom = "validate_positive")]
    #[schema(value_type = Option<String>)]
    pub quantity: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    #[validate(custom = "validate_percentage")]
    #[schema(value_type = Option<String>)]
    pub discount: Option<Decimal>,
    #[validate(custom = "validate_parameters")]
    #[schema(value_type = Option<Object>)]
    pub parameters: Option<serde_json::Value>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuotationRequest {
    /// Generated when omitted
    #[validate(length(min = 1, max = 50))]
    pub quotation_number: Option<String>,
    pub company_id: Uuid,
    pub contact_id: Option<Uuid>,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub status: Option<QuotationStatus>,
    #[validate(custom = "validate_currency_code")]
    pub currency: String,
    pub valid_until: Option<chrono::NaiveDate>,
    pub notes: Option<String>,
    #[validate]
    #[serde(default)]
    pub items: Vec<CreateQuotationItemRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateQuotationRequest {
    pub contact_id: Option<Uuid>,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub status: Option<QuotationStatus>,
    #[validate(custom = "validate_currency_code")]
    pub currency: Option<String>,
    pub valid_until: Option<chrono::NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct QuotationFilter {
    pub company_id: Option<Uuid>,
    pub status: Option<QuotationStatus>,
}

/// A quotation with its items (by position), company and contact.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuotationDetail {
    #[serde(flatten)]
    pub quotation: QuotationModel,
    pub items: Vec<QuotationItemModel>,
    pub company: CompanyModel,
    pub contact: Option<ContactModel>,
}

#[derive(Clone)]
pub struct QuotationService {
    ctx: ServiceContext,
    seller: CompanyProfile,
}

impl QuotationService {
    pub fn new(ctx: ServiceContext, seller: CompanyProfile) -> Self {
        Self { ctx, seller }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: PageParams,
        filter: QuotationFilter,
    ) -> Result<PaginatedResponse<QuotationModel>, ServiceError> {
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
                let mut select = QuotationEntity::find().order_by_desc(quotation::Column::CreatedAt);
                if let Some(company_id) = filter.company_id {
                    select = select.filter(quotation::Column::CompanyId.eq(company_id));
                }
                if let Some(status) = filter.status {
                    select = select.filter(quotation::Column::Status.eq(status));
                }
                if let Some(term) = &params.search {
                    select = select.filter(
                        Condition::any()
                            .add(quotation::Column::QuotationNumber.contains(term))
                            .add(quotation::Column::Title.contains(term)),
                    );
                }
                fetch_page(&db, select, &params)
                    .await
                    .map_err(db_error("quotation"))
            })
            .await
    }

    #[instrument(skip(self), fields(quotation_id = %id))]
    pub async fn get_detail(&self, id: Uuid) -> Result<QuotationDetail, ServiceError> {
        let key = format!("{TABLE}:{id}:detail");
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move { load_detail(&*db, id).await })
            .await
    }

    #[instrument(skip(self, request), fields(company_id = %request.company_id, items = request.items.len()))]
    pub async fn create(
        &self,
        request: CreateQuotationRequest,
        actor: Option<Uuid>,
    ) -> Result<QuotationDetail, ServiceError> {
        request.validate()?;

        let txn = self.ctx.db().begin().await.map_err(db_error("quotation"))?;

        find_company(&txn, request.company_id).await?;
        if let Some(contact_id) = request.contact_id {
            ensure_contact_of_company(&txn, contact_id, request.company_id).await?;
        }

        let quotation_id = Uuid::new_v4();
        let quotation = QuotationActiveModel {
            id: Set(quotation_id),
            quotation_number: Set(request
                .quotation_number
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| document_number("Q"))),
            company_id: Set(request.company_id),
            contact_id: Set(request.contact_id),
            title: Set(normalize_optional(request.title)),
            status: Set(request.status.unwrap_or(QuotationStatus::Draft)),
            currency: Set(normalize_currency(&request.currency)),
            valid_until: Set(request.valid_until),
            notes: Set(normalize_optional(request.notes)),
            total_amount: Set(Decimal::ZERO),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_error("quotation"))?;

        for (index, item) in request.items.into_iter().enumerate() {
            let position = item.position.unwrap_or(index as i32 + 1);
            insert_item(&txn, quotation_id, item, position, actor).await?;
        }
        let quotation = recalculate_total(&txn, quotation).await?;

        txn.commit().await.map_err(db_error("quotation"))?;

        info!(
            quotation_id = %quotation_id,
            quotation_number = %quotation.quotation_number,
            total_amount = %quotation.total_amount,
            "Quotation created"
        );
        self.ctx.invalidate(&[TABLE, ITEMS_TABLE]);
        self.ctx.emit(Event::QuotationCreated(quotation_id)).await;
        load_detail(self.ctx.db(), quotation_id).await
    }

    #[instrument(skip(self, request), fields(quotation_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateQuotationRequest) -> Result<QuotationDetail, ServiceError> {
        request.validate()?;

        let existing = find_quotation(self.ctx.db(), id).await?;
        if let Some(contact_id) = request.contact_id {
            ensure_contact_of_company(self.ctx.db(), contact_id, existing.company_id).await?;
        }

        let mut active: QuotationActiveModel = existing.into();
        if let Some(contact_id) = request.contact_id {
            active.contact_id = Set(Some(contact_id));
        }
        if request.title.is_some() {
            active.title = Set(normalize_optional(request.title));
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(currency) = request.currency {
            active.currency = Set(normalize_currency(&currency));
        }
        if request.valid_until.is_some() {
            active.valid_until = Set(request.valid_until);
        }
        if request.notes.is_some() {
            active.notes = Set(normalize_optional(request.notes));
        }
        active.update(self.ctx.db()).await.map_err(db_error("quotation"))?;

        info!(quotation_id = %id, "Quotation updated");
        self.ctx.invalidate(&[TABLE]);
        self.ctx.emit(Event::QuotationUpdated(id)).await;
        load_detail(self.ctx.db(), id).await
    }

    /// Deletes the quotation and its items; orders created from it keep existing unlinked.
    #[instrument(skip(self), fields(quotation_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        find_quotation(self.ctx.db(), id)
            .await?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("quotation"))?;

        info!(quotation_id = %id, "Quotation deleted");
        self.ctx
            .invalidate(&[TABLE, ITEMS_TABLE, orders::TABLE, super::documents::TABLE]);
        self.ctx.emit(Event::QuotationDeleted(id)).await;
        Ok(())
    }

    #[instrument(skip(self, request), fields(quotation_id = %quotation_id))]
    pub async fn add_item(
        &self,
        quotation_id: Uuid,
        request: CreateQuotationItemRequest,
        actor: Option<Uuid>,
    ) -> Result<QuotationDetail, ServiceError> {
        request.validate()?;

        let txn = self.ctx.db().begin().await.map_err(db_error("quotation item"))?;
        let quotation = find_quotation(&txn, quotation_id).await?;
        let position = match request.position {
            Some(position) => position,
            None => next_position(&txn, quotation_id).await?,
        };
        let item = insert_item(&txn, quotation_id, request, position, actor).await?;
        let quotation = recalculate_total(&txn, quotation).await?;
        txn.commit().await.map_err(db_error("quotation item"))?;

        info!(item_id = %item.id, total_amount = %quotation.total_amount, "Quotation item added");
        self.after_item_change(&quotation).await;
        load_detail(self.ctx.db(), quotation_id).await
    }

    #[instrument(skip(self, request), fields(quotation_id = %quotation_id, item_id = %item_id))]
    pub async fn update_item(
        &self,
        quotation_id: Uuid,
        item_id: Uuid,
        request: UpdateQuotationItemRequest,
    ) -> Result<QuotationDetail, ServiceError> {
        request.validate()?;

        let txn = self.ctx.db().begin().await.map_err(db_error("quotation item"))?;
        let quotation = find_quotation(&txn, quotation_id).await?;
        let mut active: QuotationItemActiveModel = find_item(&txn, quotation_id, item_id).await?.into();
        if let Some(description) = request.description {
            active.description = Set(description.trim().to_string());
        }
        if let Some(quantity) = request.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(unit_price) = request.unit_price {
            active.unit_price = Set(unit_price);
        }
        if let Some(discount) = request.discount {
            active.discount = Set(discount);
        }
        if let Some(parameters) = request.parameters {
            active.parameters = Set(Some(parameters));
        }
        if let Some(position) = request.position {
            active.position = Set(position);
        }
        active.update(&txn).await.map_err(db_error("quotation item"))?;
        let quotation = recalculate_total(&txn, quotation).await?;
        txn.commit().await.map_err(db_error("quotation item"))?;

        info!(total_amount = %quotation.total_amount, "Quotation item updated");
        self.after_item_change(&quotation).await;
        load_detail(self.ctx.db(), quotation_id).await
    }

    #[instrument(skip(self), fields(quotation_id = %quotation_id, item_id = %item_id))]
    pub async fn delete_item(&self, quotation_id: Uuid, item_id: Uuid) -> Result<QuotationDetail, ServiceError> {
        let txn = self.ctx.db().begin().await.map_err(db_error("quotation item"))?;
        let quotation = find_quotation(&txn, quotation_id).await?;
        find_item(&txn, quotation_id, item_id)
            .await?
            .delete(&txn)
            .await
            .map_err(db_error("quotation item"))?;
        let quotation = recalculate_total(&txn, quotation).await?;
        txn.commit().await.map_err(db_error("quotation item"))?;

        info!(total_amount = %quotation.total_amount, "Quotation item deleted");
        self.after_item_change(&quotation).await;
        load_detail(self.ctx.db(), quotation_id).await
    }

    /// Assembles the printable document, taking the seller block from settings when present.
    #[instrument(skip(self), fields(quotation_id = %id))]
    pub async fn build_document(&self, id: Uuid) -> Result<QuotationDocument, ServiceError> {
        let detail = load_detail(self.ctx.db(), id).await?;
        let seller = company_profile(self.ctx.db(), &self.seller).await?;
        Ok(to_document(detail, seller))
    }

    /// Renders the quotation PDF; returns the suggested file name and the bytes.
    #[instrument(skip(self), fields(quotation_id = %id))]
    pub async fn render_pdf(&self, id: Uuid) -> Result<(String, Vec<u8>), ServiceError> {
        let document = self.build_document(id).await?;
        let file_name = format!("{}.pdf", document.quotation_number);
        let bytes = tokio::task::spawn_blocking(move || quotation_pdf::render(&document))
            .await
            .map_err(|e| ServiceError::InternalError(format!("PDF rendering task failed: {e}")))??;
        info!(size = bytes.len(), "Quotation PDF rendered");
        Ok((file_name, bytes))
    }

    /// Creates an order from the quotation's items and marks the quotation accepted, in one
    /// transaction.
    #[instrument(skip(self), fields(quotation_id = %id))]
    pub async fn convert_to_order(&self, id: Uuid, actor: Option<Uuid>) -> Result<OrderDetail, ServiceError> {
        let txn = self.ctx.db().begin().await.map_err(db_error("order"))?;

        let quotation = find_quotation(&txn, id).await?;
        if matches!(quotation.status, QuotationStatus::Rejected | QuotationStatus::Expired) {
            return Err(ServiceError::Conflict(format!(
                "Quotation {} is {} and cannot be converted",
                quotation.quotation_number, quotation.status
            )));
        }
        if let Some(existing) = orders::find_by_quotation(&txn, id).await? {
            return Err(ServiceError::Conflict(format!(
                "Quotation {} was already converted to order {}",
                quotation.quotation_number, existing.order_number
            )));
        }

        let items = load_items(&txn, id).await?;
        let lines: Vec<LineItem> = items.iter().map(LineItem::from).collect();
        let order_id = Uuid::new_v4();
        let order = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(document_number("ORD")),
            company_id: Set(quotation.company_id),
            quotation_id: Set(Some(id)),
            status: Set(OrderStatus::New),
            currency: Set(quotation.currency.clone()),
            order_date: Set(Utc::now().date_naive()),
            notes: Set(quotation.notes.clone()),
            total_amount: Set(calculate_total(&lines)),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_error("order"))?;

        for item in &items {
            OrderItemActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                description: Set(describe_with_parameters(item)),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                discount: Set(item.discount),
                created_by: Set(actor),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(db_error("order item"))?;
        }

        let mut accepted: QuotationActiveModel = quotation.into();
        accepted.status = Set(QuotationStatus::Accepted);
        accepted.update(&txn).await.map_err(db_error("quotation"))?;

        txn.commit().await.map_err(db_error("order"))?;

        info!(order_id = %order_id, order_number = %order.order_number, items = items.len(), "Quotation converted to order");
        self.ctx
            .invalidate(&[TABLE, orders::TABLE, orders::ITEMS_TABLE]);
        self.ctx.emit(Event::QuotationConverted { quotation_id: id, order_id }).await;
        self.ctx.emit(Event::OrderCreated(order_id)).await;
        orders::load_detail(self.ctx.db(), order_id).await
    }

    async fn after_item_change(&self, quotation: &QuotationModel) {
        self.ctx.invalidate(&[TABLE, ITEMS_TABLE]);
        self.ctx
            .emit(Event::QuotationTotalRecalculated {
                quotation_id: quotation.id,
                total_amount: quotation.total_amount,
            })
            .await;
    }
}

pub(crate) async fn find_quotation(db: &impl ConnectionTrait, id: Uuid) -> Result<QuotationModel, ServiceError> {
    QuotationEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("quotation"))?
        .ok_or_else(|| ServiceError::not_found("Quotation", id))
}

async fn find_item(
    db: &impl ConnectionTrait,
    quotation_id: Uuid,
    item_id: Uuid,
) -> Result<QuotationItemModel, ServiceError> {
    QuotationItemEntity::find_by_id(item_id)
        .filter(quotation_item::Column::QuotationId.eq(quotation_id))
        .one(db)
        .await
        .map_err(db_error("quotation item"))?
        .ok_or_else(|| ServiceError::not_found("Quotation item", item_id))
}

async fn load_items(db: &impl ConnectionTrait, quotation_id: Uuid) -> Result<Vec<QuotationItemModel>, ServiceError> {
    QuotationItemEntity::find()
        .filter(quotation_item::Column::QuotationId.eq(quotation_id))
        .order_by_asc(quotation_item::Column::Position)
        .order_by_asc(quotation_item::Column::CreatedAt)
        .all(db)
        .await
        .map_err(db_error("quotation item"))
}

async fn load_detail(db: &impl ConnectionTrait, id: Uuid) -> Result<QuotationDetail, ServiceError> {
    let quotation = find_quotation(db, id).await?;
    let items = load_items(db, id).await?;
    let company = find_company(db, quotation.company_id).await?;
    let contact = match quotation.contact_id {
        Some(contact_id) => ContactEntity::find_by_id(contact_id)
            .one(db)
            .await
            .map_err(db_error("contact"))?,
        None => None,
    };
    Ok(QuotationDetail {
        quotation,
        items,
        company,
        contact,
    })
}

async fn ensure_contact_of_company(
    db: &impl ConnectionTrait,
    contact_id: Uuid,
    company_id: Uuid,
) -> Result<(), ServiceError> {
    let contact = ContactEntity::find_by_id(contact_id)
        .one(db)
        .await
        .map_err(db_error("contact"))?
        .ok_or_else(|| ServiceError::not_found("Contact", contact_id))?;
    if contact.company_id != company_id {
        return Err(ServiceError::ValidationError(
            "contact_id: contact belongs to a different company".to_string(),
        ));
    }
    Ok(())
}

async fn next_position(db: &impl ConnectionTrait, quotation_id: Uuid) -> Result<i32, ServiceError> {
    let count = QuotationItemEntity::find()
        .filter(quotation_item::Column::QuotationId.eq(quotation_id))
        .count(db)
        .await
        .map_err(db_error("quotation item"))?;
    Ok(i32::try_from(count).unwrap_or(i32::MAX - 1) + 1)
}

/// Inserts one item, filling description and price from the catalog when omitted.
async fn insert_item(
    db: &impl ConnectionTrait,
    quotation_id: Uuid,
    request: CreateQuotationItemRequest,
    position: i32,
    actor: Option<Uuid>,
) -> Result<QuotationItemModel, ServiceError> {
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

    QuotationItemActiveModel {
        id: Set(Uuid::new_v4()),
        quotation_id: Set(quotation_id),
        product_id: Set(request.product_id),
        description: Set(description),
        quantity: Set(request.quantity),
        unit_price: Set(unit_price),
        discount: Set(request.discount.unwrap_or(Decimal::ZERO)),
        parameters: Set(request.parameters),
        position: Set(position),
        created_by: Set(actor),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(db_error("quotation item"))
}

/// Writes the sum of the items' line totals to the quotation.
pub(crate) async fn recalculate_total(
    db: &impl ConnectionTrait,
    quotation: QuotationModel,
) -> Result<QuotationModel, ServiceError> {
    let items = load_items(db, quotation.id).await?;
    let lines: Vec<LineItem> = items.iter().map(LineItem::from).collect();
    let total = calculate_total(&lines);
    if total != quotation.total_amount {
        debug!(
            quotation_id = %quotation.id,
            previous = %quotation.total_amount,
            total = %total,
            "Quotation total changed"
        );
    }

    let mut active: QuotationActiveModel = quotation.into();
    active.total_amount = Set(total);
    active.update(db).await.map_err(db_error("quotation"))
}

fn parameter_pairs(parameters: Option<&serde_json::Value>) -> Vec<(String, String)> {
    match parameters {
        Some(serde_json::Value::Object(map)) => map
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn describe_with_parameters(item: &QuotationItemModel) -> String {
    let pairs = parameter_pairs(item.parameters.as_ref());
    if pairs.is_empty() {
        return item.description.clone();
    }
    let rendered: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    format!("{} ({})", item.description, rendered.join(", "))
}

fn buyer_address(company: &CompanyModel) -> Option<String> {
    let parts: Vec<&str> = [&company.address, &company.city, &company.country]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn to_document(detail: QuotationDetail, seller: CompanyProfile) -> QuotationDocument {
    let lines = detail
        .items
        .iter()
        .map(|item| DocumentLine {
            position: item.position,
            description: item.description.clone(),
            parameters: parameter_pairs(item.parameters.as_ref()),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: item.discount,
            line_total: line_total(&LineItem::from(item)),
        })
        .collect();

    QuotationDocument {
        quotation_number: detail.quotation.quotation_number.clone(),
        title: detail.quotation.title.clone(),
        issued_on: detail.quotation.created_at.date_naive(),
        valid_until: detail.quotation.valid_until,
        currency: detail.quotation.currency.clone(),
        seller: Party {
            name: seller.name,
            address: seller.address,
            tax_id: seller.tax_id,
        },
        buyer: Party {
            name: detail.company.name.clone(),
            address: buyer_address(&detail.company),
            tax_id: detail.company.tax_id.clone(),
        },
        lines,
        total: detail.quotation.total_amount,
        notes: detail.quotation.notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn item(parameters: Option<serde_json::Value>) -> QuotationItemModel {
        let now = Utc::now();
        QuotationItemModel {
            id: Uuid::new_v4(),
            quotation_id: Uuid::new_v4(),
            product_id: None,
            description: "T-shirt".into(),
            quantity: dec!(2),
            unit_price: dec!(100),
            discount: dec!(10),
            parameters,
            position: 1,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn blank_item_descriptions_are_rejected() {
        let update = UpdateQuotationItemRequest {
            description: Some("   ".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateQuotationItemRequest {
            description: Some("Hoodie".into()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());

        let create = CreateQuotationItemRequest {
            product_id: None,
            description: Some("\t".into()),
            quantity: dec!(1),
            unit_price: Some(dec!(5)),
            discount: None,
            parameters: None,
            position: None,
        };
        assert!(create.validate().is_err());
    }

    #[test]
    fn parameters_render_as_sorted_pairs() {
        let pairs = parameter_pairs(Some(&json!({"size": "XL", "color": "red", "qty_pack": 6})));
        assert_eq!(
            pairs,
            vec![
                ("color".to_string(), "red".to_string()),
                ("qty_pack".to_string(), "6".to_string()),
                ("size".to_string(), "XL".to_string()),
            ]
        );
        assert!(parameter_pairs(Some(&json!(["not", "an", "object"]))).is_empty());
    }

    #[test]
    fn order_line_description_includes_parameters() {
        assert_eq!(describe_with_parameters(&item(None)), "T-shirt");
        assert_eq!(
            describe_with_parameters(&item(Some(json!({"size": "XL"})))),
            "T-shirt (size: XL)"
        );
    }

    #[test]
    fn item_request_rejects_out_of_range_values() {
        let request = CreateQuotationItemRequest {
            product_id: None,
            description: Some("Stand".into()),
            quantity: dec!(0),
            unit_price: Some(dec!(-5)),
            discount: Some(dec!(120)),
            parameters: Some(json!("XL")),
            position: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["quantity", "unit_price", "discount", "parameters"] {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn nested_items_are_validated_with_the_quotation() {
        let request = CreateQuotationRequest {
            quotation_number: None,
            company_id: Uuid::new_v4(),
            contact_id: None,
            title: None,
            status: None,
            currency: "EUR".into(),
            valid_until: None,
            notes: None,
            items: vec![CreateQuotationItemRequest {
                product_id: None,
                description: Some("Stand".into()),
                quantity: dec!(1),
                unit_price: Some(dec!(10)),
                discount: Some(dec!(101)),
                parameters: None,
                position: None,
            }],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn buyer_address_joins_present_parts() {
        let now = Utc::now();
        let company = CompanyModel {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            tax_id: None,
            email: None,
            phone: None,
            website: None,
            address: Some("Main St 1".into()),
            city: None,
            country: Some("PL".into()),
            industry: None,
            status: None,
            notes: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(buyer_address(&company).as_deref(), Some("Main St 1, PL"));
    }
}
