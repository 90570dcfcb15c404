use crate::{
    entities::{
        exhibition::{self, ActiveModel as ExhibitionActiveModel, Entity as ExhibitionEntity, Model as ExhibitionModel},
        exhibition_cost::{
            self, ActiveModel as CostActiveModel, Entity as CostEntity, Model as CostModel,
        },
    },
    errors::ServiceError,
    events::Event,
    services::{
        db_error, fetch_page, normalize_currency, normalize_optional, validate_currency_code,
        validate_non_negative, validate_not_blank, PageParams, ServiceContext,
    },
    PaginatedResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub(crate) const TABLE: &str = "exhibitions";
pub(crate) const COSTS_TABLE: &str = "exhibition_costs";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_dates", skip_on_field_errors = false))]
pub struct CreateExhibitionRequest {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
    pub status: Option<String>,
}

fn validate_create_dates(request: &CreateExhibitionRequest) -> Result<(), ValidationError> {
    check_dates(request.start_date, request.end_date)
}

fn check_dates(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        let mut err = ValidationError::new("date_range");
        err.message = Some("end_date must not be before start_date".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateExhibitionRequest {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCostRequest {
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub category: String,
    pub description: Option<String>,
    #[validate(custom = "validate_non_negative")]
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[validate(custom = "validate_currency_code")]
    pub currency: String,
}

#[derive(Clone)]
pub struct ExhibitionService {
    ctx: ServiceContext,
}

impl ExhibitionService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, params: PageParams) -> Result<PaginatedResponse<ExhibitionModel>, ServiceError> {
        let key = format!("{TABLE}:list:{}", params.cache_fragment());
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                let mut select = ExhibitionEntity::find().order_by_desc(exhibition::Column::StartDate);
                if let Some(term) = &params.search {
                    select = select.filter(
                        Condition::any()
                            .add(exhibition::Column::Name.contains(term))
                            .add(exhibition::Column::Location.contains(term)),
                    );
                }
                fetch_page(&db, select, &params).await.map_err(db_error("exhibition"))
            })
            .await
    }

    #[instrument(skip(self), fields(exhibition_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<ExhibitionModel, ServiceError> {
        find_exhibition(self.ctx.db(), id).await
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: CreateExhibitionRequest,
        actor: Option<Uuid>,
    ) -> Result<ExhibitionModel, ServiceError> {
        request.validate()?;

        let model = ExhibitionActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            location: Set(normalize_optional(request.location)),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            description: Set(normalize_optional(request.description)),
            status: Set(normalize_optional(request.status)),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await
        .map_err(db_error("exhibition"))?;

        info!(exhibition_id = %model.id, "Exhibition created");
        self.ctx.invalidate(&[TABLE]);
        self.ctx.emit(Event::ExhibitionCreated(model.id)).await;
        Ok(model)
    }

    #[instrument(skip(self, request), fields(exhibition_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateExhibitionRequest) -> Result<ExhibitionModel, ServiceError> {
        request.validate()?;

        let existing = find_exhibition(self.ctx.db(), id).await?;
        let start = request.start_date.unwrap_or(existing.start_date);
        let end = request.end_date.unwrap_or(existing.end_date);
        check_dates(start, end).map_err(|e| {
            ServiceError::ValidationError(format!("end_date: {}", e.message.unwrap_or_default()))
        })?;

        let mut active: ExhibitionActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if request.location.is_some() {
            active.location = Set(normalize_optional(request.location));
        }
        active.start_date = Set(start);
        active.end_date = Set(end);
        if request.description.is_some() {
            active.description = Set(normalize_optional(request.description));
        }
        if request.status.is_some() {
            active.status = Set(normalize_optional(request.status));
        }

        let model = active.update(self.ctx.db()).await.map_err(db_error("exhibition"))?;
        info!(exhibition_id = %id, "Exhibition updated");
        self.ctx.invalidate(&[TABLE]);
        Ok(model)
    }

    #[instrument(skip(self), fields(exhibition_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        find_exhibition(self.ctx.db(), id)
            .await?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("exhibition"))?;
        info!(exhibition_id = %id, "Exhibition deleted");
        self.ctx.invalidate(&[TABLE, COSTS_TABLE]);
        Ok(())
    }

    #[instrument(skip(self), fields(exhibition_id = %id))]
    pub async fn costs(&self, id: Uuid) -> Result<Vec<CostModel>, ServiceError> {
        let key = format!("{COSTS_TABLE}:exhibition:{id}");
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                find_exhibition(&*db, id).await?;
                CostEntity::find()
                    .filter(exhibition_cost::Column::ExhibitionId.eq(id))
                    .order_by_asc(exhibition_cost::Column::CreatedAt)
                    .all(&*db)
                    .await
                    .map_err(db_error("exhibition cost"))
            })
            .await
    }

    #[instrument(skip(self, request), fields(exhibition_id = %id))]
    pub async fn add_cost(
        &self,
        id: Uuid,
        request: CreateCostRequest,
        actor: Option<Uuid>,
    ) -> Result<CostModel, ServiceError> {
        request.validate()?;
        find_exhibition(self.ctx.db(), id).await?;

        let model = CostActiveModel {
            id: Set(Uuid::new_v4()),
            exhibition_id: Set(id),
            category: Set(request.category.trim().to_string()),
            description: Set(normalize_optional(request.description)),
            amount: Set(request.amount),
            currency: Set(normalize_currency(&request.currency)),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await
        .map_err(db_error("exhibition cost"))?;

        info!(cost_id = %model.id, amount = %model.amount, currency = %model.currency, "Exhibition cost recorded");
        self.ctx.invalidate(&[COSTS_TABLE]);
        self.ctx
            .emit(Event::ExhibitionCostRecorded {
                exhibition_id: id,
                cost_id: model.id,
            })
            .await;
        Ok(model)
    }

    #[instrument(skip(self), fields(exhibition_id = %id, cost_id = %cost_id))]
    pub async fn delete_cost(&self, id: Uuid, cost_id: Uuid) -> Result<(), ServiceError> {
        CostEntity::find_by_id(cost_id)
            .filter(exhibition_cost::Column::ExhibitionId.eq(id))
            .one(self.ctx.db())
            .await
            .map_err(db_error("exhibition cost"))?
            .ok_or_else(|| ServiceError::not_found("Exhibition cost", cost_id))?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("exhibition cost"))?;
        info!("Exhibition cost deleted");
        self.ctx.invalidate(&[COSTS_TABLE]);
        Ok(())
    }
}

async fn find_exhibition(db: &impl ConnectionTrait, id: Uuid) -> Result<ExhibitionModel, ServiceError> {
    ExhibitionEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("exhibition"))?
        .ok_or_else(|| ServiceError::not_found("Exhibition", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn end_before_start_is_rejected() {
        let request = CreateExhibitionRequest {
            name: "Expo".into(),
            location: None,
            start_date: date(2024, 5, 10),
            end_date: date(2024, 5, 9),
            description: None,
            status: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn single_day_exhibition_is_valid() {
        assert!(check_dates(date(2024, 5, 10), date(2024, 5, 10)).is_ok());
    }
}
