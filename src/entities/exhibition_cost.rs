use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "exhibition_costs")]
#[schema(as = ExhibitionCost)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub exhibition_id: Uuid,
    pub category: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exhibition::Entity",
        from = "Column::ExhibitionId",
        to = "super::exhibition::Column::Id",
        on_delete = "Cascade"
    )]
    Exhibition,
}

impl Related<super::exhibition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exhibition.def()
    }
}

timestamped_active_model!();
