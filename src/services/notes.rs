use crate::{
    entities::note::{self, ActiveModel as NoteActiveModel, Entity as NoteEntity, Model as NoteModel},
    errors::ServiceError,
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

pub(crate) const TABLE: &str = "notes";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateNoteRequest {
    pub company_id: Uuid,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateNoteRequest {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub content: Option<String>,
}

#[derive(Clone)]
pub struct NoteService {
    ctx: ServiceContext,
}

impl NoteService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: PageParams,
        company_id: Option<Uuid>,
    ) -> Result<PaginatedResponse<NoteModel>, ServiceError> {
        let key = format!(
            "{TABLE}:list:{}:c={}",
            params.cache_fragment(),
            company_id.map(|id| id.to_string()).unwrap_or_default()
        );
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                let mut select = NoteEntity::find().order_by_desc(note::Column::CreatedAt);
                if let Some(company_id) = company_id {
                    select = select.filter(note::Column::CompanyId.eq(company_id));
                }
                if let Some(term) = &params.search {
                    select = select.filter(
                        Condition::any()
                            .add(note::Column::Title.contains(term))
                            .add(note::Column::Content.contains(term)),
                    );
                }
                fetch_page(&db, select, &params).await.map_err(db_error("note"))
            })
            .await
    }

    #[instrument(skip(self), fields(note_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<NoteModel, ServiceError> {
        find_note(self.ctx.db(), id).await
    }

    #[instrument(skip(self, request), fields(company_id = %request.company_id))]
    pub async fn create(&self, request: CreateNoteRequest, actor: Option<Uuid>) -> Result<NoteModel, ServiceError> {
        request.validate()?;
        find_company(self.ctx.db(), request.company_id).await?;

        let model = NoteActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(request.company_id),
            title: Set(normalize_optional(request.title)),
            content: Set(request.content),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await
        .map_err(db_error("note"))?;

        info!(note_id = %model.id, "Note created");
        self.ctx.invalidate(&[TABLE]);
        Ok(model)
    }

    #[instrument(skip(self, request), fields(note_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateNoteRequest) -> Result<NoteModel, ServiceError> {
        request.validate()?;

        let mut active: NoteActiveModel = find_note(self.ctx.db(), id).await?.into();
        if request.title.is_some() {
            active.title = Set(normalize_optional(request.title));
        }
        if let Some(content) = request.content {
            active.content = Set(content);
        }
        let model = active.update(self.ctx.db()).await.map_err(db_error("note"))?;

        info!(note_id = %id, "Note updated");
        self.ctx.invalidate(&[TABLE]);
        Ok(model)
    }

    #[instrument(skip(self), fields(note_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        find_note(self.ctx.db(), id)
            .await?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("note"))?;
        info!(note_id = %id, "Note deleted");
        self.ctx.invalidate(&[TABLE]);
        Ok(())
    }
}

async fn find_note(db: &impl sea_orm::ConnectionTrait, id: Uuid) -> Result<NoteModel, ServiceError> {
    NoteEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("note"))?
        .ok_or_else(|| ServiceError::not_found("Note", id))
}
