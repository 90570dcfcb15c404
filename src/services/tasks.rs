use crate::{
    entities::task::{self, ActiveModel as TaskActiveModel, Entity as TaskEntity, Model as TaskModel, TaskPriority, TaskStatus},
    errors::ServiceError,
    events::Event,
    services::{
        companies::find_company, db_error, employees::find_employee, fetch_page, normalize_optional,
        validate_not_blank, PageParams, ServiceContext,
    },
    PaginatedResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub(crate) const TABLE: &str = "tasks";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskRequest {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
}

/// `completed_at` follows the status: set when a task becomes done, cleared when it is reopened.
fn completion_time(
    previous: Option<TaskStatus>,
    next: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (previous, next) {
        (Some(TaskStatus::Done), TaskStatus::Done) => completed_at.or(Some(now)),
        (_, TaskStatus::Done) => Some(now),
        _ => None,
    }
}

#[derive(Clone)]
pub struct TaskService {
    ctx: ServiceContext,
}

impl TaskService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, params: PageParams, filter: TaskFilter) -> Result<PaginatedResponse<TaskModel>, ServiceError> {
        let key = format!(
            "{TABLE}:list:{}:st={}:a={}:c={}",
            params.cache_fragment(),
            filter.status.map(|s| s.to_string()).unwrap_or_default(),
            filter.assignee_id.map(|id| id.to_string()).unwrap_or_default(),
            filter.company_id.map(|id| id.to_string()).unwrap_or_default()
        );
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                let mut select = TaskEntity::find()
                    .order_by_asc(task::Column::DueDate)
                    .order_by_desc(task::Column::CreatedAt);
                if let Some(status) = filter.status {
                    select = select.filter(task::Column::Status.eq(status));
                }
                if let Some(assignee_id) = filter.assignee_id {
                    select = select.filter(task::Column::AssigneeId.eq(assignee_id));
                }
                if let Some(company_id) = filter.company_id {
                    select = select.filter(task::Column::CompanyId.eq(company_id));
                }
                if let Some(term) = &params.search {
                    select = select.filter(
                        Condition::any()
                            .add(task::Column::Title.contains(term))
                            .add(task::Column::Description.contains(term)),
                    );
                }
                fetch_page(&db, select, &params).await.map_err(db_error("task"))
            })
            .await
    }

    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<TaskModel, ServiceError> {
        find_task(self.ctx.db(), id).await
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create(&self, request: CreateTaskRequest, actor: Option<Uuid>) -> Result<TaskModel, ServiceError> {
        request.validate()?;
        self.check_references(request.assignee_id, request.company_id).await?;

        let status = request.status.unwrap_or(TaskStatus::Todo);
        let model = TaskActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(request.title.trim().to_string()),
            description: Set(normalize_optional(request.description)),
            status: Set(status),
            priority: Set(request.priority.unwrap_or(TaskPriority::Medium)),
            due_date: Set(request.due_date),
            assignee_id: Set(request.assignee_id),
            company_id: Set(request.company_id),
            completed_at: Set(completion_time(None, status, None, Utc::now())),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await
        .map_err(db_error("task"))?;

        info!(task_id = %model.id, "Task created");
        self.ctx.invalidate(&[TABLE]);
        self.ctx.emit(Event::TaskCreated(model.id)).await;
        Ok(model)
    }

    #[instrument(skip(self, request), fields(task_id = %id))]
    pub async fn update(&self, id: Uuid, request: UpdateTaskRequest) -> Result<TaskModel, ServiceError> {
        request.validate()?;
        self.check_references(request.assignee_id, request.company_id).await?;

        let existing = find_task(self.ctx.db(), id).await?;
        let previous_status = existing.status;
        let status = request.status.unwrap_or(previous_status);
        let completed_at = completion_time(Some(previous_status), status, existing.completed_at, Utc::now());

        let mut active: TaskActiveModel = existing.into();
        if let Some(title) = request.title {
            active.title = Set(title.trim().to_string());
        }
        if request.description.is_some() {
            active.description = Set(normalize_optional(request.description));
        }
        active.status = Set(status);
        active.completed_at = Set(completed_at);
        if let Some(priority) = request.priority {
            active.priority = Set(priority);
        }
        if request.due_date.is_some() {
            active.due_date = Set(request.due_date);
        }
        if request.assignee_id.is_some() {
            active.assignee_id = Set(request.assignee_id);
        }
        if request.company_id.is_some() {
            active.company_id = Set(request.company_id);
        }

        let model = active.update(self.ctx.db()).await.map_err(db_error("task"))?;
        info!(task_id = %id, status = %model.status, "Task updated");
        self.ctx.invalidate(&[TABLE]);
        if previous_status != TaskStatus::Done {
            if let Some(completed_at) = model.completed_at {
                self.ctx
                    .emit(Event::TaskCompleted {
                        task_id: id,
                        completed_at,
                    })
                    .await;
            }
        }
        Ok(model)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        find_task(self.ctx.db(), id)
            .await?
            .delete(self.ctx.db())
            .await
            .map_err(db_error("task"))?;
        info!(task_id = %id, "Task deleted");
        self.ctx.invalidate(&[TABLE]);
        Ok(())
    }

    async fn check_references(&self, assignee_id: Option<Uuid>, company_id: Option<Uuid>) -> Result<(), ServiceError> {
        if let Some(assignee_id) = assignee_id {
            find_employee(self.ctx.db(), assignee_id).await?;
        }
        if let Some(company_id) = company_id {
            find_company(self.ctx.db(), company_id).await?;
        }
        Ok(())
    }
}

async fn find_task(db: &impl ConnectionTrait, id: Uuid) -> Result<TaskModel, ServiceError> {
    TaskEntity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("task"))?
        .ok_or_else(|| ServiceError::not_found("Task", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn completing_a_task_stamps_completion_time() {
        let now = Utc::now();
        assert_eq!(completion_time(Some(TaskStatus::Todo), TaskStatus::Done, None, now), Some(now));
        assert_eq!(completion_time(None, TaskStatus::Done, None, now), Some(now));
    }

    #[test]
    fn already_done_task_keeps_original_completion_time() {
        let now = Utc::now();
        let earlier = now - Duration::days(2);
        assert_eq!(
            completion_time(Some(TaskStatus::Done), TaskStatus::Done, Some(earlier), now),
            Some(earlier)
        );
    }

    #[test]
    fn reopening_clears_completion_time() {
        let now = Utc::now();
        assert_eq!(
            completion_time(Some(TaskStatus::Done), TaskStatus::InProgress, Some(now), now),
            None
        );
    }
}
