use crate::{
    config::CompanyProfile,
    entities::setting::{self, ActiveModel as SettingActiveModel, Entity as SettingEntity, Model as SettingModel},
    errors::ServiceError,
    events::Event,
    services::{db_error, normalize_optional, ServiceContext},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub(crate) const TABLE: &str = "settings";

/// Setting that overrides the configured seller block on quotation documents.
pub const COMPANY_PROFILE_KEY: &str = "company_profile";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertSettingRequest {
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
    pub description: Option<String>,
}

fn validate_key(key: &str) -> Result<(), ValidationError> {
    let valid = !key.is_empty()
        && key.len() <= 100
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("setting_key");
        err.message = Some("must be 1-100 characters of letters, digits, '_', '-' or '.'".into());
        Err(err)
    }
}

#[derive(Clone)]
pub struct SettingService {
    ctx: ServiceContext,
}

impl SettingService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<SettingModel>, ServiceError> {
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&format!("{TABLE}:all"), || async move {
                SettingEntity::find()
                    .order_by_asc(setting::Column::Key)
                    .all(&*db)
                    .await
                    .map_err(db_error("setting"))
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> Result<SettingModel, ServiceError> {
        find_setting(self.ctx.db(), key)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Setting '{key}' not found")))
    }

    /// Creates the setting or replaces its value.
    #[instrument(skip(self, request))]
    pub async fn upsert(
        &self,
        key: &str,
        request: UpsertSettingRequest,
        actor: Option<Uuid>,
    ) -> Result<SettingModel, ServiceError> {
        validate_key(key).map_err(|e| {
            ServiceError::ValidationError(format!(
                "key: {}",
                e.message.unwrap_or_default()
            ))
        })?;
        if key == COMPANY_PROFILE_KEY {
            serde_json::from_value::<CompanyProfile>(request.value.clone()).map_err(|e| {
                ServiceError::ValidationError(format!("value: invalid company profile: {e}"))
            })?;
        }

        let model = match find_setting(self.ctx.db(), key).await? {
            Some(existing) => {
                let mut active: SettingActiveModel = existing.into();
                active.value = Set(request.value);
                if request.description.is_some() {
                    active.description = Set(normalize_optional(request.description));
                }
                active.update(self.ctx.db()).await
            }
            None => {
                SettingActiveModel {
                    id: Set(Uuid::new_v4()),
                    key: Set(key.to_string()),
                    value: Set(request.value),
                    description: Set(normalize_optional(request.description)),
                    created_by: Set(actor),
                    ..Default::default()
                }
                .insert(self.ctx.db())
                .await
            }
        }
        .map_err(db_error("setting"))?;

        info!(key, "Setting saved");
        self.ctx.invalidate(&[TABLE]);
        self.ctx.emit(Event::SettingChanged(key.to_string())).await;
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        let existing = self.get(key).await?;
        existing.delete(self.ctx.db()).await.map_err(db_error("setting"))?;
        info!(key, "Setting deleted");
        self.ctx.invalidate(&[TABLE]);
        self.ctx.emit(Event::SettingChanged(key.to_string())).await;
        Ok(())
    }
}

async fn find_setting(db: &impl ConnectionTrait, key: &str) -> Result<Option<SettingModel>, ServiceError> {
    SettingEntity::find()
        .filter(setting::Column::Key.eq(key))
        .one(db)
        .await
        .map_err(db_error("setting"))
}

/// Returns the seller profile stored in settings, or `fallback` when none (or an unreadable one)
/// is stored.
pub(crate) async fn company_profile(
    db: &impl ConnectionTrait,
    fallback: &CompanyProfile,
) -> Result<CompanyProfile, ServiceError> {
    let Some(stored) = find_setting(db, COMPANY_PROFILE_KEY).await? else {
        return Ok(fallback.clone());
    };
    match serde_json::from_value::<CompanyProfile>(stored.value) {
        Ok(profile) => Ok(profile),
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable company profile setting");
            Ok(fallback.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_keys_are_restricted() {
        assert!(validate_key("company_profile").is_ok());
        assert!(validate_key("pdf.footer-text").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("has space").is_err());
        assert!(validate_key(&"k".repeat(101)).is_err());
    }
}
