pub mod companies;
pub mod contacts;
pub mod dashboard;
pub mod dictionary;
pub mod documents;
pub mod employees;
pub mod exhibitions;
pub mod notes;
pub mod orders;
pub mod pricing;
pub mod product_categories;
pub mod products;
pub mod quotations;
pub mod settings;
pub mod tasks;

use crate::{
    cache::QueryCache,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    PaginatedResponse,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{DbErr, EntityTrait, PaginatorTrait, Select};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;
use validator::ValidationError;

/// Handles shared by every service: the pool, the query cache and the event channel.
#[derive(Clone)]
pub struct ServiceContext {
    pub db: Arc<DbPool>,
    pub cache: QueryCache,
    pub event_sender: Option<Arc<EventSender>>,
}

impl ServiceContext {
    pub fn new(db: Arc<DbPool>, cache: QueryCache, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db,
            cache,
            event_sender,
        }
    }

    pub fn db(&self) -> &DbPool {
        &self.db
    }

    /// Publishes a domain event; failures are logged and never surface to the caller.
    pub async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(event).await;
        }
    }

    /// Drops cached queries of the touched tables (and the dashboard).
    pub fn invalidate(&self, tables: &[&str]) {
        self.cache.invalidate_tables(tables);
    }
}

/// Normalized paging parameters for list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
    pub search: Option<String>,
}

impl PageParams {
    /// Clamps `page` to at least 1 and `limit` to `1..=max_limit`; blank search becomes `None`.
    pub fn new(page: u64, limit: u64, max_limit: u64, search: Option<String>) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, max_limit.max(1)),
            search: search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    /// Stable fragment used in cache keys.
    pub fn cache_fragment(&self) -> String {
        format!(
            "p{}:l{}:s={}",
            self.page,
            self.limit,
            self.search.as_deref().unwrap_or_default()
        )
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::new(1, 20, 100, None)
    }
}

/// Runs `select` page-wise and wraps the rows with paging metadata.
pub async fn fetch_page<E>(
    db: &DbPool,
    select: Select<E>,
    params: &PageParams,
) -> Result<PaginatedResponse<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let paginator = select.paginate(db, params.limit);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(params.page - 1).await?;
    Ok(PaginatedResponse::new(items, total, params.page, params.limit))
}

/// Maps a database error for `context`, logging server-side failures at `error`.
pub(crate) fn db_error(context: &'static str) -> impl Fn(DbErr) -> ServiceError {
    move |err| {
        let mapped = ServiceError::from_db(err, context);
        match &mapped {
            ServiceError::DatabaseError(e) => {
                error!(error = %e, context, "Database operation failed")
            }
            other => warn!(error = %other, context, "Database operation rejected"),
        }
        mapped
    }
}

/// Trims a string and turns empty input into `None`.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn normalize_currency(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}

/// Generates a human-readable document number such as `Q-20240315-3F9A1C`.
pub(crate) fn document_number(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_ascii_uppercase();
    format!("{prefix}-{}-{suffix}", Utc::now().format("%Y%m%d"))
}

// Validators shared by the request types

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("not_positive");
        err.message = Some("must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("percentage");
        err.message = Some("must be between 0 and 100".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_currency_code(value: &str) -> Result<(), ValidationError> {
    let code = value.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        let mut err = ValidationError::new("currency");
        err.message = Some("must be a 3-letter ISO currency code".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn page_params_are_clamped() {
        let params = PageParams::new(0, 1000, 100, Some("  ".into()));
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 100);
        assert_eq!(params.search, None);

        let params = PageParams::new(3, 0, 100, Some(" acme ".into()));
        assert_eq!(params.limit, 1);
        assert_eq!(params.cache_fragment(), "p3:l1:s=acme");
    }

    #[test]
    fn decimal_validators() {
        assert!(validate_non_negative(&dec!(0)).is_ok());
        assert!(validate_non_negative(&dec!(-0.01)).is_err());
        assert!(validate_positive(&dec!(0)).is_err());
        assert!(validate_positive(&dec!(0.5)).is_ok());
        assert!(validate_percentage(&dec!(100)).is_ok());
        assert!(validate_percentage(&dec!(100.01)).is_err());
        assert!(validate_percentage(&dec!(-1)).is_err());
    }

    #[test]
    fn text_validators() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("Acme").is_ok());
        assert!(validate_currency_code("eur").is_ok());
        assert!(validate_currency_code("EURO").is_err());
        assert_eq!(normalize_currency(" usd "), "USD");
        assert_eq!(normalize_optional(Some("  ".into())), None);
    }

    #[test]
    fn document_numbers_carry_prefix_and_date() {
        let number = document_number("Q");
        let today = Utc::now().format("%Y%m%d").to_string();
        assert!(number.starts_with(&format!("Q-{today}-")));
        assert_eq!(number.len(), "Q-".len() + 8 + 1 + 6);
        assert_ne!(number, document_number("Q"));
    }
}
