//! Dashboard aggregation.
//!
//! Entity counts and per-window figures are loaded with concurrent queries. Windows are
//! half-open: a row belongs to a window when `start <= created_at < end`. Monetary amounts are
//! converted to the reference currency with the configured static rate table; amounts in
//! currencies missing from the table are left out of the sums and reported instead.

use crate::{
    cache::DASHBOARD_PREFIX,
    config::CurrencyConfig,
    db::DbPool,
    entities::{
        company, contact, exhibition, exhibition_cost, order, product, quotation,
        task::{self, TaskStatus},
    },
    errors::ServiceError,
    services::{db_error, ServiceContext},
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Select};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

/// Half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Calendar month containing `now`, in UTC.
pub fn month_window(now: DateTime<Utc>) -> Option<TimeWindow> {
    let start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)?;
    let end = if now.month() == 12 {
        NaiveDate::from_ymd_opt(now.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(now.year(), now.month() + 1, 1)?
    };
    Some(TimeWindow {
        start: midnight(start),
        end: midnight(end),
    })
}

/// Calendar year containing `now`, in UTC.
pub fn year_window(now: DateTime<Utc>) -> Option<TimeWindow> {
    let start = NaiveDate::from_ymd_opt(now.year(), 1, 1)?;
    let end = NaiveDate::from_ymd_opt(now.year() + 1, 1, 1)?;
    Some(TimeWindow {
        start: midnight(start),
        end: midnight(end),
    })
}

/// Static conversion table: `rates[code]` reference units per one unit of `code`.
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    reference: String,
    rates: HashMap<String, Decimal>,
}

impl CurrencyConverter {
    pub fn new(reference: impl Into<String>, rates: HashMap<String, Decimal>) -> Self {
        Self {
            reference: reference.into(),
            rates,
        }
    }

    pub fn from_config(config: &CurrencyConfig) -> Self {
        Self::new(config.reference_code(), config.normalized_rates())
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn convert(&self, amount: Decimal, currency: &str) -> Option<Decimal> {
        let code = currency.trim().to_ascii_uppercase();
        if code == self.reference {
            return Some(amount);
        }
        self.rates.get(&code).map(|rate| amount * rate)
    }

    /// Sums the convertible amounts; returns the codes that had no rate.
    pub fn sum(&self, amounts: &[(Decimal, String)]) -> (Decimal, BTreeSet<String>) {
        let mut unconverted = BTreeSet::new();
        let total = amounts
            .iter()
            .filter_map(|(amount, currency)| {
                let converted = self.convert(*amount, currency);
                if converted.is_none() {
                    unconverted.insert(currency.trim().to_ascii_uppercase());
                }
                converted
            })
            .sum();
        (total, unconverted)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EntityCounts {
    pub companies: u64,
    pub contacts: u64,
    pub products: u64,
    pub quotations: u64,
    pub orders: u64,
    pub exhibitions: u64,
    pub open_tasks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WindowStats {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub new_companies: u64,
    pub new_quotations: u64,
    pub new_orders: u64,
    #[schema(value_type = String)]
    pub quotations_value: Decimal,
    #[schema(value_type = String)]
    pub orders_value: Decimal,
    #[schema(value_type = String)]
    pub exhibition_costs: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub reference_currency: String,
    pub counts: EntityCounts,
    pub month: WindowStats,
    pub year: WindowStats,
    pub unconverted_currencies: Vec<String>,
}

#[derive(Clone)]
pub struct DashboardService {
    ctx: ServiceContext,
    converter: CurrencyConverter,
}

impl DashboardService {
    pub fn new(ctx: ServiceContext, currency: &CurrencyConfig) -> Self {
        Self {
            ctx,
            converter: CurrencyConverter::from_config(currency),
        }
    }

    /// Cached summary for the current instant.
    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<DashboardSummary, ServiceError> {
        let key = format!("{DASHBOARD_PREFIX}summary");
        self.ctx
            .cache
            .get_or_load(&key, || self.summary_at(Utc::now()))
            .await
    }

    /// Computes the summary for the month and year containing `now`, bypassing the cache.
    #[instrument(skip(self))]
    pub async fn summary_at(&self, now: DateTime<Utc>) -> Result<DashboardSummary, ServiceError> {
        let month = month_window(now)
            .ok_or_else(|| ServiceError::InternalError(format!("No month window for {now}")))?;
        let year = year_window(now)
            .ok_or_else(|| ServiceError::InternalError(format!("No year window for {now}")))?;

        let db = self.ctx.db();
        let (counts, (month_stats, month_unconverted), (year_stats, year_unconverted)) = tokio::try_join!(
            entity_counts(db),
            self.window_stats(db, month),
            self.window_stats(db, year),
        )?;

        let unconverted: BTreeSet<String> = month_unconverted.union(&year_unconverted).cloned().collect();
        if !unconverted.is_empty() {
            warn!(currencies = ?unconverted, "Amounts without a conversion rate were left out of the totals");
        }

        info!(companies = counts.companies, quotations = counts.quotations, "Dashboard summary computed");
        Ok(DashboardSummary {
            generated_at: now,
            reference_currency: self.converter.reference().to_string(),
            counts,
            month: month_stats,
            year: year_stats,
            unconverted_currencies: unconverted.into_iter().collect(),
        })
    }

    async fn window_stats(
        &self,
        db: &DbPool,
        window: TimeWindow,
    ) -> Result<(WindowStats, BTreeSet<String>), ServiceError> {
        let (new_companies, new_quotations, new_orders, quotation_amounts, order_amounts, cost_amounts) = tokio::try_join!(
            count(
                db,
                company::Entity::find()
                    .filter(company::Column::CreatedAt.gte(window.start))
                    .filter(company::Column::CreatedAt.lt(window.end)),
            ),
            count(
                db,
                quotation::Entity::find()
                    .filter(quotation::Column::CreatedAt.gte(window.start))
                    .filter(quotation::Column::CreatedAt.lt(window.end)),
            ),
            count(
                db,
                order::Entity::find()
                    .filter(order::Column::CreatedAt.gte(window.start))
                    .filter(order::Column::CreatedAt.lt(window.end)),
            ),
            amounts(
                db,
                quotation::Entity::find()
                    .select_only()
                    .column(quotation::Column::TotalAmount)
                    .column(quotation::Column::Currency)
                    .filter(quotation::Column::CreatedAt.gte(window.start))
                    .filter(quotation::Column::CreatedAt.lt(window.end)),
            ),
            amounts(
                db,
                order::Entity::find()
                    .select_only()
                    .column(order::Column::TotalAmount)
                    .column(order::Column::Currency)
                    .filter(order::Column::CreatedAt.gte(window.start))
                    .filter(order::Column::CreatedAt.lt(window.end)),
            ),
            amounts(
                db,
                exhibition_cost::Entity::find()
                    .select_only()
                    .column(exhibition_cost::Column::Amount)
                    .column(exhibition_cost::Column::Currency)
                    .filter(exhibition_cost::Column::CreatedAt.gte(window.start))
                    .filter(exhibition_cost::Column::CreatedAt.lt(window.end)),
            ),
        )?;

        let (quotations_value, mut unconverted) = self.converter.sum(&quotation_amounts);
        let (orders_value, orders_unconverted) = self.converter.sum(&order_amounts);
        let (exhibition_costs, costs_unconverted) = self.converter.sum(&cost_amounts);
        unconverted.extend(orders_unconverted);
        unconverted.extend(costs_unconverted);

        Ok((
            WindowStats {
                start: window.start,
                end: window.end,
                new_companies,
                new_quotations,
                new_orders,
                quotations_value,
                orders_value,
                exhibition_costs,
            },
            unconverted,
        ))
    }
}

async fn entity_counts(db: &DbPool) -> Result<EntityCounts, ServiceError> {
    let (companies, contacts, products, quotations, orders, exhibitions, open_tasks) = tokio::try_join!(
        count(db, company::Entity::find()),
        count(db, contact::Entity::find()),
        count(db, product::Entity::find()),
        count(db, quotation::Entity::find()),
        count(db, order::Entity::find()),
        count(db, exhibition::Entity::find()),
        count(db, task::Entity::find().filter(task::Column::Status.ne(TaskStatus::Done))),
    )?;
    Ok(EntityCounts {
        companies,
        contacts,
        products,
        quotations,
        orders,
        exhibitions,
        open_tasks,
    })
}

async fn count<E>(db: &DbPool, select: Select<E>) -> Result<u64, ServiceError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    select.count(db).await.map_err(db_error("dashboard"))
}

async fn amounts<E>(db: &DbPool, select: Select<E>) -> Result<Vec<(Decimal, String)>, ServiceError>
where
    E: EntityTrait,
{
    select
        .into_tuple::<(Decimal, String)>()
        .all(db)
        .await
        .map_err(db_error("dashboard"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn month_window_is_half_open() {
        let window = month_window(at(2024, 3, 15, 10)).unwrap();
        assert_eq!(window.start, at(2024, 3, 1, 0));
        assert_eq!(window.end, at(2024, 4, 1, 0));
        assert!(window.contains(at(2024, 3, 1, 0)));
        assert!(!window.contains(at(2024, 4, 1, 0)));
        assert!(!window.contains(at(2024, 2, 29, 23)));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let window = month_window(at(2023, 12, 31, 23)).unwrap();
        assert_eq!(window.start, at(2023, 12, 1, 0));
        assert_eq!(window.end, at(2024, 1, 1, 0));
    }

    #[test]
    fn year_window_covers_calendar_year() {
        let window = year_window(at(2024, 7, 4, 12)).unwrap();
        assert_eq!(window.start, at(2024, 1, 1, 0));
        assert_eq!(window.end, at(2025, 1, 1, 0));
        assert!(window.contains(at(2024, 12, 31, 23)));
        assert!(!window.contains(at(2025, 1, 1, 0)));
    }

    #[test]
    fn conversion_uses_reference_rates() {
        let converter = CurrencyConverter::from_config(&CurrencyConfig::default());
        assert_eq!(converter.convert(dec!(100), "EUR"), Some(dec!(100)));
        assert_eq!(converter.convert(dec!(100), "usd"), Some(dec!(92.00)));
        assert_eq!(converter.convert(dec!(100), "XYZ"), None);
    }

    #[test]
    fn unknown_currencies_are_excluded_and_reported() {
        let converter = CurrencyConverter::from_config(&CurrencyConfig::default());
        let (total, unconverted) = converter.sum(&[
            (dec!(100), "EUR".to_string()),
            (dec!(10), "PLN".to_string()),
            (dec!(999), "xyz".to_string()),
        ]);
        assert_eq!(total, dec!(102.30));
        assert_eq!(unconverted.into_iter().collect::<Vec<_>>(), vec!["XYZ".to_string()]);
    }
}
