use crate::{
    db::DbPool,
    entities::{
        customer_transaction::{self, Entity as CustomerTransactionEntity},
        sold_item::{self, Entity as SoldItemEntity},
    },
    errors::ServiceError,
};
use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::instrument;

/// Reporting window granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Monthly,
    Yearly,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_transactions: u64,
    pub total_order_value: Decimal,
    pub total_quantity_transacted: i64,
    pub period: String,
    pub date_range: String,
}

/// Read-only rollups over customer transactions.
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Stats for the period containing the anchor date (or today). The range
    /// is inclusive on both ends.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(
        &self,
        period: &str,
        date: Option<&str>,
    ) -> Result<DashboardStats, ServiceError> {
        let period = Period::from_str(period.trim()).map_err(|_| {
            ServiceError::InvalidInput(format!(
                "Invalid period '{}'. Use 'daily', 'monthly', or 'yearly'",
                period
            ))
        })?;

        let today = Utc::now().date_naive();
        let (start, end, date_range) = resolve_date_range(period, date, today)?;

        let db = &*self.db_pool;

        // Inclusive [start, end]: filter on [start 00:00, end + 1 day).
        let window_start = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).unwrap());
        let window_end = Utc.from_utc_datetime(
            &(end + Duration::days(1)).and_hms_opt(0, 0, 0).unwrap(),
        );

        let transactions = CustomerTransactionEntity::find()
            .filter(customer_transaction::Column::TransactionDate.gte(window_start))
            .filter(customer_transaction::Column::TransactionDate.lt(window_end))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let total_order_value: Decimal =
            transactions.iter().map(|t| t.total_retail_price).sum();

        let ids: Vec<i64> = transactions.iter().map(|t| t.transaction_id).collect();
        let total_quantity_transacted: i64 = if ids.is_empty() {
            0
        } else {
            SoldItemEntity::find()
                .filter(sold_item::Column::TransactionId.is_in(ids))
                .all(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .iter()
                .map(|item| item.quantity as i64)
                .sum()
        };

        Ok(DashboardStats {
            total_transactions: transactions.len() as u64,
            total_order_value,
            total_quantity_transacted,
            period: period.to_string(),
            date_range,
        })
    }
}

/// Resolves the inclusive [start, end] date window and its display label.
fn resolve_date_range(
    period: Period,
    date: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate, String), ServiceError> {
    let anchor = date.map(str::trim).filter(|s| !s.is_empty());

    match period {
        Period::Daily => {
            let day = match anchor {
                Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    ServiceError::InvalidInput(format!(
                        "Invalid date '{}'. Expected YYYY-MM-DD",
                        raw
                    ))
                })?,
                None => today,
            };
            Ok((day, day, day.format("%Y-%m-%d").to_string()))
        }
        Period::Monthly => {
            let (year, month) = match anchor {
                Some(raw) => parse_year_month(raw)?,
                None => (today.year(), today.month()),
            };
            let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                ServiceError::InvalidInput(format!("Invalid month: {}-{:02}", year, month))
            })?;
            let end = last_day_of_month(year, month);
            Ok((start, end, format!("{}-{:02}", year, month)))
        }
        Period::Yearly => {
            let year = match anchor {
                Some(raw) => raw.parse::<i32>().map_err(|_| {
                    ServiceError::InvalidInput(format!(
                        "Invalid year '{}'. Expected YYYY",
                        raw
                    ))
                })?,
                None => today.year(),
            };
            let start = NaiveDate::from_ymd_opt(year, 1, 1)
                .ok_or_else(|| ServiceError::InvalidInput(format!("Invalid year: {}", year)))?;
            let end = NaiveDate::from_ymd_opt(year, 12, 31)
                .ok_or_else(|| ServiceError::InvalidInput(format!("Invalid year: {}", year)))?;
            Ok((start, end, year.to_string()))
        }
    }
}

fn parse_year_month(raw: &str) -> Result<(i32, u32), ServiceError> {
    let invalid = || {
        ServiceError::InvalidInput(format!("Invalid month '{}'. Expected YYYY-MM", raw))
    };
    let (year, month) = raw.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    // First of the following month always exists
    NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap() - Duration::days(1)
}
