use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error};
use uuid::Uuid;

use super::{parse_subscription_id, parse_user_id, parse_window, ListOrder, SubscriptionRepository};
use crate::errors::{SubscriptionError, SubscriptionResult};
use crate::models::{NewSubscription, Subscription};

const SELECT_COLUMNS: &str = "SELECT id, service_name, price, user_id, start_date, end_date FROM subscriptions";

/// SQL expression turning an `MM-YYYY` column into `YYYYMM` text, comparable
/// against `Period::sort_key`.
fn period_key(column: &str) -> String {
    format!("(substr({column}, 4, 4) || substr({column}, 1, 2))")
}

/// `$1` user id, `$2` from key, `$3` to key, `$4` service name when filtered.
pub(crate) fn total_cost_sql(filter_service: bool) -> String {
    let mut sql = format!(
        "SELECT COALESCE(SUM(price), 0)::BIGINT FROM subscriptions \
         WHERE user_id = $1 AND {start} <= $3 AND (end_date IS NULL OR {end} >= $2)",
        start = period_key("start_date"),
        end = period_key("end_date"),
    );
    if filter_service {
        sql.push_str(" AND service_name = $4");
    }
    sql
}

fn list_sql(order: ListOrder) -> String {
    format!("{SELECT_COLUMNS} WHERE user_id = $1 ORDER BY {}", order.order_by_clause())
}

#[derive(Clone)]
pub struct PgSubscriptionRepository {
    db: PgPool,
    list_order: ListOrder,
}

impl PgSubscriptionRepository {
    pub fn new(db: PgPool, list_order: ListOrder) -> Self {
        Self { db, list_order }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn create(&self, sub: &NewSubscription) -> SubscriptionResult<Uuid> {
        let user_id = sub.check()?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&sub.service_name)
        .bind(sub.price)
        .bind(user_id)
        .bind(&sub.start_date)
        .bind(&sub.end_date)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            error!(user_id = %user_id, error = %e, "Failed to create subscription");
            SubscriptionError::Storage(e)
        })?;

        debug!(id = %id, "Subscription created");
        Ok(id)
    }

    async fn get_by_id(&self, id: &str) -> SubscriptionResult<Subscription> {
        let parsed_id = parse_subscription_id(id)?;

        sqlx::query_as::<_, Subscription>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(parsed_id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!(id = %id, error = %e, "Failed to get subscription by ID");
                SubscriptionError::Storage(e)
            })?
            .ok_or(SubscriptionError::NotFound)
    }

    async fn list_by_user_id(&self, user_id: &str) -> SubscriptionResult<Vec<Subscription>> {
        let parsed_user_id = parse_user_id(user_id)?;

        let sql = list_sql(self.list_order);
        let mut rows = sqlx::query(&sql).bind(parsed_user_id).fetch(&self.db);

        let mut subscriptions = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "Failed to list subscriptions");
            SubscriptionError::Storage(e)
        })? {
            match Subscription::from_row(&row) {
                Ok(subscription) => subscriptions.push(subscription),
                Err(e) => {
                    error!(user_id = %user_id, error = %e, "Failed to scan subscription row, skipping");
                }
            }
        }

        Ok(subscriptions)
    }

    async fn update(&self, id: &str, sub: &NewSubscription) -> SubscriptionResult<()> {
        let parsed_id = parse_subscription_id(id)?;
        let user_id = sub.check()?;

        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET service_name = $1, price = $2, user_id = $3, start_date = $4, end_date = $5
            WHERE id = $6
            "#,
        )
        .bind(&sub.service_name)
        .bind(sub.price)
        .bind(user_id)
        .bind(&sub.start_date)
        .bind(&sub.end_date)
        .bind(parsed_id)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!(id = %id, error = %e, "Failed to update subscription");
            SubscriptionError::Storage(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(SubscriptionError::NotFound);
        }

        debug!(id = %id, "Subscription updated");
        Ok(())
    }

    async fn delete(&self, id: &str) -> SubscriptionResult<()> {
        let parsed_id = parse_subscription_id(id)?;

        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(parsed_id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!(id = %id, error = %e, "Failed to delete subscription");
                SubscriptionError::Storage(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(SubscriptionError::NotFound);
        }

        debug!(id = %id, "Subscription deleted");
        Ok(())
    }

    async fn total_cost(
        &self,
        user_id: &str,
        service_name: &str,
        from: &str,
        to: &str,
    ) -> SubscriptionResult<i64> {
        let parsed_user_id = parse_user_id(user_id)?;
        let (from, to) = parse_window(from, to)?;

        let filter_service = !service_name.is_empty();
        let sql = total_cost_sql(filter_service);

        let mut query = sqlx::query_scalar::<_, i64>(&sql)
            .bind(parsed_user_id)
            .bind(from.sort_key())
            .bind(to.sort_key());
        if filter_service {
            query = query.bind(service_name);
        }

        query.fetch_one(&self.db).await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "Failed to calculate total cost");
            SubscriptionError::Storage(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_cost_sql_without_service_filter() {
        let sql = total_cost_sql(false);
        assert!(sql.contains("COALESCE(SUM(price), 0)"));
        assert!(sql.contains("(substr(start_date, 4, 4) || substr(start_date, 1, 2)) <= $3"));
        assert!(sql.contains("end_date IS NULL OR (substr(end_date, 4, 4) || substr(end_date, 1, 2)) >= $2"));
        assert!(!sql.contains("$4"));
    }

    #[test]
    fn test_total_cost_sql_with_service_filter() {
        assert!(total_cost_sql(true).ends_with(" AND service_name = $4"));
    }

    #[test]
    fn test_list_sql_follows_order() {
        assert!(list_sql(ListOrder::Literal).ends_with("ORDER BY start_date DESC"));
        assert!(list_sql(ListOrder::Chronological).contains("ORDER BY substr(start_date, 4, 4) DESC"));
    }
}
