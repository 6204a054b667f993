use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::period::Period;
use super::validation::{validate_period_range, validate_subscription_input};
use crate::errors::{SubscriptionError, SubscriptionResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl Subscription {
    /// Overlap with the inclusive window `[from, to]`. A missing end date
    /// counts as still running.
    pub fn overlaps(&self, from: Period, to: Period) -> bool {
        let Ok(start) = Period::parse(&self.start_date) else {
            return false;
        };
        if start > to {
            return false;
        }
        match &self.end_date {
            None => true,
            Some(end) => Period::parse(end).map(|end| end >= from).unwrap_or(false),
        }
    }

    pub fn is_active_in(&self, period: Period) -> bool {
        self.overlaps(period, period)
    }
}

/// Body of create and update requests, as received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl SubscriptionRequest {
    pub fn validate(self) -> SubscriptionResult<NewSubscription> {
        validate_subscription_input(&self.service_name, self.price, &self.user_id, &self.start_date)?;
        validate_period_range(&self.start_date, self.end_date.as_deref())?;

        let price = i32::try_from(self.price)
            .map_err(|_| SubscriptionError::validation("price is too large"))?;

        Ok(NewSubscription {
            service_name: self.service_name,
            price,
            user_id: self.user_id,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// Every field of a subscription except its id; input to create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl NewSubscription {
    /// Checks enforced at the storage boundary; returns the parsed owner id.
    pub fn check(&self) -> SubscriptionResult<Uuid> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| SubscriptionError::validation(format!("invalid user_id UUID: {}", e)))?;
        if self.price <= 0 {
            return Err(SubscriptionError::validation("price must be a positive integer"));
        }
        if Period::parse(&self.start_date).is_err() {
            return Err(SubscriptionError::validation("start_date must be in MM-YYYY format"));
        }
        validate_period_range(&self.start_date, self.end_date.as_deref())?;
        Ok(user_id)
    }

    pub fn into_subscription(self, id: Uuid) -> SubscriptionResult<Subscription> {
        let user_id = self.check()?;
        Ok(Subscription {
            id,
            service_name: self.service_name,
            price: self.price,
            user_id,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TotalCostQuery {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalCostResponse {
    pub total: i64,
}
