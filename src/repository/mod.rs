// Storage contract for subscriptions and its implementations

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::errors::{SubscriptionError, SubscriptionResult};
use crate::models::{NewSubscription, Period, Subscription};

pub mod memory;
pub mod postgres;

pub use memory::InMemorySubscriptionRepository;
pub use postgres::PgSubscriptionRepository;

/// Operations available against subscription storage.
///
/// Identifiers arrive as text and are validated before any storage call.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Persists `sub` and returns the id assigned by the store.
    async fn create(&self, sub: &NewSubscription) -> SubscriptionResult<Uuid>;

    async fn get_by_id(&self, id: &str) -> SubscriptionResult<Subscription>;

    /// All subscriptions of `user_id`, newest start first. Empty when the
    /// user has none.
    async fn list_by_user_id(&self, user_id: &str) -> SubscriptionResult<Vec<Subscription>>;

    /// Replaces every field except the id.
    async fn update(&self, id: &str, sub: &NewSubscription) -> SubscriptionResult<()>;

    async fn delete(&self, id: &str) -> SubscriptionResult<()>;

    /// Sum of `price` over the user's subscriptions overlapping `[from, to]`,
    /// restricted to `service_name` unless it is empty.
    async fn total_cost(
        &self,
        user_id: &str,
        service_name: &str,
        from: &str,
        to: &str,
    ) -> SubscriptionResult<i64>;
}

/// How `list_by_user_id` orders `start_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Descending on the raw `MM-YYYY` text. Not chronological: "12-2023"
    /// sorts ahead of "01-2024".
    #[default]
    Literal,
    /// Descending on (year, month).
    Chronological,
}

impl ListOrder {
    pub fn order_by_clause(&self) -> &'static str {
        match self {
            ListOrder::Literal => "start_date DESC",
            ListOrder::Chronological => "substr(start_date, 4, 4) DESC, substr(start_date, 1, 2) DESC",
        }
    }

    pub fn sort(&self, subscriptions: &mut [Subscription]) {
        match self {
            ListOrder::Literal => {
                subscriptions.sort_by(|a, b| b.start_date.cmp(&a.start_date));
            }
            ListOrder::Chronological => {
                subscriptions.sort_by_key(|s| std::cmp::Reverse(Period::parse(&s.start_date).ok()));
            }
        }
    }
}

impl FromStr for ListOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "literal" => Ok(ListOrder::Literal),
            "chronological" => Ok(ListOrder::Chronological),
            other => Err(anyhow::anyhow!(
                "unknown list order '{}', expected 'literal' or 'chronological'",
                other
            )),
        }
    }
}

impl fmt::Display for ListOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListOrder::Literal => write!(f, "literal"),
            ListOrder::Chronological => write!(f, "chronological"),
        }
    }
}

pub(crate) fn parse_subscription_id(id: &str) -> SubscriptionResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| SubscriptionError::validation("invalid subscription ID format"))
}

pub(crate) fn parse_user_id(user_id: &str) -> SubscriptionResult<Uuid> {
    Uuid::parse_str(user_id)
        .map_err(|e| SubscriptionError::validation(format!("invalid user_id UUID: {}", e)))
}

/// Window bounds for cost aggregation. Only the format is checked; a
/// reversed window is still evaluated with the overlap rule.
pub(crate) fn parse_window(from: &str, to: &str) -> SubscriptionResult<(Period, Period)> {
    let (Ok(from), Ok(to)) = (Period::parse(from), Period::parse(to)) else {
        return Err(SubscriptionError::validation("invalid period: dates must be in MM-YYYY format"));
    };
    Ok((from, to))
}
