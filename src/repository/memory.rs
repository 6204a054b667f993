use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{parse_subscription_id, parse_user_id, parse_window, ListOrder, SubscriptionRepository};
use crate::errors::{SubscriptionError, SubscriptionResult};
use crate::models::{NewSubscription, Subscription};

/// Process-local store with the same semantics as the Postgres repository.
/// Backs the HTTP tests and `STORAGE_BACKEND=memory` runs.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: RwLock<HashMap<Uuid, Subscription>>,
    list_order: ListOrder,
}

impl InMemorySubscriptionRepository {
    pub fn new(list_order: ListOrder) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            list_order,
        }
    }

    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscriptions.read().await.is_empty()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, sub: &NewSubscription) -> SubscriptionResult<Uuid> {
        let id = Uuid::new_v4();
        let subscription = sub.clone().into_subscription(id)?;
        self.subscriptions.write().await.insert(id, subscription);

        debug!(id = %id, "Subscription created");
        Ok(id)
    }

    async fn get_by_id(&self, id: &str) -> SubscriptionResult<Subscription> {
        let id = parse_subscription_id(id)?;
        self.subscriptions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SubscriptionError::NotFound)
    }

    async fn list_by_user_id(&self, user_id: &str) -> SubscriptionResult<Vec<Subscription>> {
        let user_id = parse_user_id(user_id)?;

        let mut subscriptions: Vec<Subscription> = self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        self.list_order.sort(&mut subscriptions);

        Ok(subscriptions)
    }

    async fn update(&self, id: &str, sub: &NewSubscription) -> SubscriptionResult<()> {
        let id = parse_subscription_id(id)?;
        let replacement = sub.clone().into_subscription(id)?;

        let mut subscriptions = self.subscriptions.write().await;
        let existing = subscriptions.get_mut(&id).ok_or(SubscriptionError::NotFound)?;
        *existing = replacement;

        debug!(id = %id, "Subscription updated");
        Ok(())
    }

    async fn delete(&self, id: &str) -> SubscriptionResult<()> {
        let id = parse_subscription_id(id)?;

        self.subscriptions
            .write()
            .await
            .remove(&id)
            .ok_or(SubscriptionError::NotFound)?;

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
        let user_id = parse_user_id(user_id)?;
        let (from, to) = parse_window(from, to)?;

        let total: i64 = self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .filter(|s| service_name.is_empty() || s.service_name == service_name)
            .filter(|s| s.overlaps(from, to))
            .map(|s| i64::from(s.price))
            .sum();

        Ok(total)
    }
}
