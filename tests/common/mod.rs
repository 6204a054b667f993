#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use sqlx::PgPool;
use subscription_aggregator::api::routes::create_routes;
use subscription_aggregator::api::subscriptions::AppState;
use subscription_aggregator::models::NewSubscription;
use subscription_aggregator::repository::{InMemorySubscriptionRepository, ListOrder};
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .init();
    });
}

/// Router over a fresh in-memory store
pub fn test_app(list_order: ListOrder) -> Router {
    init_test_logging();
    let repository = Arc::new(InMemorySubscriptionRepository::new(list_order));
    create_routes(AppState::new(repository), Duration::from_secs(5))
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn new_subscription(
    user_id: Uuid,
    service_name: &str,
    price: i32,
    start_date: &str,
    end_date: Option<&str>,
) -> NewSubscription {
    NewSubscription {
        service_name: service_name.to_string(),
        price,
        user_id: user_id.to_string(),
        start_date: start_date.to_string(),
        end_date: end_date.map(str::to_string),
    }
}

/// Connects to `TEST_DATABASE_URL` and migrates it; `None` when unset or
/// unreachable so the caller can skip.
pub async fn test_pool() -> Option<PgPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            println!("Test database not available ({}), skipping", e);
            return None;
        }
    };

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}
