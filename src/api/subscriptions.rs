use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{SubscriptionError, SubscriptionResult};
use crate::models::{
    ListQuery, Subscription, SubscriptionRequest, TotalCostQuery, TotalCostResponse,
};
use crate::repository::SubscriptionRepository;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn SubscriptionRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }
}

fn json_body(
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> SubscriptionResult<SubscriptionRequest> {
    payload.map(|Json(request)| request).map_err(|rejection| {
        debug!(error = %rejection, "Rejected request body");
        SubscriptionError::validation("invalid JSON")
    })
}

/// Empty query values count as missing.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Create a subscription; the id is assigned by storage
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> SubscriptionResult<(StatusCode, Json<Subscription>)> {
    let new_subscription = json_body(payload)?.validate()?;

    let id = state.repository.create(&new_subscription).await?;
    let created = new_subscription.into_subscription(id)?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> SubscriptionResult<Json<Subscription>> {
    let subscription = state.repository.get_by_id(&id).await?;
    Ok(Json(subscription))
}

/// List a user's subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> SubscriptionResult<Json<Vec<Subscription>>> {
    let user_id = present(query.user_id)
        .ok_or_else(|| SubscriptionError::validation("user_id query parameter is required"))?;
    if Uuid::parse_str(&user_id).is_err() {
        return Err(SubscriptionError::validation("user_id must be a valid UUID"));
    }

    let subscriptions = state.repository.list_by_user_id(&user_id).await?;
    Ok(Json(subscriptions))
}

/// Replace every field of a subscription and return the stored result
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> SubscriptionResult<Json<Subscription>> {
    let replacement = json_body(payload)?.validate()?;

    state.repository.update(&id, &replacement).await?;

    let updated = state.repository.get_by_id(&id).await.map_err(|e| {
        warn!(id = %id, error = %e, "Updated subscription could not be read back");
        e
    })?;

    Ok(Json(updated))
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> SubscriptionResult<StatusCode> {
    state.repository.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Total price of a user's subscriptions active within `[from, to]`
pub async fn get_total_cost(
    State(state): State<AppState>,
    Query(query): Query<TotalCostQuery>,
) -> SubscriptionResult<Json<TotalCostResponse>> {
    let (Some(from), Some(to)) = (present(query.from), present(query.to)) else {
        return Err(SubscriptionError::validation(
            "'from' and 'to' query parameters are required",
        ));
    };
    let user_id = present(query.user_id)
        .ok_or_else(|| SubscriptionError::validation("'user_id' is required"))?;
    let service_name = query.service_name.unwrap_or_default();

    let total = state
        .repository
        .total_cost(&user_id, &service_name, &from, &to)
        .await?;

    Ok(Json(TotalCostResponse { total }))
}
