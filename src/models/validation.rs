use uuid::Uuid;

use super::period::{is_valid_period, period_greater_or_equal};
use crate::errors::{SubscriptionError, SubscriptionResult};

/// Required-field checks shared by create and update. First failure wins.
pub fn validate_subscription_input(
    service_name: &str,
    price: i64,
    user_id: &str,
    start_date: &str,
) -> SubscriptionResult<()> {
    if service_name.is_empty() {
        return Err(SubscriptionError::validation("service_name is required"));
    }
    if price <= 0 {
        return Err(SubscriptionError::validation("price must be a positive integer"));
    }
    if Uuid::parse_str(user_id).is_err() {
        return Err(SubscriptionError::validation("user_id must be a valid UUID"));
    }
    if !is_valid_period(start_date) {
        return Err(SubscriptionError::validation(
            "start_date must be in MM-YYYY format (e.g., 07-2025)",
        ));
    }
    Ok(())
}

pub fn validate_end_date(end_date: &str) -> SubscriptionResult<()> {
    if !is_valid_period(end_date) {
        return Err(SubscriptionError::validation(
            "invalid end_date: date must be in MM-YYYY format",
        ));
    }
    Ok(())
}

pub fn end_date_after_or_equal_start(start: &str, end: &str) -> bool {
    period_greater_or_equal(start, end)
}

/// Format and ordering checks for an optional end period.
pub fn validate_period_range(start_date: &str, end_date: Option<&str>) -> SubscriptionResult<()> {
    if let Some(end_date) = end_date {
        validate_end_date(end_date)?;
        if !end_date_after_or_equal_start(start_date, end_date) {
            return Err(SubscriptionError::validation("end_date must be >= start_date"));
        }
    }
    Ok(())
}
