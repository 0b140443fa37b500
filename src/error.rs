use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use time::Date;
use tracing::error;
use uuid::Uuid;

use crate::nutrition::types::MealSlot;

/// Error type shared by services and handlers. Every variant is recoverable by
/// the caller; the JSON body carries enough detail to retry correctly.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("no nutrition plan exists for {0}")]
    NoPlanForDate(Date),

    #[error("food {food_id} is not planned for {meal_slot} on {date}")]
    MealNotPlanned {
        food_id: Uuid,
        meal_slot: MealSlot,
        date: Date,
    },

    #[error(
        "logging {attempted} portions of food {food_id} for {meal_slot} would exceed the plan: \
         planned {planned}, already consumed {consumed}, remaining {remaining}"
    )]
    PortionExceedsPlan {
        food_id: Uuid,
        meal_slot: MealSlot,
        planned: f64,
        consumed: f64,
        remaining: f64,
        attempted: f64,
    },

    #[error("a plan already exists for {0}")]
    PlanAlreadyExists(Date),

    #[error("no foods available in the catalog")]
    NoFoodsAvailable,

    #[error("you do not have access to this resource")]
    Unauthorized,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(e.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::NoPlanForDate(_) | Self::NoFoodsAvailable => {
                StatusCode::NOT_FOUND
            }
            Self::Conflict(_)
            | Self::MealNotPlanned { .. }
            | Self::PortionExceedsPlan { .. }
            | Self::PlanAlreadyExists(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::PortionExceedsPlan {
                food_id,
                meal_slot,
                planned,
                consumed,
                remaining,
                attempted,
            } => json!({
                "error": self.to_string(),
                "food_id": food_id,
                "meal_slot": meal_slot,
                "planned_portion": planned,
                "consumed_portion": consumed,
                "remaining_portion": remaining,
                "attempted_portion": attempted,
            }),
            Self::MealNotPlanned {
                food_id,
                meal_slot,
                date,
            } => json!({
                "error": self.to_string(),
                "food_id": food_id,
                "meal_slot": meal_slot,
                "date": date,
            }),
            Self::Internal(e) => {
                error!(error = %e, "internal error");
                json!({ "error": "internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn portion_exceeds_plan_is_conflict_with_detail() {
        let err = ApiError::PortionExceedsPlan {
            food_id: Uuid::new_v4(),
            meal_slot: MealSlot::Breakfast,
            planned: 2.0,
            consumed: 1.0,
            remaining: 1.0,
            attempted: 1.5,
        };
        assert_eq!(err.status(), StatusCode::CONFLICT);
        let msg = err.to_string();
        assert!(msg.contains("planned 2"));
        assert!(msg.contains("remaining 1"));
    }

    #[test]
    fn no_plan_for_date_is_not_found() {
        let err = ApiError::NoPlanForDate(date!(2025 - 06 - 03));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("2025-06-03"));
    }

    #[test]
    fn validation_is_bad_request() {
        let err = ApiError::Validation("portion must be positive".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_is_forbidden() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::FORBIDDEN);
    }
}
