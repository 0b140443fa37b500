use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::repo::FoodLogEntry;
use crate::nutrition::types::MealSlot;

/// One entry of a log submission. `log_date` defaults to today when omitted.
#[derive(Debug, Deserialize)]
pub struct LogEntryRequest {
    pub food_id: Uuid,
    pub meal_slot: MealSlot,
    pub consumed_portion: f64,
    pub log_date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct CreateLogsResponse {
    pub message: String,
    pub entries: Vec<FoodLogEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogListQuery {
    pub date: Option<Date>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_request_defaults_date_to_none() {
        let body = r#"{
            "food_id": "7f2c1c6e-9f5d-4c43-a6b8-1f6a3f1d2e4b",
            "meal_slot": "lunch",
            "consumed_portion": 1.5
        }"#;
        let req: LogEntryRequest = serde_json::from_str(body).unwrap();
        assert!(req.log_date.is_none());
        assert_eq!(req.meal_slot, MealSlot::Lunch);
    }

    #[test]
    fn log_entry_request_parses_explicit_date() {
        let body = r#"{
            "food_id": "7f2c1c6e-9f5d-4c43-a6b8-1f6a3f1d2e4b",
            "meal_slot": "dinner",
            "consumed_portion": 0.5,
            "log_date": "2025-06-03"
        }"#;
        let req: LogEntryRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.log_date.unwrap().to_string(), "2025-06-03");
    }
}
