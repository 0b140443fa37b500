use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateFoodRequest {
    pub name: String,
    pub description: Option<String>,
    pub calories_per_portion: f64,
    pub protein_per_portion: f64,
    pub fat_per_portion: f64,
    pub carbs_per_portion: f64,
    pub portion_unit: String,
}

impl CreateFoodRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("food name must not be empty".into());
        }
        if self.portion_unit.trim().is_empty() {
            return Err("portion unit must not be empty".into());
        }
        let rates = [
            self.calories_per_portion,
            self.protein_per_portion,
            self.fat_per_portion,
            self.carbs_per_portion,
        ];
        if rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err("nutrient rates must be non-negative".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateFoodRequest {
        CreateFoodRequest {
            name: "oatmeal".into(),
            description: None,
            calories_per_portion: 150.0,
            protein_per_portion: 5.0,
            fat_per_portion: 3.0,
            carbs_per_portion: 27.0,
            portion_unit: "cup".into(),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut req = request();
        req.protein_per_portion = -1.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut req = request();
        req.name = "  ".into();
        assert!(req.validate().is_err());
    }
}
