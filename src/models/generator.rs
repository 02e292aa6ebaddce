use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::looks_like_email;
use crate::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Generator {
    pub id: i64,
    pub model: String,
    pub name: String,
    pub capacity: Option<String>,
    pub location_name: Option<String>,
    pub owner_email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub note: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorInput {
    pub model: String,
    pub name: String,
    pub capacity: Option<String>,
    pub location_name: Option<String>,
    pub owner_email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub note: Option<String>,
}

impl GeneratorInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.model.trim().is_empty() {
            return Err(AppError::Validation("Model is required".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if let Some(email) = self.owner_email.as_deref().filter(|e| !e.is_empty()) {
            if !looks_like_email(email) {
                return Err(AppError::Validation("Invalid owner email format".to_string()));
            }
        }
        validate_coordinates(self.latitude, self.longitude)
    }
}

/// Both halves are optional for assets, but whatever is present must be on the globe.
pub fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<()> {
    if let Some(lat) = latitude {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::Validation("Latitude must be between -90 and 90".to_string()));
        }
    }
    if let Some(lon) = longitude {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(AppError::Validation(
                "Longitude must be between -180 and 180".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> GeneratorInput {
        GeneratorInput {
            model: "CAT C15".to_string(),
            name: "Hospital backup".to_string(),
            capacity: Some("500kVA".to_string()),
            location_name: None,
            owner_email: None,
            latitude: Some(6.9271),
            longitude: Some(79.8612),
            note: None,
        }
    }

    #[test]
    fn test_valid_generator() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_required_fields() {
        let mut g = input();
        g.model = " ".to_string();
        assert!(g.validate().is_err());

        let mut g = input();
        g.name = String::new();
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(validate_coordinates(Some(90.0), Some(-180.0)).is_ok());
        assert!(validate_coordinates(Some(90.5), None).is_err());
        assert!(validate_coordinates(None, Some(181.0)).is_err());
        assert!(validate_coordinates(Some(f64::NAN), None).is_err());
        assert!(validate_coordinates(None, None).is_ok());
    }
}
