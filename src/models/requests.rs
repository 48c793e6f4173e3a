use crate::models::domain::GENDERS;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Request to register a profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 18, max = 150))]
    pub age: i32,
    #[validate(custom(function = "validate_gender"))]
    pub gender: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub long: f64,
}

/// Request to log in
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request for discovery candidates
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiscoverRequest {
    #[serde(default, rename = "minAge")]
    #[validate(range(min = 18, max = 150))]
    pub min_age: Option<i32>,
    #[serde(default, rename = "maxAge")]
    #[validate(range(min = 18, max = 150))]
    pub max_age: Option<i32>,
    #[serde(default)]
    #[validate(custom(function = "validate_genders"))]
    pub genders: Vec<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub long: f64,
}

/// Request to swipe on another profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[serde(rename = "user")]
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[serde(default)]
    pub liked: bool,
}

fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    if GENDERS.contains(&gender) {
        Ok(())
    } else {
        Err(ValidationError::new("gender"))
    }
}

fn validate_genders(genders: &[String]) -> Result<(), ValidationError> {
    genders.iter().try_for_each(|g| validate_gender(g))
}
