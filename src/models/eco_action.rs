// src/models/eco_action.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::html::validate_plain_text;

/// Represents the 'eco_actions' table.
/// A sustainability action a user logs for themselves, independent of quizzes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EcoAction {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub points: i64,
    pub completed: bool,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEcoAction {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub points: i64,
}

/// DTO for logging a new eco action. Text fields are plain text and are stored as sent.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEcoActionRequest {
    #[validate(
        length(
            min = 1,
            max = 200,
            message = "Title must be between 1 and 200 characters"
        ),
        custom(function = validate_plain_text)
    )]
    pub title: String,
    #[validate(
        length(
            min = 1,
            max = 500,
            message = "Description must be between 1 and 500 characters"
        ),
        custom(function = validate_plain_text)
    )]
    pub description: String,
    #[validate(
        length(
            min = 1,
            max = 200,
            message = "Impact must be between 1 and 200 characters"
        ),
        custom(function = validate_plain_text)
    )]
    pub impact: String,
    #[validate(range(min = 0, message = "Points must be non-negative"))]
    pub points: i64,
}
