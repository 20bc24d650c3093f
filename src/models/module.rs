// src/models/module.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("Unknown difficulty '{}'", other)),
        }
    }
}

/// What kind of activity a module is. Some types carry their own badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleType {
    Quiz,
    Challenge,
    Simulation,
    EcoMission,
}

impl ModuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Quiz => "quiz",
            ModuleType::Challenge => "challenge",
            ModuleType::Simulation => "simulation",
            ModuleType::EcoMission => "eco-mission",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiz" => Ok(ModuleType::Quiz),
            "challenge" => Ok(ModuleType::Challenge),
            "simulation" => Ok(ModuleType::Simulation),
            "eco-mission" => Ok(ModuleType::EcoMission),
            other => Err(format!("Unknown module type '{}'", other)),
        }
    }
}

/// A single multiple-choice question, answer key included.
/// Stored as a JSON array on the module row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_text: String,
    pub choices: Vec<String>,
    pub correct_answer_index: i32,
    pub explanation: String,
}

/// Represents the 'modules' table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub module_type: ModuleType,

    /// Reward for a perfect score; scaled by the score on submission.
    pub points: i64,

    pub estimated_time: String,
    pub icon: String,
    pub questions: Vec<Question>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for catalog seeding.
#[derive(Debug, Clone)]
pub struct NewModule {
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub module_type: ModuleType,
    pub points: i64,
    pub estimated_time: String,
    pub icon: String,
    pub questions: Vec<Question>,
}

/// DTO for sending a question to the client (excludes answer and explanation).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub question_text: String,
    pub choices: Vec<String>,
}

/// Module as seen by clients before submitting.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicModule {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub module_type: ModuleType,
    pub points: i64,
    pub estimated_time: String,
    pub icon: String,
    pub questions: Vec<PublicQuestion>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Module> for PublicModule {
    fn from(module: Module) -> Self {
        Self {
            id: module.id,
            title: module.title,
            description: module.description,
            category: module.category,
            difficulty: module.difficulty,
            module_type: module.module_type,
            points: module.points,
            estimated_time: module.estimated_time,
            icon: module.icon,
            questions: module
                .questions
                .into_iter()
                .map(|q| PublicQuestion {
                    question_text: q.question_text,
                    choices: q.choices,
                })
                .collect(),
            created_at: module.created_at,
        }
    }
}

/// Query parameters for listing modules. Every filter is an exact match.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModuleListParams {
    #[serde(rename = "type")]
    pub module_type: Option<String>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
}

/// Parsed catalog filter handed to the store.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ModuleFilter {
    pub module_type: Option<ModuleType>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
}

impl ModuleFilter {
    pub fn matches(&self, module: &Module) -> bool {
        self.module_type.is_none_or(|t| t == module.module_type)
            && self.difficulty.is_none_or(|d| d == module.difficulty)
            && self.category.as_deref().is_none_or(|c| c == module.category)
    }
}

impl TryFrom<ModuleListParams> for ModuleFilter {
    type Error = String;

    fn try_from(params: ModuleListParams) -> Result<Self, Self::Error> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        Ok(Self {
            module_type: non_empty(params.module_type)
                .map(|t| t.parse())
                .transpose()?,
            difficulty: non_empty(params.difficulty)
                .map(|d| d.parse())
                .transpose()?,
            category: non_empty(params.category),
        })
    }
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    /// Chosen choice index per question, in question order.
    #[validate(
        length(min = 1, message = "Answers must be a non-empty array"),
        custom(function = validate_answers)
    )]
    pub answers: Vec<i32>,

    /// Seconds spent on the attempt.
    #[validate(range(min = 0, message = "Time spent must be a non-negative integer"))]
    pub time_spent: i64,
}

fn validate_answers(answers: &[i32]) -> Result<(), validator::ValidationError> {
    if answers.iter().any(|a| *a < 0) {
        return Err(validator::ValidationError::new("negative_answer")
            .with_message("Each answer must be a non-negative integer".into()));
    }
    Ok(())
}

/// Result of a scored submission, as returned to the client.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub score: i32,
    pub completed: bool,
    pub points_earned: i64,
    pub new_badges: Vec<String>,
    pub total_points: i64,
    pub new_level: i64,
    pub streak: i64,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub explanations: Vec<String>,
}
