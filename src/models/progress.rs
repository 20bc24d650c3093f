// src/models/progress.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::module::Difficulty;

/// Represents the 'progress' table.
/// One immutable row per quiz submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub id: i64,
    pub user_id: i64,
    pub module_id: i64,
    pub score: i32,
    pub completed: bool,
    pub answers: Vec<i32>,
    pub points_earned: i64,
    pub eco_actions: i32,
    pub badges_earned: Vec<String>,
    pub time_spent: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Module columns joined onto a progress row for history views.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    #[serde(flatten)]
    pub progress: Progress,
    pub module: ModuleSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_modules: usize,
    pub completed_modules: usize,
    pub average_score: i64,
    pub total_time_spent: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressHistory {
    pub progress: Vec<ProgressEntry>,
    pub stats: ProgressStats,
}

/// Round-half-up mean of `scores`; 0 when there are none.
pub fn average_score(scores: impl IntoIterator<Item = i32>) -> i64 {
    let (sum, count) = scores
        .into_iter()
        .fold((0i64, 0i64), |(sum, count), score| (sum + i64::from(score), count + 1));
    if count == 0 {
        return 0;
    }
    (2 * sum + count) / (2 * count)
}

impl ProgressStats {
    pub fn from_entries(entries: &[ProgressEntry]) -> Self {
        Self {
            total_modules: entries.len(),
            completed_modules: entries.iter().filter(|e| e.progress.completed).count(),
            average_score: average_score(entries.iter().map(|e| e.progress.score)),
            total_time_spent: entries.iter().map(|e| e.progress.time_spent).sum(),
        }
    }
}
