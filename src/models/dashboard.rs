// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{
    eco_action::EcoAction, module::PublicModule, progress::ProgressEntry, user::User,
};

/// Role-specific dashboard payload. The `role` tag tells clients which shape they got.
#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Student(StudentDashboard),
    Teacher(TeacherDashboard),
    Parent(ParentDashboard),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub total_modules: usize,
    pub completed_modules: usize,
    pub average_score: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboard {
    pub user: User,
    pub recommended_modules: Vec<PublicModule>,
    pub eco_actions: Vec<EcoAction>,
    /// Submissions per UTC day over the last seven days, oldest first.
    pub weekly_activity: Vec<i64>,
    pub recent_achievements: Vec<ProgressEntry>,
    pub stats: StudentStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub total_students: usize,
    /// Students with at least one submission since UTC midnight.
    pub active_today: usize,
    pub average_score: i64,
    /// Percentage of all submissions that passed.
    pub completion_rate: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Excellent,
    Good,
    #[serde(rename = "needs attention")]
    NeedsAttention,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgressSummary {
    pub id: i64,
    pub name: String,
    pub level: i64,
    pub points: i64,
    /// Submissions in the last seven days.
    pub weekly_activity: i64,
    pub status: StudentStatus,
    pub modules_completed: usize,
    pub average_score: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Achievement {
    pub student: String,
    pub badge: String,
    pub time: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDashboard {
    pub class_stats: ClassStats,
    pub student_progress: Vec<StudentProgressSummary>,
    pub recent_achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentModule {
    pub name: String,
    pub score: i32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub time_spent: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentEcoAction {
    pub action: String,
    pub points: i64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChildSummary {
    pub id: i64,
    pub name: String,
    pub level: i64,
    pub points: i64,
    pub streak: i64,
    pub weekly_goal: i64,
    /// Passing submissions in the last seven days.
    pub weekly_progress: i64,
    /// Seconds spent across all submissions.
    pub total_time_spent: i64,
    pub modules_completed: usize,
    pub average_score: i64,
    pub recent_badges: Vec<String>,
    pub weekly_activity: Vec<i64>,
    pub recent_modules: Vec<RecentModule>,
    pub eco_actions: Vec<RecentEcoAction>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParentDashboard {
    pub children: Vec<ChildSummary>,
}
