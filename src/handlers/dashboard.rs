// src/handlers/dashboard.rs

use std::{collections::HashSet, sync::Arc};

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{
        ApiResponse,
        dashboard::{
            Achievement, ChildSummary, ClassStats, Dashboard, ParentDashboard, RecentEcoAction,
            RecentModule, StudentDashboard, StudentProgressSummary, StudentStats, StudentStatus,
            TeacherDashboard,
        },
        module::{ModuleFilter, PublicModule},
        progress::{ProgressEntry, average_score},
        user::{Role, User},
    },
    store::Store,
    utils::{gamification::score_percent, jwt::Claims},
};

const ACTIVITY_DAYS: usize = 7;
const RECOMMENDED_MODULES: usize = 6;
const STUDENT_ECO_ACTIONS: i64 = 5;
const STUDENT_RECENT_ACHIEVEMENTS: usize = 3;
const TEACHER_RECENT_ACHIEVEMENTS: usize = 5;
const CHILD_WEEKLY_GOAL: i64 = 5;
const CHILD_RECENT_ITEMS: usize = 3;

/// Days between the submission's UTC date and `now`'s (0 = today).
fn age_in_days(entry: &ProgressEntry, now: DateTime<Utc>) -> i64 {
    (now.date_naive() - entry.progress.created_at.date_naive()).num_days()
}

fn within_week(entry: &ProgressEntry, now: DateTime<Utc>) -> bool {
    (0..ACTIVITY_DAYS as i64).contains(&age_in_days(entry, now))
}

/// Submissions per UTC day for the last seven days, oldest first, ending today.
pub fn daily_activity(entries: &[ProgressEntry], now: DateTime<Utc>) -> Vec<i64> {
    let mut days = vec![0; ACTIVITY_DAYS];
    for entry in entries.iter().filter(|e| within_week(e, now)) {
        let age = age_in_days(entry, now) as usize;
        days[ACTIVITY_DAYS - 1 - age] += 1;
    }
    days
}

pub fn student_status(points: i64) -> StudentStatus {
    if points > 2000 {
        StudentStatus::Excellent
    } else if points > 1000 {
        StudentStatus::Good
    } else {
        StudentStatus::NeedsAttention
    }
}

fn completed_count(entries: &[ProgressEntry]) -> usize {
    entries.iter().filter(|e| e.progress.completed).count()
}

fn scores(entries: &[ProgressEntry]) -> impl Iterator<Item = i32> + '_ {
    entries.iter().map(|e| e.progress.score)
}

/// Returns the dashboard for the caller's role.
///
/// The role is read from the stored account, not the token.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Role-specific dashboard, tagged by `role`"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn get_dashboard(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = store
        .find_user(claims.user_id()?)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let now = Utc::now();

    let (message, dashboard) = match user.role {
        Role::Student => (
            "Student dashboard data retrieved successfully",
            Dashboard::Student(student_dashboard(store.as_ref(), user, now).await?),
        ),
        Role::Teacher => (
            "Teacher dashboard data retrieved successfully",
            Dashboard::Teacher(teacher_dashboard(store.as_ref(), now).await?),
        ),
        Role::Parent => (
            "Parent dashboard data retrieved successfully",
            Dashboard::Parent(parent_dashboard(store.as_ref(), user.id, now).await?),
        ),
    };

    Ok(Json(ApiResponse::ok(message, dashboard)))
}

async fn student_dashboard(
    store: &dyn Store,
    user: User,
    now: DateTime<Utc>,
) -> Result<StudentDashboard, AppError> {
    let progress = store.list_progress(user.id).await?;
    let completed: HashSet<i64> = progress
        .iter()
        .filter(|e| e.progress.completed)
        .map(|e| e.progress.module_id)
        .collect();

    let recommended_modules = store
        .list_modules(&ModuleFilter::default())
        .await?
        .into_iter()
        .filter(|m| !completed.contains(&m.id))
        .take(RECOMMENDED_MODULES)
        .map(PublicModule::from)
        .collect();

    let eco_actions = store
        .list_eco_actions(user.id, Some(STUDENT_ECO_ACTIONS))
        .await?;

    let stats = StudentStats {
        total_modules: progress.len(),
        completed_modules: completed_count(&progress),
        average_score: average_score(scores(&progress)),
    };

    Ok(StudentDashboard {
        user,
        recommended_modules,
        eco_actions,
        weekly_activity: daily_activity(&progress, now),
        recent_achievements: progress
            .into_iter()
            .take(STUDENT_RECENT_ACHIEVEMENTS)
            .collect(),
        stats,
    })
}

async fn teacher_dashboard(
    store: &dyn Store,
    now: DateTime<Utc>,
) -> Result<TeacherDashboard, AppError> {
    let students = store.list_users_by_role(Role::Student).await?;

    let mut student_progress = Vec::with_capacity(students.len());
    let mut recent_achievements = Vec::new();
    let mut all_scores = Vec::new();
    let mut passed = 0;
    let mut active_today = 0;

    for student in students {
        let progress = store.list_progress(student.id).await?;

        if progress.iter().any(|e| age_in_days(e, now) == 0) {
            active_today += 1;
        }
        all_scores.extend(scores(&progress));
        passed += completed_count(&progress);

        recent_achievements.extend(progress.iter().filter_map(|e| {
            e.progress.badges_earned.first().map(|badge| Achievement {
                student: student.name.clone(),
                badge: badge.clone(),
                time: e.progress.created_at,
            })
        }));

        student_progress.push(StudentProgressSummary {
            id: student.id,
            name: student.name,
            level: student.level,
            points: student.points,
            weekly_activity: daily_activity(&progress, now).iter().sum(),
            status: student_status(student.points),
            modules_completed: completed_count(&progress),
            average_score: average_score(scores(&progress)),
        });
    }

    recent_achievements.sort_by(|a, b| b.time.cmp(&a.time));
    recent_achievements.truncate(TEACHER_RECENT_ACHIEVEMENTS);

    let class_stats = ClassStats {
        total_students: student_progress.len(),
        active_today,
        average_score: average_score(all_scores.iter().copied()),
        completion_rate: i64::from(score_percent(passed as i32, all_scores.len() as i32)),
    };

    Ok(TeacherDashboard {
        class_stats,
        student_progress,
        recent_achievements,
    })
}

async fn parent_dashboard(
    store: &dyn Store,
    parent_id: i64,
    now: DateTime<Utc>,
) -> Result<ParentDashboard, AppError> {
    let mut children = Vec::new();

    for child in store.list_children(parent_id).await? {
        let progress = store.list_progress(child.id).await?;
        let eco_actions = store
            .list_eco_actions(child.id, Some(CHILD_RECENT_ITEMS as i64))
            .await?;

        let recent_badges = child
            .badges
            .iter()
            .rev()
            .take(CHILD_RECENT_ITEMS)
            .rev()
            .cloned()
            .collect();

        children.push(ChildSummary {
            id: child.id,
            name: child.name,
            level: child.level,
            points: child.points,
            streak: child.streak,
            weekly_goal: CHILD_WEEKLY_GOAL,
            weekly_progress: progress
                .iter()
                .filter(|e| e.progress.completed && within_week(e, now))
                .count() as i64,
            total_time_spent: progress.iter().map(|e| e.progress.time_spent).sum(),
            modules_completed: completed_count(&progress),
            average_score: average_score(scores(&progress)),
            recent_badges,
            weekly_activity: daily_activity(&progress, now),
            recent_modules: progress
                .iter()
                .take(CHILD_RECENT_ITEMS)
                .map(|e| RecentModule {
                    name: e.module.title.clone(),
                    score: e.progress.score,
                    completed_at: e.progress.created_at,
                    time_spent: e.progress.time_spent,
                })
                .collect(),
            eco_actions: eco_actions
                .into_iter()
                .map(|a| RecentEcoAction {
                    action: a.title,
                    points: a.points,
                    completed_at: a.completed_at,
                })
                .collect(),
        });
    }

    Ok(ParentDashboard { children })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::models::{
        module::Difficulty,
        progress::{ModuleSummary, Progress},
    };

    fn entry_at(created_at: DateTime<Utc>, completed: bool) -> ProgressEntry {
        ProgressEntry {
            progress: Progress {
                id: 1,
                user_id: 1,
                module_id: 1,
                score: if completed { 80 } else { 20 },
                completed,
                answers: vec![1],
                points_earned: 0,
                eco_actions: i32::from(completed),
                badges_earned: vec![],
                time_spent: 60,
                created_at,
            },
            module: ModuleSummary {
                id: 1,
                title: "Ocean Pollution Crisis".into(),
                category: "Marine Biology".into(),
                difficulty: Difficulty::Beginner,
                points: 150,
            },
        }
    }

    #[test]
    fn daily_activity_buckets_by_utc_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 30, 0).unwrap();
        let entries = vec![
            entry_at(now, true),
            // Late yesterday still counts as yesterday.
            entry_at(now - Duration::minutes(45), false),
            entry_at(now - Duration::days(6), true),
            entry_at(now - Duration::days(7), true),
            entry_at(now + Duration::days(1), true),
        ];

        assert_eq!(daily_activity(&entries, now), vec![1, 0, 0, 0, 0, 1, 1]);
        assert_eq!(daily_activity(&[], now), vec![0; 7]);
    }

    #[test]
    fn status_thresholds_are_strict() {
        assert_eq!(student_status(2001), StudentStatus::Excellent);
        assert_eq!(student_status(2000), StudentStatus::Good);
        assert_eq!(student_status(1001), StudentStatus::Good);
        assert_eq!(student_status(1000), StudentStatus::NeedsAttention);
        assert_eq!(
            serde_json::to_value(StudentStatus::NeedsAttention).unwrap(),
            "needs attention"
        );
    }
}
