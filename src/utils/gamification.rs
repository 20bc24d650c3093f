// src/utils/gamification.rs

//! Quiz scoring and the points/level/badge/streak rules applied on every submission.
//!
//! Everything here is pure. Stores call [`evaluate`] on a user snapshot taken under
//! their submission lock, then persist the returned [`Outcome`].

use crate::{
    error::AppError,
    models::module::{Module, ModuleType},
};

/// Minimum score (percent) for a submission to count as completed.
pub const PASSING_SCORE: i32 = 60;

/// Points needed per level.
pub const POINTS_PER_LEVEL: i64 = 500;

/// Points granted to a student at registration.
pub const STUDENT_WELCOME_POINTS: i64 = 100;

pub const WELCOME_BADGE: &str = "Welcome";

/// Integer division rounding .5 upward. Both operands must be non-negative.
fn round_half_up(numerator: i64, denominator: i64) -> i64 {
    (2 * numerator + denominator) / (2 * denominator)
}

/// Percentage score, `round(100 * correct / total)`.
pub fn score_percent(correct: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    round_half_up(100 * correct as i64, total as i64) as i32
}

/// Reward scaled by the score, `round(reward * score / 100)`.
pub fn points_earned(reward: i64, score: i32) -> i64 {
    round_half_up(reward.max(0) * score as i64, 100)
}

pub fn level_for_points(points: i64) -> i64 {
    points.max(0) / POINTS_PER_LEVEL + 1
}

pub fn next_streak(current: i64, completed: bool) -> i64 {
    if completed { current + 1 } else { 0 }
}

/// Badges earned by one submission.
///
/// Score tiers are exclusive (only the highest applies); type and streak badges stack.
pub fn calculate_badges(score: i32, module_type: ModuleType, streak: i64) -> Vec<String> {
    let mut badges = Vec::new();

    if score == 100 {
        badges.push("Perfect Score");
    } else if score >= 90 {
        badges.push("Excellence");
    } else if score >= 80 {
        badges.push("Great Job");
    }

    match module_type {
        ModuleType::Quiz if score >= 85 => badges.push("Quiz Master"),
        ModuleType::EcoMission if score >= 80 => badges.push("Eco Warrior"),
        ModuleType::Challenge if score >= 85 => badges.push("Challenge Champion"),
        _ => {}
    }

    if streak >= 7 {
        badges.push("Week Warrior");
    }
    if streak >= 30 {
        badges.push("Monthly Master");
    }

    badges.into_iter().map(str::to_string).collect()
}

/// Set union of held and new badges. Keeps the held order and appends unseen ones.
pub fn merge_badges(held: &[String], earned: &[String]) -> Vec<String> {
    let mut merged = Vec::with_capacity(held.len() + earned.len());
    for badge in held.iter().chain(earned) {
        if !merged.contains(badge) {
            merged.push(badge.clone());
        }
    }
    merged
}

/// Rejects submissions that cannot be scored against this module.
pub fn check_submission(module: &Module, answers: &[i32]) -> Result<(), AppError> {
    if module.questions.is_empty() {
        return Err(AppError::BadRequest(
            "Module has no questions to answer".to_string(),
        ));
    }
    if answers.len() != module.questions.len() {
        return Err(AppError::BadRequest(format!(
            "Expected {} answers, got {}",
            module.questions.len(),
            answers.len()
        )));
    }
    Ok(())
}

/// The parts of a user record the rules read.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStanding {
    pub points: i64,
    pub badges: Vec<String>,
    pub streak: i64,
}

/// Everything a submission changes, computed before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub correct_answers: i32,
    pub total_questions: i32,
    pub score: i32,
    pub completed: bool,
    pub points_earned: i64,
    /// Badges earned by this submission alone.
    pub new_badges: Vec<String>,
    /// The user's full badge set afterwards.
    pub badges: Vec<String>,
    pub total_points: i64,
    pub new_level: i64,
    pub streak: i64,
}

/// Scores `answers` against `module` and derives the user's next standing.
///
/// Streak badges look at the streak held before this submission.
/// Callers must run [`check_submission`] first.
pub fn evaluate(standing: &UserStanding, module: &Module, answers: &[i32]) -> Outcome {
    let total_questions = module.questions.len() as i32;
    let correct_answers = answers
        .iter()
        .zip(&module.questions)
        .filter(|(answer, question)| **answer == question.correct_answer_index)
        .count() as i32;

    let score = score_percent(correct_answers, total_questions);
    let completed = score >= PASSING_SCORE;
    let points_earned = points_earned(module.points, score);

    let new_badges = calculate_badges(score, module.module_type, standing.streak);
    let badges = merge_badges(&standing.badges, &new_badges);

    let total_points = standing.points + points_earned;

    Outcome {
        correct_answers,
        total_questions,
        score,
        completed,
        points_earned,
        new_badges,
        badges,
        total_points,
        new_level: level_for_points(total_points),
        streak: next_streak(standing.streak, completed),
    }
}
