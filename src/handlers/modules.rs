// src/handlers/modules.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        ApiResponse,
        module::{ModuleFilter, ModuleListParams, PublicModule, SubmissionResult, SubmitQuizRequest},
        progress::{ProgressHistory, ProgressStats},
    },
    store::{Store, Submission},
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        gamification,
        jwt::Claims,
    },
};

/// Lists the module catalog, optionally filtered by type, difficulty and category.
///
/// Answer keys and explanations are stripped.
#[utoipa::path(
    get,
    path = "/api/modules",
    tag = "modules",
    params(ModuleListParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Matching modules", body = [PublicModule]),
        (status = 400, description = "Unknown filter value"),
    )
)]
pub async fn list_modules(
    State(store): State<Arc<dyn Store>>,
    AppQuery(params): AppQuery<ModuleListParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = ModuleFilter::try_from(params).map_err(AppError::BadRequest)?;

    let modules: Vec<PublicModule> = store
        .list_modules(&filter)
        .await?
        .into_iter()
        .map(PublicModule::from)
        .collect();

    Ok(Json(ApiResponse::ok(
        "Modules retrieved successfully",
        modules,
    )))
}

/// Fetches one module with its questions, without answer keys.
#[utoipa::path(
    get,
    path = "/api/modules/{id}",
    tag = "modules",
    params(("id" = i64, Path, description = "Module id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Module found", body = PublicModule),
        (status = 404, description = "Module not found"),
    )
)]
pub async fn get_module(
    State(store): State<Arc<dyn Store>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let module = store
        .find_module(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Module not found".to_string()))?;

    Ok(Json(ApiResponse::ok(
        "Module retrieved successfully",
        PublicModule::from(module),
    )))
}

/// Scores a quiz attempt and applies points, level, badges and streak to the caller.
///
/// * One answer per question, in question order.
/// * The user update and the progress record are written together.
/// * Explanations are revealed in the response.
#[utoipa::path(
    post,
    path = "/api/modules/{id}/submit",
    tag = "modules",
    params(("id" = i64, Path, description = "Module id")),
    request_body = SubmitQuizRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Submission scored", body = SubmissionResult),
        (status = 400, description = "Invalid answers"),
        (status = 404, description = "Module or user not found"),
    )
)]
pub async fn submit_quiz(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let module = store
        .find_module(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Module not found".to_string()))?;

    gamification::check_submission(&module, &payload.answers)?;

    let (outcome, _progress) = store
        .apply_submission(Submission {
            user_id,
            module: &module,
            answers: &payload.answers,
            time_spent: payload.time_spent,
        })
        .await?;

    tracing::info!(
        "User {} scored {} on module {} (+{} points)",
        user_id,
        outcome.score,
        module.id,
        outcome.points_earned
    );

    let result = SubmissionResult {
        score: outcome.score,
        completed: outcome.completed,
        points_earned: outcome.points_earned,
        new_badges: outcome.new_badges,
        total_points: outcome.total_points,
        new_level: outcome.new_level,
        streak: outcome.streak,
        correct_answers: outcome.correct_answers,
        total_questions: outcome.total_questions,
        explanations: module.questions.into_iter().map(|q| q.explanation).collect(),
    };

    Ok(Json(ApiResponse::ok("Quiz submitted successfully", result)))
}

/// Returns the caller's submission history (newest first) with aggregate stats.
#[utoipa::path(
    get,
    path = "/api/modules/user/progress",
    tag = "modules",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Progress history", body = ProgressHistory),
    )
)]
pub async fn get_user_progress(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let progress = store.list_progress(claims.user_id()?).await?;
    let stats = ProgressStats::from_entries(&progress);

    Ok(Json(ApiResponse::ok(
        "Progress retrieved successfully",
        ProgressHistory { progress, stats },
    )))
}
