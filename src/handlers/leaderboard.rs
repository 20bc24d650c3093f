// src/handlers/leaderboard.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::{
        ApiResponse,
        leaderboard::{
            DEFAULT_LEADERBOARD_LIMIT, Leaderboard, LeaderboardEntry, LeaderboardParams,
            MAX_LEADERBOARD_LIMIT, RankResponse,
        },
        user::Role,
    },
    store::Store,
    utils::extract::{AppPath, AppQuery},
};

/// Ranks users of one role by points (ties by id).
#[utoipa::path(
    get,
    path = "/api/leaderboard",
    tag = "leaderboard",
    params(LeaderboardParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ranked users", body = Leaderboard),
        (status = 400, description = "Unknown role"),
    )
)]
pub async fn get_leaderboard(
    State(store): State<Arc<dyn Store>>,
    AppQuery(params): AppQuery<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);
    let role = match params.role.as_deref().map(str::trim) {
        None | Some("") => Role::Student,
        Some(role) => role.parse().map_err(AppError::BadRequest)?,
    };

    let users = store.top_users(role, limit).await.map_err(|e| {
        tracing::error!("Failed to fetch leaderboard: {:?}", e);
        e
    })?;

    Ok(Json(ApiResponse::ok(
        "Leaderboard retrieved successfully",
        Leaderboard {
            leaderboard: LeaderboardEntry::rank_all(users),
        },
    )))
}

/// Position of one user among users of the same role.
///
/// Rank is one more than the number of peers with strictly more points.
#[utoipa::path(
    get,
    path = "/api/leaderboard/rank/{user_id}",
    tag = "leaderboard",
    params(("user_id" = i64, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User rank", body = RankResponse),
        (status = 404, description = "User not found"),
    )
)]
pub async fn get_user_rank(
    State(store): State<Arc<dyn Store>>,
    AppPath(user_id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let (above, total_users) = store.rank_counts(user.role, user.points).await?;

    Ok(Json(ApiResponse::ok(
        "User rank retrieved successfully",
        RankResponse {
            rank: above + 1,
            total_users,
            points: user.points,
            level: user.level,
        },
    )))
}
