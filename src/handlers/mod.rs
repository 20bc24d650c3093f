// src/handlers/mod.rs

use axum::{Json, response::IntoResponse};

use crate::models::ApiResponse;

pub mod auth;
pub mod dashboard;
pub mod eco_action;
pub mod leaderboard;
pub mod modules;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Server is up"))
)]
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::message("OK"))
}
