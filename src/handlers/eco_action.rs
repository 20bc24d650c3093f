// src/handlers/eco_action.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        ApiResponse,
        eco_action::{CreateEcoActionRequest, EcoAction, NewEcoAction},
    },
    store::Store,
    utils::{
        extract::{AppJson, AppPath},
        jwt::Claims,
    },
};

/// Lists the caller's eco actions, newest first.
#[utoipa::path(
    get,
    path = "/api/eco-actions",
    tag = "eco-actions",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Caller's eco actions", body = [EcoAction]))
)]
pub async fn list_eco_actions(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let actions = store.list_eco_actions(claims.user_id()?, None).await?;

    Ok(Json(ApiResponse::ok(
        "Eco actions retrieved successfully",
        actions,
    )))
}

/// Logs a new eco action for the caller. Text is trimmed, checked, and stored verbatim.
#[utoipa::path(
    post,
    path = "/api/eco-actions",
    tag = "eco-actions",
    request_body = CreateEcoActionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Eco action created", body = EcoAction),
        (status = 400, description = "Validation failed"),
    )
)]
pub async fn create_eco_action(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateEcoActionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = CreateEcoActionRequest {
        title: payload.title.trim().to_string(),
        description: payload.description.trim().to_string(),
        impact: payload.impact.trim().to_string(),
        points: payload.points,
    };
    payload.validate()?;

    let action = store
        .create_eco_action(NewEcoAction {
            user_id: claims.user_id()?,
            title: payload.title,
            description: payload.description,
            impact: payload.impact,
            points: payload.points,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Eco action created successfully", action)),
    ))
}

/// Marks one of the caller's eco actions completed. Completing twice keeps the first date.
#[utoipa::path(
    post,
    path = "/api/eco-actions/{id}/complete",
    tag = "eco-actions",
    params(("id" = i64, Path, description = "Eco action id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Eco action completed", body = EcoAction),
        (status = 404, description = "Eco action not found"),
    )
)]
pub async fn complete_eco_action(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let action = store
        .complete_eco_action(claims.user_id()?, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Eco action not found".to_string()))?;

    Ok(Json(ApiResponse::ok("Eco action completed", action)))
}
