// src/handlers/auth.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        ApiResponse,
        user::{AuthPayload, LoginRequest, NewUser, RegisterRequest, Role, normalize_email},
    },
    store::Store,
    utils::{
        extract::AppJson,
        gamification::{STUDENT_WELCOME_POINTS, WELCOME_BADGE, level_for_points},
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
    },
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Students start with the welcome bonus and badge, and may link a parent account.
/// Returns 201 Created with a token and the user (excluding password).
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthPayload),
        (status = 400, description = "Validation failed or email already registered"),
    )
)]
pub async fn register(
    State(store): State<Arc<dyn Store>>,
    State(config): State<Config>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.name = payload.name.trim().to_string();
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    let role: Role = payload.role.parse().map_err(AppError::BadRequest)?;

    let parent_id = match (role, payload.parent_email.as_deref()) {
        (Role::Student, Some(parent_email)) => {
            let parent = store
                .find_user_by_email(&normalize_email(parent_email))
                .await?
                .filter(|u| u.role == Role::Parent)
                .ok_or_else(|| AppError::BadRequest("Parent account not found".to_string()))?;
            Some(parent.id)
        }
        (Role::Teacher | Role::Parent, Some(_)) => {
            return Err(AppError::BadRequest(
                "Only students can be linked to a parent".to_string(),
            ));
        }
        (_, None) => None,
    };

    let (points, badges) = match role {
        Role::Student => (STUDENT_WELCOME_POINTS, vec![WELCOME_BADGE.to_string()]),
        Role::Teacher | Role::Parent => (0, Vec::new()),
    };

    let password_hash = hash_password(&payload.password)?;

    let user = store
        .create_user(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            role,
            points,
            level: level_for_points(points),
            badges,
            streak: 0,
            parent_id,
        })
        .await?;

    let token = sign_jwt(user.id, user.role, &config.jwt_secret, config.jwt_expiration)?;

    tracing::info!("Registered {} account {}", user.role, user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "User registered successfully",
            AuthPayload { token, user },
        )),
    ))
}

/// Authenticates a user and returns a JWT token.
///
/// Unknown emails and wrong passwords get the same 401 so callers cannot probe
/// which accounts exist.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthPayload),
        (status = 401, description = "Invalid email or password"),
    )
)]
pub async fn login(
    State(store): State<Arc<dyn Store>>,
    State(config): State<Config>,
    AppJson(mut payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    let user = store
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
    }

    let token = sign_jwt(user.id, user.role, &config.jwt_secret, config.jwt_expiration)?;

    tracing::info!("User {} logged in", user.id);

    Ok(Json(ApiResponse::ok(
        "Login successful",
        AuthPayload { token, user },
    )))
}

/// Returns the caller's own account.
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = crate::models::user::User),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn profile(
    State(store): State<Arc<dyn Store>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = store
        .find_user(claims.user_id()?)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::ok("Profile retrieved successfully", user)))
}
