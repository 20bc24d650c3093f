// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    docs,
    error::AppError,
    handlers::{self, auth, dashboard, eco_action, leaderboard, modules},
    state::AppState,
    utils::jwt::auth_middleware,
};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Everything except registration, login, health and the API document requires a bearer token.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store and config).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/profile", get(auth::profile))
                .route_layer(require_auth.clone()),
        );

    let module_routes = Router::new()
        .route("/", get(modules::list_modules))
        .route("/user/progress", get(modules::get_user_progress))
        .route("/{id}", get(modules::get_module))
        .route("/{id}/submit", post(modules::submit_quiz))
        .route_layer(require_auth.clone());

    let leaderboard_routes = Router::new()
        .route("/", get(leaderboard::get_leaderboard))
        .route("/rank/{user_id}", get(leaderboard::get_user_rank))
        .route_layer(require_auth.clone());

    let dashboard_routes = Router::new()
        .route("/", get(dashboard::get_dashboard))
        .route_layer(require_auth.clone());

    let eco_action_routes = Router::new()
        .route(
            "/",
            get(eco_action::list_eco_actions).post(eco_action::create_eco_action),
        )
        .route("/{id}/complete", post(eco_action::complete_eco_action))
        .route_layer(require_auth);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .nest("/api/auth", auth_routes)
        .nest("/api/modules", module_routes)
        .nest("/api/leaderboard", leaderboard_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/eco-actions", eco_action_routes)
        .fallback(|| async { AppError::NotFound("Route not found".to_string()) })
        // Global Middleware (applied from top to bottom)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
