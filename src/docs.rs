// src/docs.rs

use axum::{Json, response::IntoResponse};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers,
    models::{
        dashboard::{
            Achievement, ChildSummary, ClassStats, ParentDashboard, RecentEcoAction, RecentModule,
            StudentDashboard, StudentProgressSummary, StudentStats, StudentStatus,
            TeacherDashboard,
        },
        eco_action::{CreateEcoActionRequest, EcoAction},
        leaderboard::{Leaderboard, LeaderboardEntry, RankResponse},
        module::{
            Difficulty, ModuleType, PublicModule, PublicQuestion, SubmissionResult,
            SubmitQuizRequest,
        },
        progress::{ModuleSummary, Progress, ProgressEntry, ProgressHistory, ProgressStats},
        user::{AuthPayload, LoginRequest, RegisterRequest, Role, User},
    },
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Eco Learn API", description = "Gamified environmental education"),
    paths(
        handlers::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::profile,
        handlers::modules::list_modules,
        handlers::modules::get_module,
        handlers::modules::submit_quiz,
        handlers::modules::get_user_progress,
        handlers::leaderboard::get_leaderboard,
        handlers::leaderboard::get_user_rank,
        handlers::dashboard::get_dashboard,
        handlers::eco_action::list_eco_actions,
        handlers::eco_action::create_eco_action,
        handlers::eco_action::complete_eco_action,
    ),
    components(schemas(
        Role, User, RegisterRequest, LoginRequest, AuthPayload,
        Difficulty, ModuleType, PublicQuestion, PublicModule, SubmitQuizRequest, SubmissionResult,
        Progress, ModuleSummary, ProgressEntry, ProgressStats, ProgressHistory,
        LeaderboardEntry, Leaderboard, RankResponse,
        EcoAction, CreateEcoActionRequest,
        StudentStats, StudentDashboard, ClassStats, StudentStatus, StudentProgressSummary,
        Achievement, TeacherDashboard, RecentModule, RecentEcoAction, ChildSummary,
        ParentDashboard,
    )),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
