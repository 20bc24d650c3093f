// src/store/mod.rs

//! Persistence seam. Handlers only talk to `dyn Store`; the backend is picked at startup.

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        eco_action::{EcoAction, NewEcoAction},
        module::{Module, ModuleFilter, NewModule},
        progress::{Progress, ProgressEntry},
        user::{NewUser, Role, User},
    },
    utils::gamification::Outcome,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const DUPLICATE_EMAIL: &str = "User already exists with this email";

/// A scored submission waiting to be applied to a user.
#[derive(Debug, Clone, Copy)]
pub struct Submission<'a> {
    pub user_id: i64,
    pub module: &'a Module,
    pub answers: &'a [i32],
    pub time_spent: i64,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Users
    /// Fails with `BadRequest(DUPLICATE_EMAIL)` if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Users of one role, ordered by id.
    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, AppError>;
    /// Students linked to a parent account, ordered by id.
    async fn list_children(&self, parent_id: i64) -> Result<Vec<User>, AppError>;

    // Leaderboard
    /// Users of `role` ordered by points descending, then id ascending.
    async fn top_users(&self, role: Role, limit: i64) -> Result<Vec<User>, AppError>;
    /// `(users of role with strictly more points, all users of role)`.
    async fn rank_counts(&self, role: Role, points: i64) -> Result<(i64, i64), AppError>;

    // Modules
    async fn list_modules(&self, filter: &ModuleFilter) -> Result<Vec<Module>, AppError>;
    async fn find_module(&self, id: i64) -> Result<Option<Module>, AppError>;
    async fn create_module(&self, module: NewModule) -> Result<Module, AppError>;
    async fn count_modules(&self) -> Result<i64, AppError>;

    // Progress
    /// Scores a submission against the user's current standing and records it.
    ///
    /// The user update and the progress insert happen atomically, with the user
    /// row locked for the duration so concurrent submissions serialize.
    async fn apply_submission(
        &self,
        submission: Submission<'_>,
    ) -> Result<(Outcome, Progress), AppError>;
    /// A user's submissions, newest first, joined with their modules.
    async fn list_progress(&self, user_id: i64) -> Result<Vec<ProgressEntry>, AppError>;

    // Eco actions
    /// A user's eco actions, newest first.
    async fn list_eco_actions(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<EcoAction>, AppError>;
    async fn create_eco_action(&self, action: NewEcoAction) -> Result<EcoAction, AppError>;
    /// Marks an owned action completed. `None` if it does not exist or is someone else's.
    async fn complete_eco_action(
        &self,
        user_id: i64,
        action_id: i64,
    ) -> Result<Option<EcoAction>, AppError>;
}
