// src/store/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions, types::Json};

use crate::{
    error::AppError,
    models::{
        eco_action::{EcoAction, NewEcoAction},
        module::{Module, ModuleFilter, NewModule, Question},
        progress::{ModuleSummary, Progress, ProgressEntry},
        user::{NewUser, Role, User},
    },
    store::{DUPLICATE_EMAIL, Store, Submission},
    utils::gamification::{self, Outcome, UserStanding},
};

const CONNECT_ATTEMPTS: u32 = 5;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, points, level, badges, streak, \
                            avatar, parent_id, created_at";

const MODULE_COLUMNS: &str = "id, title, description, category, difficulty, module_type, points, \
                              estimated_time, icon, questions, created_at";

const PROGRESS_COLUMNS: &str = "id, user_id, module_id, score, completed, answers, points_earned, \
                                eco_actions, badges_earned, time_spent, created_at";

const ECO_ACTION_COLUMNS: &str =
    "id, user_id, title, description, impact, points, completed, completed_at, created_at";

/// Raw 'users' row; enum columns are stored as text.
#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    points: i64,
    level: i64,
    badges: Vec<String>,
    streak: i64,
    avatar: Option<String>,
    parent_id: Option<i64>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(AppError::InternalServerError)?,
            points: row.points,
            level: row.level,
            badges: row.badges,
            streak: row.streak,
            avatar: row.avatar,
            parent_id: row.parent_id,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ModuleRow {
    id: i64,
    title: String,
    description: String,
    category: String,
    difficulty: String,
    module_type: String,
    points: i64,
    estimated_time: String,
    icon: String,
    questions: Json<Vec<Question>>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ModuleRow> for Module {
    type Error = AppError;

    fn try_from(row: ModuleRow) -> Result<Self, Self::Error> {
        Ok(Module {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            difficulty: row.difficulty.parse().map_err(AppError::InternalServerError)?,
            module_type: row.module_type.parse().map_err(AppError::InternalServerError)?,
            points: row.points,
            estimated_time: row.estimated_time,
            icon: row.icon,
            questions: row.questions.0,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ProgressRow {
    id: i64,
    user_id: i64,
    module_id: i64,
    score: i32,
    completed: bool,
    answers: Vec<i32>,
    points_earned: i64,
    eco_actions: i32,
    badges_earned: Vec<String>,
    time_spent: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProgressRow> for Progress {
    fn from(row: ProgressRow) -> Self {
        Progress {
            id: row.id,
            user_id: row.user_id,
            module_id: row.module_id,
            score: row.score,
            completed: row.completed,
            answers: row.answers,
            points_earned: row.points_earned,
            eco_actions: row.eco_actions,
            badges_earned: row.badges_earned,
            time_spent: row.time_spent,
            created_at: row.created_at,
        }
    }
}

/// Progress row joined with the module columns history views need.
#[derive(FromRow)]
struct ProgressEntryRow {
    #[sqlx(flatten)]
    progress: ProgressRow,
    module_title: String,
    module_category: String,
    module_difficulty: String,
    module_points: i64,
}

impl TryFrom<ProgressEntryRow> for ProgressEntry {
    type Error = AppError;

    fn try_from(row: ProgressEntryRow) -> Result<Self, Self::Error> {
        Ok(ProgressEntry {
            module: ModuleSummary {
                id: row.progress.module_id,
                title: row.module_title,
                category: row.module_category,
                difficulty: row
                    .module_difficulty
                    .parse()
                    .map_err(AppError::InternalServerError)?,
                points: row.module_points,
            },
            progress: row.progress.into(),
        })
    }
}

#[derive(FromRow)]
struct EcoActionRow {
    id: i64,
    user_id: i64,
    title: String,
    description: String,
    impact: String,
    points: i64,
    completed: bool,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<EcoActionRow> for EcoAction {
    fn from(row: EcoActionRow) -> Self {
        EcoAction {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            impact: row.impact,
            points: row.points,
            completed: row.completed,
            completed_at: row.completed_at,
            created_at: row.created_at,
        }
    }
}

fn users_from(rows: Vec<UserRow>) -> Result<Vec<User>, AppError> {
    rows.into_iter().map(User::try_from).collect()
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with a small retry loop so the server can start alongside its database.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let mut retry_count = 0;
        loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => return Ok(Self::new(pool)),
                Err(e) => {
                    retry_count += 1;
                    if retry_count >= CONNECT_ATTEMPTS {
                        return Err(e);
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, points, level, badges, streak, parent_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(new.points)
        .bind(new.level)
        .bind(&new.badges)
        .bind(new.streak)
        .bind(new.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::BadRequest(DUPLICATE_EMAIL.to_string())
            }
            other => {
                tracing::error!("Failed to register user: {:?}", other);
                AppError::from(other)
            }
        })?;

        row.try_into()
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY id"
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;

        users_from(rows)
    }

    async fn list_children(&self, parent_id: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE parent_id = $1 AND role = 'student' ORDER BY id"
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        users_from(rows)
    }

    async fn top_users(&self, role: Role, limit: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE role = $1
            ORDER BY points DESC, id ASC
            LIMIT $2
            "#
        ))
        .bind(role.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch leaderboard: {:?}", e);
            AppError::from(e)
        })?;

        users_from(rows)
    }

    async fn rank_counts(&self, role: Role, points: i64) -> Result<(i64, i64), AppError> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE points > $2),
                COUNT(*)
            FROM users
            WHERE role = $1
            "#,
        )
        .bind(role.as_str())
        .bind(points)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn list_modules(&self, filter: &ModuleFilter) -> Result<Vec<Module>, AppError> {
        // Unified query handling optional filters
        let rows = sqlx::query_as::<_, ModuleRow>(&format!(
            r#"
            SELECT {MODULE_COLUMNS}
            FROM modules
            WHERE ($1::TEXT IS NULL OR module_type = $1)
              AND ($2::TEXT IS NULL OR difficulty = $2)
              AND ($3::TEXT IS NULL OR category = $3)
            ORDER BY id
            "#
        ))
        .bind(filter.module_type.map(|t| t.as_str()))
        .bind(filter.difficulty.map(|d| d.as_str()))
        .bind(filter.category.as_deref())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Module::try_from).collect()
    }

    async fn find_module(&self, id: i64) -> Result<Option<Module>, AppError> {
        sqlx::query_as::<_, ModuleRow>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Module::try_from)
        .transpose()
    }

    async fn create_module(&self, new: NewModule) -> Result<Module, AppError> {
        let row = sqlx::query_as::<_, ModuleRow>(&format!(
            r#"
            INSERT INTO modules
                (title, description, category, difficulty, module_type, points, estimated_time, icon, questions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {MODULE_COLUMNS}
            "#
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.difficulty.as_str())
        .bind(new.module_type.as_str())
        .bind(new.points)
        .bind(&new.estimated_time)
        .bind(&new.icon)
        .bind(Json(&new.questions))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn count_modules(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM modules")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn apply_submission(
        &self,
        submission: Submission<'_>,
    ) -> Result<(Outcome, Progress), AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock: a second submission by the same user waits here until we commit.
        let user: User = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(submission.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
        .try_into()?;

        let standing = UserStanding {
            points: user.points,
            badges: user.badges,
            streak: user.streak,
        };
        let outcome = gamification::evaluate(&standing, submission.module, submission.answers);

        sqlx::query(
            r#"
            UPDATE users
            SET points = $1, level = $2, badges = $3, streak = $4, updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(outcome.total_points)
        .bind(outcome.new_level)
        .bind(&outcome.badges)
        .bind(outcome.streak)
        .bind(submission.user_id)
        .execute(&mut *tx)
        .await?;

        let progress = sqlx::query_as::<_, ProgressRow>(&format!(
            r#"
            INSERT INTO progress
                (user_id, module_id, score, completed, answers, points_earned, eco_actions, badges_earned, time_spent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PROGRESS_COLUMNS}
            "#
        ))
        .bind(submission.user_id)
        .bind(submission.module.id)
        .bind(outcome.score)
        .bind(outcome.completed)
        .bind(submission.answers)
        .bind(outcome.points_earned)
        .bind(i32::from(outcome.completed))
        .bind(&outcome.new_badges)
        .bind(submission.time_spent)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit submission: {:?}", e);
            AppError::from(e)
        })?;

        Ok((outcome, progress.into()))
    }

    async fn list_progress(&self, user_id: i64) -> Result<Vec<ProgressEntry>, AppError> {
        let rows = sqlx::query_as::<_, ProgressEntryRow>(
            r#"
            SELECT
                p.id, p.user_id, p.module_id, p.score, p.completed, p.answers, p.points_earned,
                p.eco_actions, p.badges_earned, p.time_spent, p.created_at,
                m.title AS module_title,
                m.category AS module_category,
                m.difficulty AS module_difficulty,
                m.points AS module_points
            FROM progress p
            JOIN modules m ON m.id = p.module_id
            WHERE p.user_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProgressEntry::try_from).collect()
    }

    async fn list_eco_actions(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<EcoAction>, AppError> {
        let rows = sqlx::query_as::<_, EcoActionRow>(&format!(
            r#"
            SELECT {ECO_ACTION_COLUMNS}
            FROM eco_actions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EcoAction::from).collect())
    }

    async fn create_eco_action(&self, new: NewEcoAction) -> Result<EcoAction, AppError> {
        let row = sqlx::query_as::<_, EcoActionRow>(&format!(
            r#"
            INSERT INTO eco_actions (user_id, title, description, impact, points)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ECO_ACTION_COLUMNS}
            "#
        ))
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.impact)
        .bind(new.points)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn complete_eco_action(
        &self,
        user_id: i64,
        action_id: i64,
    ) -> Result<Option<EcoAction>, AppError> {
        let row = sqlx::query_as::<_, EcoActionRow>(&format!(
            r#"
            UPDATE eco_actions
            SET completed = TRUE, completed_at = COALESCE(completed_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING {ECO_ACTION_COLUMNS}
            "#
        ))
        .bind(action_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(EcoAction::from))
    }
}
