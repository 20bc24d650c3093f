// src/store/memory.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        eco_action::{EcoAction, NewEcoAction},
        module::{Module, ModuleFilter, NewModule},
        progress::{ModuleSummary, Progress, ProgressEntry},
        user::{NewUser, Role, User},
    },
    store::{DUPLICATE_EMAIL, Store, Submission},
    utils::gamification::{self, Outcome, UserStanding},
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    modules: BTreeMap<i64, Module>,
    progress: Vec<Progress>,
    eco_actions: BTreeMap<i64, EcoAction>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn summary(&self, module_id: i64) -> Option<ModuleSummary> {
        self.modules.get(&module_id).map(|m| ModuleSummary {
            id: m.id,
            title: m.title.clone(),
            category: m.category.clone(),
            difficulty: m.difficulty,
            points: m.points,
        })
    }
}

/// Process-local store behind a single `RwLock`.
/// Used with `STORE_BACKEND=memory` and by the HTTP tests; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == new.email) {
            return Err(AppError::BadRequest(DUPLICATE_EMAIL.to_string()));
        }

        let user = User {
            id: tables.next_id(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            points: new.points,
            level: new.level,
            badges: new.badges,
            streak: new.streak,
            avatar: None,
            parent_id: new.parent_id,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().filter(|u| u.role == role).cloned().collect())
    }

    async fn list_children(&self, parent_id: i64) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| u.role == Role::Student && u.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn top_users(&self, role: Role, limit: i64) -> Result<Vec<User>, AppError> {
        let mut users = self.list_users_by_role(role).await?;
        users.sort_by(|a, b| b.points.cmp(&a.points).then(a.id.cmp(&b.id)));
        users.truncate(limit.max(0) as usize);
        Ok(users)
    }

    async fn rank_counts(&self, role: Role, points: i64) -> Result<(i64, i64), AppError> {
        let tables = self.tables.read().await;
        let peers = tables.users.values().filter(|u| u.role == role);
        let (mut above, mut total) = (0, 0);
        for user in peers {
            total += 1;
            if user.points > points {
                above += 1;
            }
        }
        Ok((above, total))
    }

    async fn list_modules(&self, filter: &ModuleFilter) -> Result<Vec<Module>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .modules
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    async fn find_module(&self, id: i64) -> Result<Option<Module>, AppError> {
        Ok(self.tables.read().await.modules.get(&id).cloned())
    }

    async fn create_module(&self, new: NewModule) -> Result<Module, AppError> {
        let mut tables = self.tables.write().await;
        let module = Module {
            id: tables.next_id(),
            title: new.title,
            description: new.description,
            category: new.category,
            difficulty: new.difficulty,
            module_type: new.module_type,
            points: new.points,
            estimated_time: new.estimated_time,
            icon: new.icon,
            questions: new.questions,
            created_at: Utc::now(),
        };
        tables.modules.insert(module.id, module.clone());
        Ok(module)
    }

    async fn count_modules(&self) -> Result<i64, AppError> {
        Ok(self.tables.read().await.modules.len() as i64)
    }

    async fn apply_submission(
        &self,
        submission: Submission<'_>,
    ) -> Result<(Outcome, Progress), AppError> {
        let mut tables = self.tables.write().await;

        let standing = {
            let user = tables
                .users
                .get(&submission.user_id)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            UserStanding {
                points: user.points,
                badges: user.badges.clone(),
                streak: user.streak,
            }
        };

        let outcome = gamification::evaluate(&standing, submission.module, submission.answers);

        let progress = Progress {
            id: tables.next_id(),
            user_id: submission.user_id,
            module_id: submission.module.id,
            score: outcome.score,
            completed: outcome.completed,
            answers: submission.answers.to_vec(),
            points_earned: outcome.points_earned,
            eco_actions: i32::from(outcome.completed),
            badges_earned: outcome.new_badges.clone(),
            time_spent: submission.time_spent,
            created_at: Utc::now(),
        };

        if let Some(user) = tables.users.get_mut(&submission.user_id) {
            user.points = outcome.total_points;
            user.level = outcome.new_level;
            user.badges = outcome.badges.clone();
            user.streak = outcome.streak;
        }
        tables.progress.push(progress.clone());

        Ok((outcome, progress))
    }

    async fn list_progress(&self, user_id: i64) -> Result<Vec<ProgressEntry>, AppError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<ProgressEntry> = tables
            .progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .filter_map(|p| {
                tables.summary(p.module_id).map(|module| ProgressEntry {
                    progress: p.clone(),
                    module,
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.progress
                .created_at
                .cmp(&a.progress.created_at)
                .then(b.progress.id.cmp(&a.progress.id))
        });
        Ok(entries)
    }

    async fn list_eco_actions(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<EcoAction>, AppError> {
        let tables = self.tables.read().await;
        let mut actions: Vec<EcoAction> = tables
            .eco_actions
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        actions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            actions.truncate(limit.max(0) as usize);
        }
        Ok(actions)
    }

    async fn create_eco_action(&self, new: NewEcoAction) -> Result<EcoAction, AppError> {
        let mut tables = self.tables.write().await;
        let action = EcoAction {
            id: tables.next_id(),
            user_id: new.user_id,
            title: new.title,
            description: new.description,
            impact: new.impact,
            points: new.points,
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
        };
        tables.eco_actions.insert(action.id, action.clone());
        Ok(action)
    }

    async fn complete_eco_action(
        &self,
        user_id: i64,
        action_id: i64,
    ) -> Result<Option<EcoAction>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(action) = tables
            .eco_actions
            .get_mut(&action_id)
            .filter(|a| a.user_id == user_id)
        else {
            return Ok(None);
        };

        if !action.completed {
            action.completed = true;
            action.completed_at = Some(Utc::now());
        }
        Ok(Some(action.clone()))
    }
}
