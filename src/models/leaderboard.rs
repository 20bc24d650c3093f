// src/models/leaderboard.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::user::User;

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardParams {
    /// Number of entries (default 10, max 100).
    pub limit: Option<i64>,
    /// Role to rank (default 'student').
    pub role: Option<String>,
}

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub id: i64,
    pub name: String,
    pub points: i64,
    pub level: i64,
    /// Number of badges held.
    pub badges: usize,
    pub streak: i64,
}

impl LeaderboardEntry {
    /// Annotates users already sorted by points with their 1-based position.
    pub fn rank_all(users: Vec<User>) -> Vec<Self> {
        users
            .into_iter()
            .enumerate()
            .map(|(index, user)| Self {
                rank: index + 1,
                id: user.id,
                name: user.name,
                points: user.points,
                level: user.level,
                badges: user.badges.len(),
                streak: user.streak,
            })
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Leaderboard {
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankResponse {
    pub rank: i64,
    pub total_users: i64,
    pub points: i64,
    pub level: i64,
}
