use std::ops::AddAssign;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, UserId};

/// A chat member is always addressed by the chat first, then the user.
pub type MemberKey = (ChatId, UserId);

/// Values a freshly created user record starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserDefaults {
    pub max_attempts: u32,
    pub max_health: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub growth: i64,
    pub changed_at: DateTime<Utc>,
    pub attempts_left: u32,
    pub max_attempts: u32,
    pub health: i64,
}

impl User {
    pub fn new(user_id: UserId, chat_id: ChatId, defaults: UserDefaults) -> Self {
        Self {
            user_id,
            chat_id,
            username: None,
            first_name: String::new(),
            last_name: None,
            growth: 0,
            changed_at: DateTime::<Utc>::default(),
            attempts_left: defaults.max_attempts,
            max_attempts: defaults.max_attempts,
            health: defaults.max_health,
        }
    }

    pub fn key(&self) -> MemberKey {
        (self.chat_id, self.user_id)
    }

    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    /// `@handle` when the user has one, the display name otherwise.
    pub fn mention(&self) -> String {
        match &self.username {
            Some(username) => format!("@{}", username),
            None => self.display_name(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCounters {
    pub messages: u64,
    pub growth_up: u64,
    pub growth_down: u64,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub duels: u64,
    pub duels_won: u64,
    pub duels_lost: u64,
    pub kills: u64,
    pub deaths: u64,
}

impl AddAssign for StatCounters {
    fn add_assign(&mut self, other: Self) {
        self.messages += other.messages;
        self.growth_up += other.growth_up;
        self.growth_down += other.growth_down;
        self.yes_votes += other.yes_votes;
        self.no_votes += other.no_votes;
        self.duels += other.duels;
        self.duels_won += other.duels_won;
        self.duels_lost += other.duels_lost;
        self.kills += other.kills;
        self.deaths += other.deaths;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub counters: StatCounters,
}

impl UserStats {
    pub fn new(user_id: UserId, chat_id: ChatId) -> Self {
        Self {
            user_id,
            chat_id,
            counters: StatCounters::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Homework {
    pub id: i64,
    pub chat_id: ChatId,
    pub subject: String,
    pub task: String,
    pub deadline: String,
    pub author: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHomework {
    pub chat_id: ChatId,
    pub subject: String,
    pub task: String,
    pub deadline: String,
    pub author: UserId,
}
