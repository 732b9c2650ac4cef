mod error;
mod memory;
mod model;
mod turso;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use model::*;
pub use turso::TursoStore;

use async_trait::async_trait;
use teloxide::types::{ChatId, UserId};

/// Persistence for everything the bot remembers about a chat.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Loads a user record, creating it with defaults when absent.
    async fn get_user(&self, user_id: UserId, chat_id: ChatId) -> Result<User, StorageError>;
    async fn save_user(&self, user: &User) -> Result<(), StorageError>;
    /// All known users of a chat, ordered by growth value descending.
    async fn users_by_chat(&self, chat_id: ChatId) -> Result<Vec<User>, StorageError>;

    /// Loads a stats record, creating an empty one when absent.
    async fn get_stats(&self, user_id: UserId, chat_id: ChatId) -> Result<UserStats, StorageError>;
    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError>;
    async fn stats_by_chat(&self, chat_id: ChatId) -> Result<Vec<UserStats>, StorageError>;

    async fn calendar_id(&self, chat_id: ChatId) -> Result<Option<String>, StorageError>;
    async fn set_calendar_id(&self, chat_id: ChatId, calendar_id: &str) -> Result<(), StorageError>;

    async fn add_homework(&self, entry: NewHomework) -> Result<Homework, StorageError>;
    async fn homework_by_chat(&self, chat_id: ChatId) -> Result<Vec<Homework>, StorageError>;
    /// Returns `false` when no entry with that id exists in the chat.
    async fn delete_homework(&self, chat_id: ChatId, id: i64) -> Result<bool, StorageError>;
}
