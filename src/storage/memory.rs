use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};
use teloxide::types::{ChatId, UserId};

use super::{Homework, MemberKey, NewHomework, StorageError, Store, User, UserDefaults, UserStats};

#[derive(Clone, Debug)]
pub struct MemoryStore {
    defaults: UserDefaults,
    users: Arc<DashMap<MemberKey, User>>,
    stats: Arc<DashMap<MemberKey, UserStats>>,
    calendars: Arc<DashMap<ChatId, String>>,
    homework: Arc<DashMap<i64, Homework>>,
    next_homework_id: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new(defaults: UserDefaults) -> Self {
        Self {
            defaults,
            users: Arc::new(DashMap::new()),
            stats: Arc::new(DashMap::new()),
            calendars: Arc::new(DashMap::new()),
            homework: Arc::new(DashMap::new()),
            next_homework_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, user_id: UserId, chat_id: ChatId) -> Result<User, StorageError> {
        let user = self
            .users
            .entry((chat_id, user_id))
            .or_insert_with(|| User::new(user_id, chat_id, self.defaults))
            .value()
            .clone();
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        self.users.insert(user.key(), user.clone());
        Ok(())
    }

    async fn users_by_chat(&self, chat_id: ChatId) -> Result<Vec<User>, StorageError> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.key().0 == chat_id)
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| b.growth.cmp(&a.growth).then(a.user_id.0.cmp(&b.user_id.0)));
        Ok(users)
    }

    async fn get_stats(&self, user_id: UserId, chat_id: ChatId) -> Result<UserStats, StorageError> {
        let stats = self
            .stats
            .entry((chat_id, user_id))
            .or_insert_with(|| UserStats::new(user_id, chat_id))
            .value()
            .clone();
        Ok(stats)
    }

    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        self.stats.insert((stats.chat_id, stats.user_id), stats.clone());
        Ok(())
    }

    async fn stats_by_chat(&self, chat_id: ChatId) -> Result<Vec<UserStats>, StorageError> {
        Ok(self
            .stats
            .iter()
            .filter(|entry| entry.key().0 == chat_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn calendar_id(&self, chat_id: ChatId) -> Result<Option<String>, StorageError> {
        Ok(self.calendars.get(&chat_id).map(|value| value.value().clone()))
    }

    async fn set_calendar_id(&self, chat_id: ChatId, calendar_id: &str) -> Result<(), StorageError> {
        self.calendars.insert(chat_id, calendar_id.to_string());
        Ok(())
    }

    async fn add_homework(&self, entry: NewHomework) -> Result<Homework, StorageError> {
        let id = self.next_homework_id.fetch_add(1, Ordering::SeqCst);
        let homework = Homework {
            id,
            chat_id: entry.chat_id,
            subject: entry.subject,
            task: entry.task,
            deadline: entry.deadline,
            author: entry.author,
            created_at: Utc::now(),
        };
        self.homework.insert(id, homework.clone());
        Ok(homework)
    }

    async fn homework_by_chat(&self, chat_id: ChatId) -> Result<Vec<Homework>, StorageError> {
        let mut entries: Vec<Homework> = self
            .homework
            .iter()
            .filter(|entry| entry.value().chat_id == chat_id)
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|entry| entry.id);
        Ok(entries)
    }

    async fn delete_homework(&self, chat_id: ChatId, id: i64) -> Result<bool, StorageError> {
        Ok(self.homework.remove_if(&id, |_, entry| entry.chat_id == chat_id).is_some())
    }
}
