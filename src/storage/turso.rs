use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database, Row, Value};
use std::{future::Future, sync::Arc, time::Duration};
use teloxide::types::{ChatId, UserId};

use super::{Homework, NewHomework, StatCounters, StorageError, Store, User, UserDefaults, UserStats};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER NOT NULL,
    chat_id INTEGER NOT NULL,
    username TEXT,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT,
    growth INTEGER NOT NULL DEFAULT 0,
    changed_at INTEGER NOT NULL DEFAULT 0,
    attempts_left INTEGER NOT NULL,
    max_attempts INTEGER NOT NULL,
    health INTEGER NOT NULL,
    PRIMARY KEY (user_id, chat_id)
);
CREATE TABLE IF NOT EXISTS user_stats (
    user_id INTEGER NOT NULL,
    chat_id INTEGER NOT NULL,
    messages INTEGER NOT NULL DEFAULT 0,
    growth_up INTEGER NOT NULL DEFAULT 0,
    growth_down INTEGER NOT NULL DEFAULT 0,
    yes_votes INTEGER NOT NULL DEFAULT 0,
    no_votes INTEGER NOT NULL DEFAULT 0,
    duels INTEGER NOT NULL DEFAULT 0,
    duels_won INTEGER NOT NULL DEFAULT 0,
    duels_lost INTEGER NOT NULL DEFAULT 0,
    kills INTEGER NOT NULL DEFAULT 0,
    deaths INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, chat_id)
);
CREATE TABLE IF NOT EXISTS chat_calendars (
    chat_id INTEGER PRIMARY KEY,
    calendar_id TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS homework (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id INTEGER NOT NULL,
    subject TEXT NOT NULL,
    task TEXT NOT NULL,
    deadline TEXT NOT NULL,
    author_id INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);
"#;

const USER_COLUMNS: &str =
    "user_id, chat_id, username, first_name, last_name, growth, changed_at, attempts_left, max_attempts, health";

const STATS_COLUMNS: &str =
    "user_id, chat_id, messages, growth_up, growth_down, yes_votes, no_votes, duels, duels_won, duels_lost, kills, deaths";

#[derive(Clone)]
pub struct TursoStore {
    inner: Arc<Database>,
    defaults: UserDefaults,
    timeout: Duration,
}

impl TursoStore {
    pub async fn connect(
        url: &str,
        token: &str,
        defaults: UserDefaults,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        info!("Initializing TursoStore...");
        let db = Builder::new_remote(url.to_string(), token.to_string())
            .build()
            .await
            .map_err(StorageError::Turso)?;

        let store = Self {
            inner: Arc::new(db),
            defaults,
            timeout,
        };

        store
            .bounded(async {
                store.connection()?.execute_batch(SCHEMA).await?;
                Ok(())
            })
            .await?;

        info!("TursoStore initialized");
        Ok(store)
    }

    fn connection(&self) -> Result<Connection, StorageError> {
        Ok(self.inner.connect()?)
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| StorageError::Timeout(self.timeout))?
    }

    async fn find_user(&self, user_id: UserId, chat_id: ChatId) -> Result<Option<User>, StorageError> {
        let conn = self.connection()?;
        let mut rows = conn
            .query(
                &format!("SELECT {} FROM users WHERE user_id = ?1 AND chat_id = ?2", USER_COLUMNS),
                vec![id_value(user_id.0), Value::Integer(chat_id.0)],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        let conn = self.connection()?;
        conn.execute(
            &format!(
                "INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT (user_id, chat_id) DO UPDATE SET
                    username = excluded.username,
                    first_name = excluded.first_name,
                    last_name = excluded.last_name,
                    growth = excluded.growth,
                    changed_at = excluded.changed_at,
                    attempts_left = excluded.attempts_left,
                    max_attempts = excluded.max_attempts,
                    health = excluded.health",
                USER_COLUMNS
            ),
            vec![
                id_value(user.user_id.0),
                Value::Integer(user.chat_id.0),
                optional_text(&user.username),
                Value::Text(user.first_name.clone()),
                optional_text(&user.last_name),
                Value::Integer(user.growth),
                Value::Integer(user.changed_at.timestamp()),
                Value::Integer(i64::from(user.attempts_left)),
                Value::Integer(i64::from(user.max_attempts)),
                Value::Integer(user.health),
            ],
        )
        .await?;
        Ok(())
    }

    async fn find_stats(&self, user_id: UserId, chat_id: ChatId) -> Result<Option<UserStats>, StorageError> {
        let conn = self.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM user_stats WHERE user_id = ?1 AND chat_id = ?2",
                    STATS_COLUMNS
                ),
                vec![id_value(user_id.0), Value::Integer(chat_id.0)],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(stats_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Store for TursoStore {
    async fn get_user(&self, user_id: UserId, chat_id: ChatId) -> Result<User, StorageError> {
        self.bounded(async {
            if let Some(user) = self.find_user(user_id, chat_id).await? {
                return Ok(user);
            }
            let user = User::new(user_id, chat_id, self.defaults);
            self.upsert_user(&user).await?;
            Ok(user)
        })
        .await
    }

    async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        self.bounded(self.upsert_user(user)).await
    }

    async fn users_by_chat(&self, chat_id: ChatId) -> Result<Vec<User>, StorageError> {
        self.bounded(async {
            let conn = self.connection()?;
            let mut rows = conn
                .query(
                    &format!(
                        "SELECT {} FROM users WHERE chat_id = ?1 ORDER BY growth DESC, user_id ASC",
                        USER_COLUMNS
                    ),
                    vec![Value::Integer(chat_id.0)],
                )
                .await?;

            let mut users = Vec::new();
            while let Some(row) = rows.next().await? {
                users.push(user_from_row(&row)?);
            }
            Ok(users)
        })
        .await
    }

    async fn get_stats(&self, user_id: UserId, chat_id: ChatId) -> Result<UserStats, StorageError> {
        self.bounded(async {
            Ok(self
                .find_stats(user_id, chat_id)
                .await?
                .unwrap_or_else(|| UserStats::new(user_id, chat_id)))
        })
        .await
    }

    async fn save_stats(&self, stats: &UserStats) -> Result<(), StorageError> {
        self.bounded(async {
            let c = &stats.counters;
            let conn = self.connection()?;
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO user_stats ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    STATS_COLUMNS
                ),
                vec![
                    id_value(stats.user_id.0),
                    Value::Integer(stats.chat_id.0),
                    counter_value(c.messages),
                    counter_value(c.growth_up),
                    counter_value(c.growth_down),
                    counter_value(c.yes_votes),
                    counter_value(c.no_votes),
                    counter_value(c.duels),
                    counter_value(c.duels_won),
                    counter_value(c.duels_lost),
                    counter_value(c.kills),
                    counter_value(c.deaths),
                ],
            )
            .await?;
            Ok(())
        })
        .await
    }

    async fn stats_by_chat(&self, chat_id: ChatId) -> Result<Vec<UserStats>, StorageError> {
        self.bounded(async {
            let conn = self.connection()?;
            let mut rows = conn
                .query(
                    &format!("SELECT {} FROM user_stats WHERE chat_id = ?1", STATS_COLUMNS),
                    vec![Value::Integer(chat_id.0)],
                )
                .await?;

            let mut stats = Vec::new();
            while let Some(row) = rows.next().await? {
                stats.push(stats_from_row(&row)?);
            }
            Ok(stats)
        })
        .await
    }

    async fn calendar_id(&self, chat_id: ChatId) -> Result<Option<String>, StorageError> {
        self.bounded(async {
            let conn = self.connection()?;
            let mut rows = conn
                .query(
                    "SELECT calendar_id FROM chat_calendars WHERE chat_id = ?1 LIMIT 1",
                    vec![Value::Integer(chat_id.0)],
                )
                .await?;

            match rows.next().await? {
                Some(row) => Ok(Some(row.get::<String>(0)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn set_calendar_id(&self, chat_id: ChatId, calendar_id: &str) -> Result<(), StorageError> {
        self.bounded(async {
            let conn = self.connection()?;
            conn.execute(
                "INSERT OR REPLACE INTO chat_calendars (chat_id, calendar_id) VALUES (?1, ?2)",
                vec![Value::Integer(chat_id.0), Value::Text(calendar_id.to_string())],
            )
            .await?;
            Ok(())
        })
        .await
    }

    async fn add_homework(&self, entry: NewHomework) -> Result<Homework, StorageError> {
        self.bounded(async {
            let created_at = Utc::now();
            let conn = self.connection()?;
            let mut rows = conn
                .query(
                    "INSERT INTO homework (chat_id, subject, task, deadline, author_id, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
                    vec![
                        Value::Integer(entry.chat_id.0),
                        Value::Text(entry.subject.clone()),
                        Value::Text(entry.task.clone()),
                        Value::Text(entry.deadline.clone()),
                        id_value(entry.author.0),
                        Value::Integer(created_at.timestamp()),
                    ],
                )
                .await?;

            let id = match rows.next().await? {
                Some(row) => row.get::<i64>(0)?,
                None => return Err(StorageError::CorruptRow("homework insert returned no id".to_string())),
            };

            Ok(Homework {
                id,
                chat_id: entry.chat_id,
                subject: entry.subject,
                task: entry.task,
                deadline: entry.deadline,
                author: entry.author,
                created_at,
            })
        })
        .await
    }

    async fn homework_by_chat(&self, chat_id: ChatId) -> Result<Vec<Homework>, StorageError> {
        self.bounded(async {
            let conn = self.connection()?;
            let mut rows = conn
                .query(
                    "SELECT id, chat_id, subject, task, deadline, author_id, created_at
                     FROM homework WHERE chat_id = ?1 ORDER BY id ASC",
                    vec![Value::Integer(chat_id.0)],
                )
                .await?;

            let mut entries = Vec::new();
            while let Some(row) = rows.next().await? {
                entries.push(Homework {
                    id: row.get::<i64>(0)?,
                    chat_id: ChatId(row.get::<i64>(1)?),
                    subject: row.get::<String>(2)?,
                    task: row.get::<String>(3)?,
                    deadline: row.get::<String>(4)?,
                    author: user_id_from(row.get::<i64>(5)?),
                    created_at: timestamp_from(row.get::<i64>(6)?),
                });
            }
            Ok(entries)
        })
        .await
    }

    async fn delete_homework(&self, chat_id: ChatId, id: i64) -> Result<bool, StorageError> {
        self.bounded(async {
            let conn = self.connection()?;
            let affected = conn
                .execute(
                    "DELETE FROM homework WHERE id = ?1 AND chat_id = ?2",
                    vec![Value::Integer(id), Value::Integer(chat_id.0)],
                )
                .await?;
            Ok(affected > 0)
        })
        .await
    }
}

fn user_from_row(row: &Row) -> Result<User, StorageError> {
    Ok(User {
        user_id: user_id_from(row.get::<i64>(0)?),
        chat_id: ChatId(row.get::<i64>(1)?),
        username: optional_text_from(row.get_value(2)?),
        first_name: row.get::<String>(3)?,
        last_name: optional_text_from(row.get_value(4)?),
        growth: row.get::<i64>(5)?,
        changed_at: timestamp_from(row.get::<i64>(6)?),
        attempts_left: u32::try_from(row.get::<i64>(7)?)
            .map_err(|_| StorageError::CorruptRow("attempts_left out of range".to_string()))?,
        max_attempts: u32::try_from(row.get::<i64>(8)?)
            .map_err(|_| StorageError::CorruptRow("max_attempts out of range".to_string()))?,
        health: row.get::<i64>(9)?,
    })
}

fn stats_from_row(row: &Row) -> Result<UserStats, StorageError> {
    let counter = |idx: i32| -> Result<u64, StorageError> { Ok(row.get::<i64>(idx)?.max(0) as u64) };

    Ok(UserStats {
        user_id: user_id_from(row.get::<i64>(0)?),
        chat_id: ChatId(row.get::<i64>(1)?),
        counters: StatCounters {
            messages: counter(2)?,
            growth_up: counter(3)?,
            growth_down: counter(4)?,
            yes_votes: counter(5)?,
            no_votes: counter(6)?,
            duels: counter(7)?,
            duels_won: counter(8)?,
            duels_lost: counter(9)?,
            kills: counter(10)?,
            deaths: counter(11)?,
        },
    })
}

// Telegram user ids fit in 52 bits, SQLite integers are signed 64-bit.
fn id_value(id: u64) -> Value {
    Value::Integer(id as i64)
}

fn user_id_from(raw: i64) -> UserId {
    UserId(raw as u64)
}

fn counter_value(counter: u64) -> Value {
    Value::Integer(i64::try_from(counter).unwrap_or(i64::MAX))
}

fn optional_text(value: &Option<String>) -> Value {
    match value {
        Some(text) => Value::Text(text.clone()),
        None => Value::Null,
    }
}

fn optional_text_from(value: Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text),
        _ => None,
    }
}

fn timestamp_from(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}
