use std::str::FromStr;
use std::time::Duration;

use teloxide::types::UserId;

use crate::storage::UserDefaults;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {0}")]
    MissingKey(String),
    #[error("Invalid {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("Inconsistent config: {0}")]
    Inconsistent(String),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub turso: Option<TursoConfig>,
    pub admin: AdminConfig,
    pub growth: GrowthConfig,
    pub duel: DuelConfig,
    pub dice_seed: Option<u64>,
    pub conversation: ConversationConfig,
    pub content: ContentConfig,
    pub timeouts: TimeoutConfig,
}

impl AppConfig {
    pub fn user_defaults(&self) -> UserDefaults {
        UserDefaults {
            max_attempts: self.growth.max_daily_attempts,
            max_health: self.duel.max_health,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub token: String,
    pub bot_username: String,
    pub locale: String,
}

#[derive(Clone, Debug)]
pub struct TursoConfig {
    pub url: String,
    pub token: String,
}

#[derive(Clone, Debug, Default)]
pub struct AdminConfig {
    /// Users allowed to run the operator override commands in any chat.
    pub operator_ids: Vec<UserId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrowthConfig {
    pub max_daily_attempts: u32,
    /// Deltas are drawn from `1..=max_magnitude` before the sign is applied.
    pub max_magnitude: i64,
    /// Chance out of 10 that a drawn delta is positive.
    pub positive_weight: u32,
    pub jackpot_odds: u32,
    pub jackpot_bonus: i64,
    pub max_rerolls: u32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            max_daily_attempts: 1,
            max_magnitude: 14,
            positive_weight: 8,
            jackpot_odds: 100,
            jackpot_bonus: 100,
            max_rerolls: 64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuelConfig {
    pub max_health: i64,
    pub min_damage: i64,
    pub max_damage: i64,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            min_damage: 10,
            max_damage: 35,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConversationConfig {
    /// Idle time after which an unfinished flow is dropped.
    pub ttl_secs: i64,
    pub homework_subjects: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ContentConfig {
    pub joke_url: String,
    pub xkcd_url: String,
    /// `{calendar_id}` is replaced with the bound calendar id.
    pub calendar_url_template: String,
    pub schedule_utc_offset_hours: i32,
    pub flip_heads_url: Option<String>,
    pub flip_tails_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TimeoutConfig {
    pub external_call_secs: u64,
}

impl TimeoutConfig {
    pub fn external_call(&self) -> Duration {
        Duration::from_secs(self.external_call_secs)
    }
}

const DEFAULT_JOKE_URL: &str = "https://v2.jokeapi.dev/joke/Any?type=single&safe-mode";
const DEFAULT_XKCD_URL: &str = "https://xkcd.com";
const DEFAULT_CALENDAR_URL_TEMPLATE: &str = "https://calendar.google.com/calendar/ical/{calendar_id}/public/basic.ics";
const DEFAULT_HOMEWORK_SUBJECTS: &str = "Information Security";

/// Builds the config from a key lookup, normally the Shuttle secret store.
pub fn build_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    info!("Building AppConfig...");

    let turso = match (lookup("TURSO_URL"), lookup("TURSO_TOKEN")) {
        (Some(url), Some(token)) => Some(TursoConfig { url, token }),
        (None, None) => None,
        _ => {
            return Err(ConfigError::Inconsistent(
                "TURSO_URL and TURSO_TOKEN must be set together".to_string(),
            ))
        }
    };

    let config = AppConfig {
        telegram: TelegramConfig {
            token: required(&lookup, "TELEGRAM_BOT_TOKEN")?,
            bot_username: required(&lookup, "BOT_USERNAME")?.trim_start_matches('@').to_string(),
            locale: lookup("BOT_LOCALE").unwrap_or_else(|| "en".to_string()),
        },
        turso,
        admin: AdminConfig {
            operator_ids: parsed_list::<u64, _>(&lookup, "OPERATOR_USER_IDS")?
                .into_iter()
                .map(UserId)
                .collect(),
        },
        growth: GrowthConfig {
            max_daily_attempts: parsed_or(&lookup, "GROWTH_MAX_DAILY_ATTEMPTS", 1)?,
            max_magnitude: parsed_or(&lookup, "GROWTH_MAX_MAGNITUDE", 14)?,
            positive_weight: parsed_or(&lookup, "GROWTH_POSITIVE_WEIGHT", 8)?,
            jackpot_odds: parsed_or(&lookup, "GROWTH_JACKPOT_ODDS", 100)?,
            jackpot_bonus: parsed_or(&lookup, "GROWTH_JACKPOT_BONUS", 100)?,
            max_rerolls: parsed_or(&lookup, "GROWTH_MAX_REROLLS", 64)?,
        },
        duel: DuelConfig {
            max_health: parsed_or(&lookup, "DUEL_MAX_HEALTH", 100)?,
            min_damage: parsed_or(&lookup, "DUEL_MIN_DAMAGE", 10)?,
            max_damage: parsed_or(&lookup, "DUEL_MAX_DAMAGE", 35)?,
        },
        dice_seed: parsed_optional(&lookup, "GAME_DICE_SEED")?,
        conversation: ConversationConfig {
            ttl_secs: parsed_or(&lookup, "CONVERSATION_TTL_SECS", 900)?,
            homework_subjects: lookup("HOMEWORK_SUBJECTS")
                .unwrap_or_else(|| DEFAULT_HOMEWORK_SUBJECTS.to_string())
                .split(',')
                .map(str::trim)
                .filter(|subject| !subject.is_empty())
                .map(str::to_string)
                .collect(),
        },
        content: ContentConfig {
            joke_url: lookup("JOKE_URL").unwrap_or_else(|| DEFAULT_JOKE_URL.to_string()),
            xkcd_url: lookup("XKCD_URL").unwrap_or_else(|| DEFAULT_XKCD_URL.to_string()),
            calendar_url_template: lookup("CALENDAR_URL_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_CALENDAR_URL_TEMPLATE.to_string()),
            schedule_utc_offset_hours: parsed_or(&lookup, "SCHEDULE_UTC_OFFSET_HOURS", 0)?,
            flip_heads_url: lookup("FLIP_HEADS_URL"),
            flip_tails_url: lookup("FLIP_TAILS_URL"),
        },
        timeouts: TimeoutConfig {
            external_call_secs: parsed_or(&lookup, "EXTERNAL_CALL_TIMEOUT_SECS", 10)?,
        },
    };

    validate(&config)?;
    info!("AppConfig built");

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let growth = &config.growth;
    if growth.max_magnitude < 1 || growth.jackpot_odds == 0 || growth.positive_weight > 10 {
        return Err(ConfigError::Inconsistent(format!("growth settings {:?}", growth)));
    }

    let duel = &config.duel;
    if duel.max_health < 1 || duel.min_damage < 1 || duel.min_damage > duel.max_damage {
        return Err(ConfigError::Inconsistent(format!("duel settings {:?}", duel)));
    }

    if !(-12..=14).contains(&config.content.schedule_utc_offset_hours) {
        return Err(ConfigError::Inconsistent(
            "SCHEDULE_UTC_OFFSET_HOURS must be within -12..=14".to_string(),
        ));
    }

    if config.timeouts.external_call_secs == 0 {
        return Err(ConfigError::Inconsistent(
            "EXTERNAL_CALL_TIMEOUT_SECS must be positive".to_string(),
        ));
    }

    Ok(())
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

fn parsed_optional<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

fn parsed_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    Ok(parsed_optional(lookup, key)?.unwrap_or(default))
}

fn parsed_list<T, F>(lookup: &F, key: &str) -> Result<Vec<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<T>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: item.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
impl AppConfig {
    pub fn new_test_config() -> Self {
        AppConfig {
            telegram: TelegramConfig {
                token: "test-token".to_string(),
                bot_username: "keeper_bot".to_string(),
                locale: "en".to_string(),
            },
            turso: None,
            admin: AdminConfig {
                operator_ids: vec![UserId(1)],
            },
            growth: GrowthConfig::default(),
            duel: DuelConfig::default(),
            dice_seed: Some(7),
            conversation: ConversationConfig {
                ttl_secs: 900,
                homework_subjects: vec!["Math".to_string(), "History".to_string()],
            },
            content: ContentConfig {
                joke_url: DEFAULT_JOKE_URL.to_string(),
                xkcd_url: DEFAULT_XKCD_URL.to_string(),
                calendar_url_template: DEFAULT_CALENDAR_URL_TEMPLATE.to_string(),
                schedule_utc_offset_hours: 0,
                flip_heads_url: None,
                flip_tails_url: None,
            },
            timeouts: TimeoutConfig { external_call_secs: 5 },
        }
    }
}
