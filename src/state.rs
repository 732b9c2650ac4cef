use std::sync::Arc;

use anyhow::Context;
use teloxide::{adaptors::Throttle, Bot};

use crate::{
    config::AppConfig,
    error::BotResult,
    gateway::TelegramGateway,
    router::{CommandRegistry, CommandRouter},
    service::{
        content::HttpContentFetcher,
        game::{Dice, RandomDice},
        ServiceRegistry,
    },
    storage::{MemoryStore, Store, TursoStore},
    utils::http,
};

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<CommandRouter>,
}

impl AppState {
    pub async fn new(config: &AppConfig, bot: Throttle<Bot>) -> BotResult<Self> {
        let timeout = config.timeouts.external_call();

        let store: Arc<dyn Store> = match &config.turso {
            Some(turso) => Arc::new(TursoStore::connect(&turso.url, &turso.token, config.user_defaults(), timeout).await?),
            None => {
                warn!("TURSO_URL is not set, keeping everything in memory");
                Arc::new(MemoryStore::new(config.user_defaults()))
            }
        };

        let gateway = Arc::new(TelegramGateway::new(bot, timeout));

        let client = http::create_content_client(timeout).context("Failed to build content client")?;
        let content = Arc::new(HttpContentFetcher::new(client, config.content.clone()));

        let dice: Arc<dyn Dice> = match config.dice_seed {
            Some(seed) => {
                warn!("Game dice seeded with {}, outcomes are reproducible", seed);
                Arc::new(RandomDice::seeded(seed))
            }
            None => Arc::new(RandomDice::new()),
        };

        let services = ServiceRegistry::new(config, store, gateway, content, dice);
        let router = CommandRouter::new(
            services,
            CommandRegistry::with_default_commands(),
            config.telegram.bot_username.clone(),
        );

        Ok(Self {
            router: Arc::new(router),
        })
    }
}
