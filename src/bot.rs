use teloxide::adaptors::throttle::Limits;
use teloxide::adaptors::Throttle;
use teloxide::prelude::*;

use crate::command::setup_user_commands;
use crate::config::AppConfig;
use crate::error::{BotResult, HandlerResult};
use crate::handler::get_handler;
use crate::state::AppState;
use crate::utils::http;

pub struct BotService {
    pub bot: Throttle<Bot>,
    pub state: AppState,
}

impl BotService {
    pub async fn new(config: &AppConfig) -> BotResult<Self> {
        let bot = http::create_telegram_bot(config.telegram.token.clone())?.throttle(Limits::default());

        info!("Initializing AppState...");
        let state = AppState::new(config, bot.clone()).await?;
        info!("AppState initialized");

        Ok(Self { bot, state })
    }

    pub async fn start(&self) -> HandlerResult<()> {
        info!("Testing connection to Telegram API...");
        match self.bot.get_me().await {
            Ok(me) => info!("Connected to Telegram API as @{}", me.username()),
            Err(e) => {
                error!("Failed to connect to Telegram API: {:?}", e);
                return Err(anyhow::anyhow!("Failed to connect to Telegram API: {}", e).into());
            }
        }

        setup_user_commands(&self.bot).await?;

        Dispatcher::builder(self.bot.clone(), get_handler())
            .dependencies(dptree::deps![self.state.clone()])
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
