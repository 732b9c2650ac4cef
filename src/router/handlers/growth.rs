use async_trait::async_trait;
use teloxide::utils::markdown::{bold, escape};

use super::{CommandHandler, TriggerDeletion};
use crate::{
    command,
    error::BotResult,
    router::{CommandContext, Directive},
    service::game::GrowthOutcome,
};

pub struct GrowHandler;

#[async_trait]
impl CommandHandler for GrowHandler {
    fn token(&self) -> &'static str {
        command::GROW
    }

    fn trigger_deletion(&self) -> TriggerDeletion {
        TriggerDeletion::BestEffort
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let services = ctx.services;
        let (chat_id, user_id) = ctx.sender_key();

        let mut user = services.store.get_user(user_id, chat_id).await?;
        let outcome = services.growth.play(&mut user, ctx.now);
        let name = user.mention();

        let text = match outcome {
            GrowthOutcome::AlreadyPlayed => t!("growth.already_played", name = name).to_string(),
            GrowthOutcome::Changed {
                old,
                new,
                delta,
                jackpot,
            } => {
                services.store.save_user(&user).await?;
                services.stats.record_growth(ctx.sender_key(), delta).await;
                info!("{} in chat {} grew {} -> {}", user_id, chat_id, old, new);

                let mut text = if old == 0 {
                    t!("growth.welcome", name = name, value = new).to_string()
                } else {
                    t!("growth.changed", name = name, old = old, new = new).to_string()
                };
                if jackpot {
                    text.push('\n');
                    text.push_str(&t!("growth.jackpot", bonus = delta));
                }
                text
            }
        };

        Ok(Directive::send_text(chat_id, text))
    }
}

pub struct TopHandler;

#[async_trait]
impl CommandHandler for TopHandler {
    fn token(&self) -> &'static str {
        command::TOP
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let users = ctx.services.store.users_by_chat(ctx.chat_id()).await?;
        let leaders: Vec<String> = users
            .iter()
            .filter(|user| user.growth > 0)
            .enumerate()
            .map(|(place, user)| escape(&format!("{}. {}: {}", place + 1, user.display_name(), user.growth)))
            .collect();

        if leaders.is_empty() {
            return Ok(Directive::send_text(ctx.chat_id(), t!("growth.top_empty")));
        }

        let text = format!("{}\n{}", bold(&escape(&t!("growth.top_title"))), leaders.join("\n"));
        Ok(Directive::send_text(ctx.chat_id(), text).markdown())
    }
}
