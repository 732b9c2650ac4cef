//! Operator overrides. Only users listed in `OPERATOR_USER_IDS` get an answer; everyone
//! else is ignored.

use async_trait::async_trait;
use teloxide::types::{ChatId, UserId};

use super::CommandHandler;
use crate::{
    command,
    error::BotResult,
    router::{CommandContext, Directive},
};

fn is_operator(ctx: &CommandContext<'_>, token: &str) -> bool {
    let sender = ctx.inbound.sender.id;
    if ctx.services.permissions.is_operator(sender) {
        return true;
    }
    warn!("{} tried operator command {} in chat {}", sender, token, ctx.chat_id());
    false
}

/// `/set_growth <chat_id> <user_id> <value>`
pub struct SetGrowthHandler;

impl SetGrowthHandler {
    fn parse(args: &str) -> Option<(ChatId, UserId, i64)> {
        let mut parts = args.split_whitespace();
        let chat_id = parts.next()?.parse::<i64>().ok()?;
        let user_id = parts.next()?.parse::<u64>().ok()?;
        let value = parts.next()?.parse::<i64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((ChatId(chat_id), UserId(user_id), value))
    }
}

#[async_trait]
impl CommandHandler for SetGrowthHandler {
    fn token(&self) -> &'static str {
        command::SET_GROWTH
    }

    fn accepts_arguments(&self) -> bool {
        true
    }

    fn locks_sender(&self) -> bool {
        false
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        if !is_operator(ctx, self.token()) {
            return Ok(Directive::no_op(ctx.chat_id()));
        }

        let Some((chat_id, user_id, value)) = ctx.args.and_then(Self::parse) else {
            return Ok(Directive::send_text(ctx.chat_id(), t!("admin.set_growth_usage")));
        };

        let _guard = ctx.services.locks.lock((chat_id, user_id)).await;
        let mut user = ctx.services.store.get_user(user_id, chat_id).await?;
        let old = user.growth;
        user.growth = value;
        ctx.services.store.save_user(&user).await?;

        warn!(
            "Operator {} set growth of {} in chat {} from {} to {}",
            ctx.inbound.sender.id, user_id, chat_id, old, value
        );

        Ok(Directive::send_text(
            ctx.chat_id(),
            t!("admin.growth_set", user_id = user_id, chat_id = chat_id, value = value),
        ))
    }
}

/// `/broadcast <chat_id> <text>`
pub struct BroadcastHandler;

impl BroadcastHandler {
    fn parse(args: &str) -> Option<(ChatId, &str)> {
        let (chat_id, text) = args.split_once(char::is_whitespace)?;
        let chat_id = chat_id.parse::<i64>().ok()?;
        let text = text.trim();
        (!text.is_empty()).then_some((ChatId(chat_id), text))
    }
}

#[async_trait]
impl CommandHandler for BroadcastHandler {
    fn token(&self) -> &'static str {
        command::BROADCAST
    }

    fn accepts_arguments(&self) -> bool {
        true
    }

    fn locks_sender(&self) -> bool {
        false
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        if !is_operator(ctx, self.token()) {
            return Ok(Directive::no_op(ctx.chat_id()));
        }

        let Some((target, text)) = ctx.args.and_then(Self::parse) else {
            return Ok(Directive::send_text(ctx.chat_id(), t!("admin.broadcast_usage")));
        };

        info!("Operator {} broadcasts to chat {}", ctx.inbound.sender.id, target);
        Ok(Directive::send_text(target, text))
    }
}
