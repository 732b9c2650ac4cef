use async_trait::async_trait;
use teloxide::utils::markdown::{escape, user_mention};

use super::CommandHandler;
use crate::{
    command,
    error::BotResult,
    router::{CommandContext, Directive},
};

pub struct AskHandler;

#[async_trait]
impl CommandHandler for AskHandler {
    fn token(&self) -> &'static str {
        command::ASK
    }

    fn accepts_arguments(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        if ctx.args.is_none() {
            return Ok(Directive::send_text(ctx.chat_id(), t!("fun.ask_usage")));
        }

        let yes = ctx.services.dice.chance(1, 2);
        ctx.services.stats.record_vote(ctx.sender_key(), yes).await;

        let answer = if yes { t!("fun.yes") } else { t!("fun.no") };
        Ok(Directive::send_text(ctx.chat_id(), answer).reply_to(ctx.inbound.message_id))
    }
}

pub struct JokeHandler;

#[async_trait]
impl CommandHandler for JokeHandler {
    fn token(&self) -> &'static str {
        command::JOKE
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let joke = ctx.services.content.joke().await?;
        Ok(Directive::send_text(ctx.chat_id(), joke))
    }
}

pub struct ComicHandler;

#[async_trait]
impl CommandHandler for ComicHandler {
    fn token(&self) -> &'static str {
        command::XKCD
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let comic = ctx.services.content.comic().await?;
        debug!("Sending xkcd #{}", comic.num);
        Ok(Directive::send_photo(ctx.chat_id(), comic.image_url, Some(comic.title)))
    }
}

pub struct FlipHandler;

#[async_trait]
impl CommandHandler for FlipHandler {
    fn token(&self) -> &'static str {
        command::FLIP
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let heads = ctx.services.dice.chance(1, 2);
        let side = if heads { t!("fun.heads") } else { t!("fun.tails") };

        let directive = match &ctx.services.flip_images {
            Some(images) => {
                let url = if heads { &images.heads } else { &images.tails };
                Directive::send_photo(ctx.chat_id(), url.clone(), Some(side.to_string()))
            }
            None => Directive::send_text(ctx.chat_id(), side),
        };

        Ok(directive)
    }
}

/// Pings every administrator of the chat.
pub struct CallAllHandler;

#[async_trait]
impl CommandHandler for CallAllHandler {
    fn token(&self) -> &'static str {
        command::ALL
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let admins = ctx.services.permissions.administrators(ctx.chat_id()).await;

        let mentions: Vec<String> = admins
            .iter()
            .filter(|admin| admin.id != ctx.inbound.sender.id)
            .map(|admin| match &admin.username {
                Some(username) => escape(&format!("@{}", username)),
                None => user_mention(admin.id, &escape(&admin.first_name)),
            })
            .collect();

        if mentions.is_empty() {
            return Ok(Directive::send_text(ctx.chat_id(), t!("fun.nobody_to_call")));
        }

        Ok(Directive::send_text(ctx.chat_id(), mentions.join(" ")).markdown())
    }
}
