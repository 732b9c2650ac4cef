use async_trait::async_trait;
use teloxide::utils::markdown::{bold, escape};

use super::CommandHandler;
use crate::{
    command,
    error::BotResult,
    router::{CommandContext, Directive},
};

pub struct ChatIdHandler;

#[async_trait]
impl CommandHandler for ChatIdHandler {
    fn token(&self) -> &'static str {
        command::CHAT_ID
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        Ok(
            Directive::send_text(ctx.chat_id(), t!("info.chat_id", chat_id = ctx.chat_id()))
                .reply_to(ctx.inbound.message_id),
        )
    }
}

pub struct HelpHandler;

#[async_trait]
impl CommandHandler for HelpHandler {
    fn token(&self) -> &'static str {
        command::HELP
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let lines: Vec<String> = command::user_commands()
            .into_iter()
            .map(|cmd| escape(&format!("/{} - {}", cmd.command, cmd.description)))
            .collect();

        let text = format!("{}\n\n{}", bold(&escape(&t!("info.help_title"))), lines.join("\n"));
        Ok(Directive::send_text(ctx.chat_id(), text).markdown())
    }
}
