use async_trait::async_trait;

use super::CommandHandler;
use crate::{
    command,
    error::BotResult,
    router::{CommandContext, Directive},
};

pub struct AddHomeworkHandler;

#[async_trait]
impl CommandHandler for AddHomeworkHandler {
    fn token(&self) -> &'static str {
        command::ADD_HOMEWORK
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let reply = ctx.services.homework.begin(ctx.sender_key(), ctx.now);
        Ok(Directive::with_keyboard(ctx.chat_id(), reply.text, reply.buttons).reply_to(ctx.inbound.message_id))
    }
}

pub struct ListHomeworkHandler;

#[async_trait]
impl CommandHandler for ListHomeworkHandler {
    fn token(&self) -> &'static str {
        command::HOMEWORK
    }

    fn accepts_arguments(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let subject = ctx.args;
        let entries: Vec<String> = ctx
            .services
            .store
            .homework_by_chat(ctx.chat_id())
            .await?
            .into_iter()
            .filter(|entry| subject.map_or(true, |subject| entry.subject.eq_ignore_ascii_case(subject)))
            .map(|entry| {
                t!(
                    "homework.entry",
                    id = entry.id,
                    subject = entry.subject,
                    task = entry.task,
                    deadline = entry.deadline
                )
                .to_string()
            })
            .collect();

        if entries.is_empty() {
            return Ok(Directive::send_text(ctx.chat_id(), t!("homework.list_empty")));
        }

        Ok(Directive::send_text(ctx.chat_id(), entries.join("\n")))
    }
}

pub struct DeleteHomeworkHandler;

#[async_trait]
impl CommandHandler for DeleteHomeworkHandler {
    fn token(&self) -> &'static str {
        command::DELETE_HOMEWORK
    }

    fn accepts_arguments(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let Some(id) = ctx.args.and_then(|args| args.trim().trim_start_matches('#').parse::<i64>().ok()) else {
            return Ok(Directive::send_text(ctx.chat_id(), t!("homework.invalid_id")));
        };

        let text = if ctx.services.store.delete_homework(ctx.chat_id(), id).await? {
            info!("Homework {} deleted from chat {}", id, ctx.chat_id());
            t!("homework.deleted", id = id)
        } else {
            t!("homework.not_found", id = id)
        };

        Ok(Directive::send_text(ctx.chat_id(), text))
    }
}
