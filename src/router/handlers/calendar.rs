use async_trait::async_trait;

use super::CommandHandler;
use crate::{
    command,
    error::BotResult,
    router::{CommandContext, Directive},
};

/// Binds the chat to a calendar. Chat administrators only.
pub struct AddCalendarHandler;

#[async_trait]
impl CommandHandler for AddCalendarHandler {
    fn token(&self) -> &'static str {
        command::ADD_CALENDAR
    }

    fn accepts_arguments(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let chat_id = ctx.chat_id();
        let sender = ctx.inbound.sender.id;

        if !ctx.services.permissions.is_chat_admin(sender, chat_id).await {
            info!("{} may not change the calendar of chat {}", sender, chat_id);
            return Ok(Directive::send_text(chat_id, t!("calendar.forbidden")));
        }

        let Some(calendar_id) = ctx.args.and_then(|args| args.split_whitespace().next()) else {
            return Ok(Directive::send_text(chat_id, t!("calendar.usage")));
        };

        ctx.services.store.set_calendar_id(chat_id, calendar_id).await?;
        info!("Chat {} bound to calendar {}", chat_id, calendar_id);

        Ok(Directive::send_text(chat_id, t!("calendar.updated")))
    }
}

pub struct ScheduleHandler;

#[async_trait]
impl CommandHandler for ScheduleHandler {
    fn token(&self) -> &'static str {
        command::SCHEDULE
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let chat_id = ctx.chat_id();

        let Some(calendar_id) = ctx.services.store.calendar_id(chat_id).await? else {
            return Ok(Directive::send_text(chat_id, t!("calendar.missing")));
        };

        match ctx.services.content.schedule(&calendar_id).await {
            Ok(schedule) => Ok(Directive::send_text(chat_id, schedule).markdown()),
            Err(e) => {
                error!("Failed to fetch schedule for calendar {}: {}", calendar_id, e);
                Ok(Directive::send_text(
                    chat_id,
                    t!("calendar.fetch_failed", calendar_id = calendar_id),
                ))
            }
        }
    }
}
