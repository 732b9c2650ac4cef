mod admin;
mod calendar;
mod duel;
mod fun;
mod growth;
mod homework;
mod info;
mod stats;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use super::{CommandContext, Directive};
use crate::{command, error::BotResult};

/// What happens to the message that triggered a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDeletion {
    Keep,
    /// Delete it, log and carry on if that fails.
    BestEffort,
    /// Delete it before anything else happens, or fail the command.
    Required,
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn token(&self) -> &'static str;

    fn accepts_arguments(&self) -> bool {
        false
    }

    fn trigger_deletion(&self) -> TriggerDeletion {
        TriggerDeletion::Keep
    }

    /// Whether the router keeps the sender's lock while the handler runs. Handlers that
    /// touch other members take their own locks instead.
    fn locks_sender(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive>;
}

#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full command vocabulary of the bot.
    pub fn with_default_commands() -> Self {
        let mut registry = Self::new();
        registry
            .register(growth::GrowHandler)
            .register(growth::TopHandler)
            .register(duel::DuelHandler)
            .register(duel::HealthHandler)
            .register(fun::AskHandler)
            .register(fun::JokeHandler)
            .register(fun::ComicHandler)
            .register(fun::FlipHandler)
            .register(fun::CallAllHandler)
            .register(calendar::ScheduleHandler)
            .register(calendar::AddCalendarHandler)
            .register(homework::AddHomeworkHandler)
            .register(homework::ListHomeworkHandler)
            .register(homework::DeleteHomeworkHandler)
            .register(stats::MyStatsHandler)
            .register(stats::ChatStatsHandler)
            .register(info::ChatIdHandler)
            .register(info::HelpHandler)
            .register(admin::SetGrowthHandler)
            .register(admin::BroadcastHandler);

        info!("Registered {} commands", registry.handlers.len());
        registry
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) -> &mut Self {
        let token = handler.token();
        debug_assert!(token != command::CANCEL, "cancel is handled by the router");
        if self.handlers.insert(token, Arc::new(handler)).is_some() {
            warn!("Command {} registered twice, keeping the last one", token);
        }
        self
    }

    pub fn resolve(&self, token: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_vocabulary() {
        let registry = CommandRegistry::with_default_commands();

        for token in [
            command::GROW,
            command::TOP,
            command::DUEL,
            command::HP,
            command::ASK,
            command::JOKE,
            command::XKCD,
            command::FLIP,
            command::ALL,
            command::SCHEDULE,
            command::ADD_CALENDAR,
            command::ADD_HOMEWORK,
            command::HOMEWORK,
            command::DELETE_HOMEWORK,
            command::MY_STATS,
            command::CHAT_STATS,
            command::CHAT_ID,
            command::HELP,
            command::SET_GROWTH,
            command::BROADCAST,
        ] {
            assert!(registry.resolve(token).is_some(), "{} is not registered", token);
        }
        assert!(registry.resolve(command::CANCEL).is_none());
    }

    #[test]
    fn test_spend_action_commands_delete_their_trigger() {
        let registry = CommandRegistry::with_default_commands();
        let policy = |token| registry.resolve(token).map(|h| h.trigger_deletion());

        assert_eq!(policy(command::DUEL), Some(TriggerDeletion::Required));
        assert_eq!(policy(command::GROW), Some(TriggerDeletion::BestEffort));
        assert_eq!(policy(command::HP), Some(TriggerDeletion::BestEffort));
        assert_eq!(policy(command::TOP), Some(TriggerDeletion::Keep));
    }
}
