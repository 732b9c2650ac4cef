mod context;
mod directive;
pub mod handlers;
mod parse;

pub use context::{CommandContext, Inbound, Sender};
pub use directive::{DeliveryMethod, Directive};
pub use handlers::{CommandHandler, CommandRegistry, TriggerDeletion};
pub use parse::ParsedCommand;

use chrono::{DateTime, Utc};

use crate::{
    command,
    error::{BotError, BotResult},
    service::{conversation::Flow, ServiceRegistry},
};

/// Turns one inbound message into one directive.
///
/// Everything that touches a member's state runs under that member's lock, so messages
/// from the same person are handled one at a time while other members proceed in
/// parallel.
pub struct CommandRouter {
    services: ServiceRegistry,
    commands: CommandRegistry,
    bot_username: String,
}

impl CommandRouter {
    pub fn new(services: ServiceRegistry, commands: CommandRegistry, bot_username: impl Into<String>) -> Self {
        Self {
            services,
            commands,
            bot_username: bot_username.into(),
        }
    }

    #[cfg(test)]
    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Like [`route`](Self::route), but a failure becomes a generic reply in the chat.
    pub async fn process(&self, inbound: &Inbound) -> Directive {
        match self.route(inbound).await {
            Ok(directive) => directive,
            Err(e) => {
                error!(
                    "Failed to handle {:?} from {} in chat {}: {}",
                    inbound.text, inbound.sender.id, inbound.chat_id, e
                );
                Directive::send_text(inbound.chat_id, t!("errors.generic")).reply_to(inbound.message_id)
            }
        }
    }

    pub async fn route(&self, inbound: &Inbound) -> BotResult<Directive> {
        self.route_at(inbound, Utc::now()).await
    }

    pub async fn route_at(&self, inbound: &Inbound, now: DateTime<Utc>) -> BotResult<Directive> {
        let key = inbound.key();
        let sender_guard = self.services.locks.lock(key).await;

        self.register_sender(inbound).await;
        self.services.stats.record_message(key).await;

        let parsed = ParsedCommand::parse(&inbound.text, &self.bot_username);

        if let Some(state) = self.services.conversations.active(key, now) {
            let is_cancel = parsed.as_ref().is_some_and(|cmd| cmd.token == command::CANCEL);
            return match state.flow {
                Flow::Homework(_) if is_cancel => Ok(self
                    .services
                    .homework
                    .cancel(key)
                    .map(|text| Directive::send_text(inbound.chat_id, text).reply_to(inbound.message_id))
                    .unwrap_or_else(|| Directive::no_op(inbound.chat_id))),
                Flow::Homework(_) => {
                    let reply = self.services.homework.continue_flow(key, &inbound.text, now).await?;
                    let directive = if reply.buttons.is_empty() {
                        Directive::send_text(inbound.chat_id, reply.text)
                    } else {
                        Directive::with_keyboard(inbound.chat_id, reply.text, reply.buttons)
                    };
                    Ok(directive.reply_to(inbound.message_id))
                }
            };
        }

        let Some(parsed) = parsed else {
            return Ok(Directive::no_op(inbound.chat_id));
        };

        let Some(handler) = self.commands.resolve(&parsed.token) else {
            debug!("Ignoring unknown command {}", parsed.token);
            return Ok(Directive::no_op(inbound.chat_id));
        };

        if parsed.args.is_some() && !handler.accepts_arguments() {
            debug!("Ignoring {} with unexpected arguments", parsed.token);
            return Ok(Directive::no_op(inbound.chat_id));
        }

        self.delete_trigger(inbound, handler.trigger_deletion()).await?;

        let stats = self.services.stats.snapshot(key).await;
        let _sender_guard = handler.locks_sender().then_some(sender_guard);

        let ctx = CommandContext {
            inbound,
            args: parsed.args.as_deref(),
            stats,
            services: &self.services,
            now,
        };

        handler.handle(&ctx).await
    }

    /// Keeps the stored name and handle in line with what the platform reports.
    async fn register_sender(&self, inbound: &Inbound) {
        let sender = &inbound.sender;
        let mut user = match self.services.store.get_user(sender.id, inbound.chat_id).await {
            Ok(user) => user,
            Err(e) => {
                warn!("Failed to load user {} in chat {}: {}", sender.id, inbound.chat_id, e);
                return;
            }
        };

        if user.username == sender.username
            && user.first_name == sender.first_name
            && user.last_name == sender.last_name
        {
            return;
        }

        user.username = sender.username.clone();
        user.first_name = sender.first_name.clone();
        user.last_name = sender.last_name.clone();

        if let Err(e) = self.services.store.save_user(&user).await {
            warn!("Failed to save user {} in chat {}: {}", sender.id, inbound.chat_id, e);
        }
    }

    async fn delete_trigger(&self, inbound: &Inbound, policy: TriggerDeletion) -> BotResult<()> {
        if policy == TriggerDeletion::Keep {
            return Ok(());
        }

        let result = self
            .services
            .gateway
            .delete_message(inbound.chat_id, inbound.message_id)
            .await;

        match (result, policy) {
            (Ok(()), _) => Ok(()),
            (Err(e), TriggerDeletion::Required) => Err(BotError::from(e)),
            (Err(e), _) => {
                warn!(
                    "Failed to delete message {} in chat {}: {}",
                    inbound.message_id.0, inbound.chat_id, e
                );
                Ok(())
            }
        }
    }
}
