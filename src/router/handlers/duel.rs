use async_trait::async_trait;

use super::{CommandHandler, TriggerDeletion};
use crate::{
    command,
    error::BotResult,
    router::{CommandContext, Directive},
    utils::parse_handle,
};

pub struct DuelHandler;

#[async_trait]
impl CommandHandler for DuelHandler {
    fn token(&self) -> &'static str {
        command::DUEL
    }

    fn accepts_arguments(&self) -> bool {
        true
    }

    fn trigger_deletion(&self) -> TriggerDeletion {
        TriggerDeletion::Required
    }

    fn locks_sender(&self) -> bool {
        false
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let services = ctx.services;
        let chat_id = ctx.chat_id();
        let sender = &ctx.inbound.sender;

        let Some(handle) = ctx.args.and_then(parse_handle) else {
            return Ok(Directive::send_text(chat_id, t!("duel.usage")));
        };

        let is_self = sender
            .username
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(handle));
        if is_self {
            return Ok(Directive::send_text(chat_id, t!("duel.self")));
        }

        let target = services
            .store
            .users_by_chat(chat_id)
            .await?
            .into_iter()
            .find(|user| {
                user.username
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(handle))
            });

        let Some(target) = target else {
            return Ok(Directive::send_text(chat_id, t!("duel.target_not_found", handle = handle)));
        };
        if target.user_id == sender.id {
            return Ok(Directive::send_text(chat_id, t!("duel.self")));
        }

        let _guards = services.locks.lock_pair(ctx.sender_key(), target.key()).await;

        let attacker = services.store.get_user(sender.id, chat_id).await?;
        let mut defender = services.store.get_user(target.user_id, chat_id).await?;
        let outcome = services.duel.strike(&attacker, &mut defender);

        services.store.save_user(&defender).await?;
        services.stats.record_duel(chat_id, &outcome).await;

        info!(
            "Duel in chat {}: {} hit {} for {} (knocked out: {})",
            chat_id, outcome.attacker, outcome.defender, outcome.damage, outcome.knocked_out
        );

        let text = if outcome.knocked_out {
            t!(
                "duel.knockout",
                attacker = attacker.mention(),
                defender = defender.mention(),
                damage = outcome.damage,
                health = defender.health
            )
        } else {
            t!(
                "duel.hit",
                attacker = attacker.mention(),
                defender = defender.mention(),
                damage = outcome.damage,
                health = outcome.remaining_health
            )
        };

        Ok(Directive::send_text(chat_id, text))
    }
}

pub struct HealthHandler;

#[async_trait]
impl CommandHandler for HealthHandler {
    fn token(&self) -> &'static str {
        command::HP
    }

    fn trigger_deletion(&self) -> TriggerDeletion {
        TriggerDeletion::BestEffort
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let (chat_id, user_id) = ctx.sender_key();
        let user = ctx.services.store.get_user(user_id, chat_id).await?;

        Ok(Directive::send_text(
            chat_id,
            t!(
                "duel.health",
                name = user.mention(),
                health = user.health,
                max = ctx.services.duel.max_health()
            ),
        ))
    }
}
