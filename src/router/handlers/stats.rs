use async_trait::async_trait;

use super::CommandHandler;
use crate::{
    command,
    error::BotResult,
    router::{CommandContext, Directive},
    storage::StatCounters,
};

fn render(counters: &StatCounters) -> String {
    t!(
        "stats.counters",
        messages = counters.messages,
        growth_up = counters.growth_up,
        growth_down = counters.growth_down,
        yes_votes = counters.yes_votes,
        no_votes = counters.no_votes,
        duels = counters.duels,
        duels_won = counters.duels_won,
        duels_lost = counters.duels_lost,
        kills = counters.kills,
        deaths = counters.deaths
    )
    .to_string()
}

pub struct MyStatsHandler;

#[async_trait]
impl CommandHandler for MyStatsHandler {
    fn token(&self) -> &'static str {
        command::MY_STATS
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let text = format!(
            "{}\n{}",
            t!("stats.user_title", name = ctx.inbound.sender.first_name),
            render(&ctx.stats.counters)
        );
        Ok(Directive::send_text(ctx.chat_id(), text).reply_to(ctx.inbound.message_id))
    }
}

pub struct ChatStatsHandler;

#[async_trait]
impl CommandHandler for ChatStatsHandler {
    fn token(&self) -> &'static str {
        command::CHAT_STATS
    }

    async fn handle(&self, ctx: &CommandContext<'_>) -> BotResult<Directive> {
        let totals = ctx.services.stats.chat_totals(ctx.chat_id()).await?;
        let text = format!("{}\n{}", t!("stats.chat_title"), render(&totals));
        Ok(Directive::send_text(ctx.chat_id(), text).reply_to(ctx.inbound.message_id))
    }
}
