use teloxide::{adaptors::Throttle, prelude::Requester, types::BotCommand, Bot};

use crate::error::HandlerResult;

pub const GROW: &str = "/grow";
pub const TOP: &str = "/top";
pub const DUEL: &str = "/duel";
pub const HP: &str = "/hp";
pub const ASK: &str = "/ask";
pub const JOKE: &str = "/joke";
pub const XKCD: &str = "/xkcd";
pub const FLIP: &str = "/flip";
pub const ALL: &str = "/all";
pub const SCHEDULE: &str = "/schedule";
pub const ADD_CALENDAR: &str = "/add_calendar";
pub const ADD_HOMEWORK: &str = "/add_homework";
pub const HOMEWORK: &str = "/homework";
pub const DELETE_HOMEWORK: &str = "/delete_homework";
pub const CANCEL: &str = "/cancel";
pub const MY_STATS: &str = "/my_stats";
pub const CHAT_STATS: &str = "/chat_stats";
pub const CHAT_ID: &str = "/chat_id";
pub const HELP: &str = "/help";

// operator only, never advertised
pub const SET_GROWTH: &str = "/set_growth";
pub const BROADCAST: &str = "/broadcast";

/// Commands shown in the client's command menu and in `/help`.
pub fn user_commands() -> Vec<BotCommand> {
    [
        (GROW, t!("commands.description.grow")),
        (TOP, t!("commands.description.top")),
        (DUEL, t!("commands.description.duel")),
        (HP, t!("commands.description.hp")),
        (ASK, t!("commands.description.ask")),
        (JOKE, t!("commands.description.joke")),
        (XKCD, t!("commands.description.xkcd")),
        (FLIP, t!("commands.description.flip")),
        (ALL, t!("commands.description.all")),
        (SCHEDULE, t!("commands.description.schedule")),
        (ADD_CALENDAR, t!("commands.description.add_calendar")),
        (ADD_HOMEWORK, t!("commands.description.add_homework")),
        (HOMEWORK, t!("commands.description.homework")),
        (DELETE_HOMEWORK, t!("commands.description.delete_homework")),
        (CANCEL, t!("commands.description.cancel")),
        (MY_STATS, t!("commands.description.my_stats")),
        (CHAT_STATS, t!("commands.description.chat_stats")),
        (CHAT_ID, t!("commands.description.chat_id")),
        (HELP, t!("commands.description.help")),
    ]
    .into_iter()
    .map(|(token, description)| BotCommand::new(token.trim_start_matches('/'), description))
    .collect()
}

pub async fn setup_user_commands(bot: &Throttle<Bot>) -> HandlerResult<()> {
    bot.delete_my_commands().await?;
    bot.set_my_commands(user_commands()).await?;
    Ok(())
}
