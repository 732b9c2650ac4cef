use teloxide::{adaptors::Throttle, types::Message, Bot};

use super::deliver;
use crate::{
    error::HandlerResult,
    router::{Inbound, Sender},
    state::AppState,
};

/// Text messages from people. Everything else never reaches the router.
pub fn to_inbound(msg: Message) -> Option<Inbound> {
    let text = msg.text()?;
    let from = msg.from.as_ref().filter(|user| !user.is_bot)?;

    Some(Inbound {
        chat_id: msg.chat.id,
        sender: Sender {
            id: from.id,
            username: from.username.clone(),
            first_name: from.first_name.clone(),
            last_name: from.last_name.clone(),
        },
        message_id: msg.id,
        text: text.to_string(),
    })
}

pub async fn handle_inbound(bot: Throttle<Bot>, state: AppState, inbound: Inbound) -> HandlerResult<()> {
    debug!("Inbound from {} in chat {}: {:?}", inbound.sender.id, inbound.chat_id, inbound.text);

    let directive = state.router.process(&inbound).await;
    deliver(&bot, directive).await?;

    Ok(())
}
