use teloxide::{
    adaptors::Throttle,
    payloads::{SendMessageSetters, SendPhotoSetters},
    prelude::Requester,
    types::{InputFile, ReplyParameters},
    Bot,
};

use super::keyboard::reply_keyboard;
use crate::{
    error::HandlerResult,
    router::{DeliveryMethod, Directive},
};

/// Sends a directive. Delivery is at most once: a failed send is reported, not retried.
pub async fn deliver(bot: &Throttle<Bot>, directive: Directive) -> HandlerResult<()> {
    let Directive {
        chat_id,
        method,
        parse_mode,
        reply_to,
    } = directive;
    let reply_parameters = reply_to.map(|id| ReplyParameters::new(id).allow_sending_without_reply());

    match method {
        DeliveryMethod::NoOp => {}
        DeliveryMethod::SendText(text) => {
            let mut request = bot.send_message(chat_id, text);
            if let Some(mode) = parse_mode {
                request = request.parse_mode(mode);
            }
            if let Some(parameters) = reply_parameters {
                request = request.reply_parameters(parameters);
            }
            request.await?;
        }
        DeliveryMethod::SendTextWithKeyboard { text, buttons } => {
            let mut request = bot
                .send_message(chat_id, text)
                .reply_markup(reply_keyboard(buttons));
            if let Some(mode) = parse_mode {
                request = request.parse_mode(mode);
            }
            if let Some(parameters) = reply_parameters {
                request = request.reply_parameters(parameters);
            }
            request.await?;
        }
        DeliveryMethod::SendPhoto { url, caption } => {
            let mut request = bot.send_photo(chat_id, InputFile::url(url.parse()?));
            if let Some(caption) = caption {
                request = request.caption(caption);
            }
            if let Some(mode) = parse_mode {
                request = request.parse_mode(mode);
            }
            if let Some(parameters) = reply_parameters {
                request = request.reply_parameters(parameters);
            }
            request.await?;
        }
    }

    Ok(())
}
