use std::{future::IntoFuture, time::Duration};

use async_trait::async_trait;
use teloxide::{
    adaptors::Throttle,
    prelude::*,
    types::{ChatId, MessageId},
    RequestError,
};

use super::{ChatMember, Gateway, GatewayError};

#[derive(Clone)]
pub struct TelegramGateway {
    bot: Throttle<Bot>,
    timeout: Duration,
}

impl TelegramGateway {
    pub fn new(bot: Throttle<Bot>, timeout: Duration) -> Self {
        Self { bot, timeout }
    }

    async fn bounded<T, F>(&self, request: F) -> Result<T, GatewayError>
    where
        F: IntoFuture<Output = Result<T, RequestError>>,
    {
        match tokio::time::timeout(self.timeout, request.into_future()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(GatewayError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl Gateway for TelegramGateway {
    async fn chat_administrators(&self, chat_id: ChatId) -> Result<Vec<ChatMember>, GatewayError> {
        let members = self.bounded(self.bot.get_chat_administrators(chat_id)).await?;

        Ok(members
            .into_iter()
            .filter(|member| !member.user.is_bot)
            .map(|member| ChatMember {
                id: member.user.id,
                username: member.user.username,
                first_name: member.user.first_name,
            })
            .collect())
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), GatewayError> {
        self.bounded(self.bot.delete_message(chat_id, message_id)).await?;
        Ok(())
    }
}
