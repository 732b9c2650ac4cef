mod telegram;

pub use telegram::TelegramGateway;

use std::time::Duration;

use async_trait::async_trait;
use teloxide::{
    types::{ChatId, MessageId, UserId},
    RequestError,
};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request error: {0}")]
    Request(#[from] RequestError),
    #[error("gateway call timed out after {0:?}")]
    Timeout(Duration),
    #[error("gateway error: {0}")]
    Other(String),
}

/// A chat member as reported by the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMember {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
}

/// The subset of the messaging platform the command router talks to directly.
/// Outbound replies are returned as directives instead and delivered by the bot glue.
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    async fn chat_administrators(&self, chat_id: ChatId) -> Result<Vec<ChatMember>, GatewayError>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), GatewayError>;
}
