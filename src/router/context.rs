use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, MessageId, UserId};

use crate::{
    service::ServiceRegistry,
    storage::{MemberKey, UserStats},
};

/// Who sent the message, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// One text message from a chat, stripped of everything the router does not need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub chat_id: ChatId,
    pub sender: Sender,
    pub message_id: MessageId,
    pub text: String,
}

impl Inbound {
    pub fn key(&self) -> MemberKey {
        (self.chat_id, self.sender.id)
    }
}

/// Everything a command handler gets to see.
pub struct CommandContext<'a> {
    pub inbound: &'a Inbound,
    pub args: Option<&'a str>,
    /// The sender's counters as they were before this command ran.
    pub stats: UserStats,
    pub services: &'a ServiceRegistry,
    pub now: DateTime<Utc>,
}

impl CommandContext<'_> {
    pub fn chat_id(&self) -> ChatId {
        self.inbound.chat_id
    }

    pub fn sender_key(&self) -> MemberKey {
        self.inbound.key()
    }
}
