use std::sync::Arc;

use teloxide::types::{ChatId, UserId};

use crate::gateway::{ChatMember, Gateway};

/// Answers who may run privileged commands. Holds no cached roster.
#[derive(Clone)]
pub struct PermissionGuard {
    gateway: Arc<dyn Gateway>,
    operators: Vec<UserId>,
}

impl PermissionGuard {
    pub fn new(gateway: Arc<dyn Gateway>, operators: Vec<UserId>) -> Self {
        info!("Initializing PermissionGuard with {} operator(s)", operators.len());
        Self { gateway, operators }
    }

    /// Fetches the roster on every call. A failed fetch denies access.
    pub async fn is_chat_admin(&self, user_id: UserId, chat_id: ChatId) -> bool {
        match self.gateway.chat_administrators(chat_id).await {
            Ok(admins) => admins.iter().any(|admin| admin.id == user_id),
            Err(e) => {
                error!("Failed to fetch administrators of chat {}: {}", chat_id, e);
                false
            }
        }
    }

    pub async fn administrators(&self, chat_id: ChatId) -> Vec<ChatMember> {
        self.gateway.chat_administrators(chat_id).await.unwrap_or_else(|e| {
            warn!("Failed to fetch administrators of chat {}: {}", chat_id, e);
            Vec::new()
        })
    }

    pub fn is_operator(&self, user_id: UserId) -> bool {
        self.operators.contains(&user_id)
    }
}
