use shuttle_runtime::Error as ShuttleError;

use crate::config::ConfigError;
use crate::gateway::GatewayError;
use crate::service::content::FetchError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Dialogue state error: {0}")]
    DialogueStateError(String),

    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<BotError> for ShuttleError {
    fn from(error: BotError) -> Self {
        ShuttleError::Custom(anyhow::anyhow!(error))
    }
}

impl From<anyhow::Error> for BotError {
    fn from(error: anyhow::Error) -> Self {
        BotError::Other(error)
    }
}

pub type HandlerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub type BotResult<T> = Result<T, BotError>;
