use std::time::Duration;

use libsql::errors::Error as TursoError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Turso error: {0}")]
    Turso(#[from] TursoError),
    #[error("Storage call timed out after {0:?}")]
    Timeout(Duration),
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
    #[error("Other error: {0}")]
    Other(String),
}
