//! StoreError - Errori del Persistence Gateway, comuni ai due backend

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Integrità referenziale: il messaggio punta a una conversazione inesistente
    #[error("conversation {0} does not exist")]
    MissingConversation(String),

    #[error("email {0} is already registered")]
    DuplicateEmail(String),

    #[error("stored timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

impl StoreError {
    /// true quando lo store è momentaneamente irraggiungibile (pool esaurito o chiuso)
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed)
        )
    }
}
