//! Tassonomia degli errori del concierge

use crate::entities::ConversationStatus;
use crate::repositories::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConciergeError {
    /// L'attore non possiede la conversazione e non è staff.
    /// Volutamente senza dettagli per non confermare nulla a chi sonda.
    #[error("forbidden")]
    Forbidden,

    #[error("conversation {0} not found")]
    NotFound(String),

    /// Input rifiutato prima di qualunque accesso allo store
    #[error("{0}")]
    Validation(String),

    /// Invio verso una conversazione in stato terminale
    #[error("conversation is {0} and no longer accepts messages")]
    ConversationClosed(ConversationStatus),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

impl From<validator::ValidationErrors> for ConciergeError {
    fn from(err: validator::ValidationErrors) -> Self {
        ConciergeError::Validation(err.to_string())
    }
}
