use crate::models::ConversationStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Risposta non 2xx; `message` è il campo `error` del body quando presente
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("message content must not be empty")]
    EmptyMessage,

    #[error("no conversation is open")]
    NoActiveConversation,

    #[error("conversation is {0} and no longer accepts messages")]
    ConversationClosed(ConversationStatus),
}
