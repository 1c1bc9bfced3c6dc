//! Conversation DTOs - Data Transfer Objects per conversazioni

use crate::entities::{Conversation, SenderRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO per creare una nuova conversazione nello store (id assegnato dallo store)
#[derive(Debug, Clone)]
pub struct CreateConversationDTO {
    pub owner_id: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

/// Conversazione arricchita per la vista elenco: proprietario e anteprima dell'ultimo messaggio
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    // vuoti per i proprietari guest
    pub owner_name: String,
    pub owner_email: String,
    pub last_message: Option<String>,
    pub last_message_role: Option<SenderRole>,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl ConversationSummary {
    /// Istante dell'ultima attività: ultimo messaggio se presente, altrimenti la creazione
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_message_at.unwrap_or(self.conversation.created_at)
    }
}

/// Body di POST /chat
#[derive(Deserialize, Debug, Default, Validate)]
pub struct CreateConversationRequest {
    #[validate(length(max = 200, message = "Subject must be at most 200 characters"))]
    pub subject: Option<String>,
}

/// Body di PATCH /chat/messages (solo staff)
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub conversation_id: Option<String>,
    // stringa libera: il parsing avviene nel service per rispondere 400 e non 422
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ConversationResponse {
    pub conversation: Conversation,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationSummary>,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self { conversation }
    }
}

