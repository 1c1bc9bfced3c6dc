//! Message DTOs - Data Transfer Objects per messaggi

use crate::entities::{ConversationStatus, Message, SenderRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO per creare un nuovo messaggio (senza id, assegnato dallo store)
#[derive(Debug, Clone, Validate)]
pub struct CreateMessageDTO {
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_role: SenderRole,

    #[validate(length(min = 1, max = 5000, message = "Message content must be between 1 and 5000 characters"))]
    pub content: String,

    pub created_at: DateTime<Utc>,
}

/// Body di POST /chat/messages
#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub conversation_id: Option<String>,

    #[validate(length(max = 5000, message = "Message content must be at most 5000 characters"))]
    pub content: Option<String>,
}

impl SendMessageRequest {
    /// Il limite di lunghezza vale sul contenuto senza spazi di contorno
    pub fn trim_content(&mut self) {
        if let Some(content) = self.content.as_mut() {
            *content = content.trim().to_string();
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: Message,
}

/// Risposta di GET /chat/messages: include lo stato così il client
/// può disabilitare l'invio senza una seconda chiamata
#[derive(Serialize, Deserialize, Debug)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
    pub status: ConversationStatus,
}
