//! Conversation entity - Entità conversazione del concierge

use super::enums::ConversationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    // id dell'attore proprietario: account id oppure "guest-<token>"
    pub owner_id: String,
    pub subject: String,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    // aggiornato ad ogni append di messaggio e ad ogni cambio di stato
    pub updated_at: DateTime<Utc>,
}
