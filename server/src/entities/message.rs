//! Message entity - Entità messaggio (append-only)

use super::enums::SenderRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    // derivato dal ruolo dell'attore al momento dell'invio, mai ricalcolato
    pub sender_role: SenderRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
