//! MessageLedger - log append-only dei messaggi di ogni conversazione
//!
//! Il ledger conosce solo integrità referenziale e autorizzazione: lo stato della
//! conversazione (open/closed/whatsapp) è una policy del livello di trasporto,
//! che deve controllarlo prima di chiamare `append`.

use super::{ConciergeError, ConversationRegistry};
use crate::core::Actor;
use crate::dtos::CreateMessageDTO;
use crate::entities::{self, Message};
use crate::repositories::{ConversationStore, Gateway, MessageStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

#[derive(Clone)]
pub struct MessageLedger {
    store: Arc<Gateway>,
    registry: ConversationRegistry,
}

impl MessageLedger {
    pub fn new(store: Arc<Gateway>, registry: ConversationRegistry) -> Self {
        Self { store, registry }
    }

    /// Aggiunge un messaggio e aggiorna `updated_at` della conversazione.
    ///
    /// Le due scritture sono chiamate separate allo store: se il processo cade
    /// in mezzo il messaggio resta e la recency si sistema al prossimo append.
    #[instrument(skip(self, sender, content), fields(sender_id = %sender.id))]
    pub async fn append(
        &self,
        conversation_id: &str,
        sender: &Actor,
        content: &str,
    ) -> Result<Message, ConciergeError> {
        // validazione prima di qualunque accesso allo store
        let content = content.trim();
        if content.is_empty() {
            return Err(ConciergeError::Validation(
                "Message content must not be empty".to_string(),
            ));
        }

        let mut data = CreateMessageDTO {
            conversation_id: conversation_id.to_string(),
            sender_id: sender.id.clone(),
            sender_role: sender.sender_role(),
            content: content.to_string(),
            created_at: entities::now(),
        };
        data.validate()?;

        let conversation = self.registry.authorize(sender, conversation_id).await?;

        // mai prima dell'ultimo aggiornamento: updated_at >= created_at di ogni messaggio
        data.created_at = data.created_at.max(conversation.updated_at);

        let message = self.store.append_message(&data).await?;
        self.store
            .touch_conversation(conversation_id, message.created_at)
            .await?;

        info!("Message {} appended to conversation {}", message.id, conversation_id);
        Ok(message)
    }

    /// Messaggi della conversazione in ordine cronologico (pareggi in ordine di scrittura)
    #[instrument(skip(self))]
    pub async fn list_for(&self, conversation_id: &str) -> Result<Vec<Message>, ConciergeError> {
        let messages = self
            .store
            .find_messages_by_conversation(conversation_id)
            .await?;
        debug!("Found {} messages", messages.len());
        Ok(messages)
    }

    /// Ultimo messaggio di ogni conversazione, per le anteprime della lista
    pub async fn latest_per_conversation(
        &self,
    ) -> Result<HashMap<String, Message>, ConciergeError> {
        Ok(self.store.latest_message_per_conversation().await?)
    }
}
