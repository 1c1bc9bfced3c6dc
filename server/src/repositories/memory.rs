//! MemoryStore - Backend effimero in-process
//!
//! Istanza costruita esplicitamente e posseduta da chi la usa (AppState o test),
//! nessuno stato globale. Niente sopravvive al riavvio del processo: è il fallback
//! per sviluppo e test, non una garanzia di durabilità.

use super::{ConversationStore, MessageStore, StoreError, UserStore};
use crate::dtos::{CreateConversationDTO, CreateMessageDTO, CreateUserDTO};
use crate::entities::{Conversation, ConversationStatus, Message, User};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    conversations: DashMap<String, Conversation>,
    // log append-only: l'ordine del Vec è l'ordine di scrittura
    messages: RwLock<Vec<Message>>,
    users: DashMap<String, User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for MemoryStore {
    #[instrument(skip(self, data), fields(owner_id = %data.owner_id))]
    async fn create_conversation(
        &self,
        data: &CreateConversationDTO,
    ) -> Result<Conversation, StoreError> {
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            owner_id: data.owner_id.clone(),
            subject: data.subject.clone(),
            status: ConversationStatus::Open,
            created_at: data.created_at,
            updated_at: data.created_at,
        };
        self.conversations
            .insert(conversation.id.clone(), conversation.clone());
        debug!("Conversation {} stored in memory", conversation.id);
        Ok(conversation)
    }

    async fn find_conversation(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        Ok(self.conversations.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_conversations_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Conversation>, StoreError> {
        Ok(self
            .conversations
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_all_conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        Ok(self
            .conversations
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn update_conversation_status(
        &self,
        id: &str,
        status: ConversationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Conversation>, StoreError> {
        // get_mut tiene il lock dello shard solo per la durata dell'aggiornamento
        Ok(self.conversations.get_mut(id).map(|mut entry| {
            entry.status = status;
            entry.updated_at = entry.updated_at.max(at);
            entry.value().clone()
        }))
    }

    async fn touch_conversation(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(mut entry) = self.conversations.get_mut(id) {
            entry.updated_at = entry.updated_at.max(at);
        }
        Ok(())
    }
}

impl MessageStore for MemoryStore {
    #[instrument(skip(self, data), fields(conversation_id = %data.conversation_id))]
    async fn append_message(&self, data: &CreateMessageDTO) -> Result<Message, StoreError> {
        if !self.conversations.contains_key(&data.conversation_id) {
            return Err(StoreError::MissingConversation(data.conversation_id.clone()));
        }

        let message = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: data.conversation_id.clone(),
            sender_id: data.sender_id.clone(),
            sender_role: data.sender_role,
            content: data.content.clone(),
            created_at: data.created_at,
        };
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn find_messages_by_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<Message>, StoreError> {
        let mut messages: Vec<Message> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        // sort stabile: a parità di timestamp resta l'ordine di scrittura
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn latest_message_per_conversation(
        &self,
    ) -> Result<HashMap<String, Message>, StoreError> {
        let mut latest: HashMap<String, Message> = HashMap::new();
        for message in self.messages.read().await.iter() {
            let newer = latest
                .get(&message.conversation_id)
                .is_none_or(|current| message.created_at >= current.created_at);
            if newer {
                latest.insert(message.conversation_id.clone(), message.clone());
            }
        }
        Ok(latest)
    }
}

impl UserStore for MemoryStore {
    #[instrument(skip(self, data), fields(email = %data.email))]
    async fn create_user(&self, data: &CreateUserDTO) -> Result<User, StoreError> {
        if self.users.iter().any(|entry| entry.email == data.email) {
            return Err(StoreError::DuplicateEmail(data.email.clone()));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: data.name.clone(),
            email: data.email.clone(),
            password: data.password.clone(),
            role: data.role,
            company: data.company.clone(),
            phone: data.phone.clone(),
            created_at: data.created_at,
            updated_at: data.created_at,
        };
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }
}
