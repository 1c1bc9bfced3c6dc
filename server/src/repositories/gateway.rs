//! Gateway - punto d'accesso unico ai dati, con il backend scelto all'avvio
//!
//! Chi sta sopra (registry, ledger, auth) vede solo il Gateway e non sa quale
//! backend c'è sotto. La scelta avviene una volta sola da configurazione.

use super::{ConversationStore, MemoryStore, MessageStore, SqlStore, StoreError, UserStore};
use crate::dtos::{CreateConversationDTO, CreateMessageDTO, CreateUserDTO};
use crate::entities::{Conversation, ConversationStatus, Message, User};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub enum Gateway {
    /// SQLite, sopravvive ai riavvii
    Durable(SqlStore),
    /// in-process, solo per sviluppo e test
    Ephemeral(MemoryStore),
}

impl Gateway {
    pub fn ephemeral() -> Self {
        Gateway::Ephemeral(MemoryStore::new())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Gateway::Durable(_) => "durable",
            Gateway::Ephemeral(_) => "ephemeral",
        }
    }
}

impl From<SqlStore> for Gateway {
    fn from(store: SqlStore) -> Self {
        Gateway::Durable(store)
    }
}

impl From<MemoryStore> for Gateway {
    fn from(store: MemoryStore) -> Self {
        Gateway::Ephemeral(store)
    }
}

impl ConversationStore for Gateway {
    async fn create_conversation(
        &self,
        data: &CreateConversationDTO,
    ) -> Result<Conversation, StoreError> {
        match self {
            Gateway::Durable(store) => store.create_conversation(data).await,
            Gateway::Ephemeral(store) => store.create_conversation(data).await,
        }
    }

    async fn find_conversation(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        match self {
            Gateway::Durable(store) => store.find_conversation(id).await,
            Gateway::Ephemeral(store) => store.find_conversation(id).await,
        }
    }

    async fn find_conversations_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Conversation>, StoreError> {
        match self {
            Gateway::Durable(store) => store.find_conversations_by_owner(owner_id).await,
            Gateway::Ephemeral(store) => store.find_conversations_by_owner(owner_id).await,
        }
    }

    async fn find_all_conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        match self {
            Gateway::Durable(store) => store.find_all_conversations().await,
            Gateway::Ephemeral(store) => store.find_all_conversations().await,
        }
    }

    async fn update_conversation_status(
        &self,
        id: &str,
        status: ConversationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Conversation>, StoreError> {
        match self {
            Gateway::Durable(store) => store.update_conversation_status(id, status, at).await,
            Gateway::Ephemeral(store) => store.update_conversation_status(id, status, at).await,
        }
    }

    async fn touch_conversation(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        match self {
            Gateway::Durable(store) => store.touch_conversation(id, at).await,
            Gateway::Ephemeral(store) => store.touch_conversation(id, at).await,
        }
    }
}

impl MessageStore for Gateway {
    async fn append_message(&self, data: &CreateMessageDTO) -> Result<Message, StoreError> {
        match self {
            Gateway::Durable(store) => store.append_message(data).await,
            Gateway::Ephemeral(store) => store.append_message(data).await,
        }
    }

    async fn find_messages_by_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<Message>, StoreError> {
        match self {
            Gateway::Durable(store) => store.find_messages_by_conversation(conversation_id).await,
            Gateway::Ephemeral(store) => {
                store.find_messages_by_conversation(conversation_id).await
            }
        }
    }

    async fn latest_message_per_conversation(
        &self,
    ) -> Result<HashMap<String, Message>, StoreError> {
        match self {
            Gateway::Durable(store) => store.latest_message_per_conversation().await,
            Gateway::Ephemeral(store) => store.latest_message_per_conversation().await,
        }
    }
}

impl UserStore for Gateway {
    async fn create_user(&self, data: &CreateUserDTO) -> Result<User, StoreError> {
        match self {
            Gateway::Durable(store) => store.create_user(data).await,
            Gateway::Ephemeral(store) => store.create_user(data).await,
        }
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        match self {
            Gateway::Durable(store) => store.find_user(id).await,
            Gateway::Ephemeral(store) => store.find_user(id).await,
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        match self {
            Gateway::Durable(store) => store.find_user_by_email(email).await,
            Gateway::Ephemeral(store) => store.find_user_by_email(email).await,
        }
    }
}
