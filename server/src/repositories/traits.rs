//! Common repository traits
//!
//! This module defines the interfaces of the Persistence Gateway. Both backends
//! (durable SQLite store and ephemeral in-process store) implement all of them,
//! and a successful write is visible to every later read on the same instance.

use super::StoreError;
use crate::dtos::{CreateConversationDTO, CreateMessageDTO, CreateUserDTO};
use crate::entities::{Conversation, ConversationStatus, Message, User};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Conversation persistence
pub trait ConversationStore {
    /// Creates a conversation with a fresh id, status `open` and
    /// `created_at == updated_at == data.created_at`
    async fn create_conversation(
        &self,
        data: &CreateConversationDTO,
    ) -> Result<Conversation, StoreError>;

    /// Reads a conversation by primary key
    ///
    /// # Returns
    /// * `Ok(None)` - No conversation with that id
    async fn find_conversation(&self, id: &str) -> Result<Option<Conversation>, StoreError>;

    /// Conversations owned by the given actor id
    async fn find_conversations_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Conversation>, StoreError>;

    /// Every conversation in the store (staff view)
    async fn find_all_conversations(&self) -> Result<Vec<Conversation>, StoreError>;

    /// Sets the status and bumps `updated_at` (never moves it backwards)
    ///
    /// # Returns
    /// * `Ok(None)` - No conversation with that id
    async fn update_conversation_status(
        &self,
        id: &str,
        status: ConversationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Conversation>, StoreError>;

    /// Bumps `updated_at` to `at` unless it is already later
    async fn touch_conversation(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Append-only message log
pub trait MessageStore {
    /// Appends a message; fails with `MissingConversation` if the parent does not exist
    async fn append_message(&self, data: &CreateMessageDTO) -> Result<Message, StoreError>;

    /// Messages of a conversation ordered by `created_at` ascending, ties in storage order
    async fn find_messages_by_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<Message>, StoreError>;

    /// For each conversation the message with the greatest `created_at`
    /// (on ties, the one stored last)
    async fn latest_message_per_conversation(
        &self,
    ) -> Result<HashMap<String, Message>, StoreError>;
}

/// Member accounts, used for login and for owner lookups in the conversation list
pub trait UserStore {
    /// Creates a user; fails with `DuplicateEmail` if the email is taken
    async fn create_user(&self, data: &CreateUserDTO) -> Result<User, StoreError>;

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
