//! Messaggi sul backend SQLite

use super::{SqlStore, from_epoch, to_epoch};
use crate::dtos::CreateMessageDTO;
use crate::entities::{Message, SenderRole};
use crate::repositories::{MessageStore, StoreError};
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    conversation_id: String,
    sender_id: String,
    sender_role: SenderRole,
    content: String,
    created_at: i64,
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            sender_role: row.sender_role,
            content: row.content,
            created_at: from_epoch(row.created_at)?,
        })
    }
}

impl MessageStore for SqlStore {
    #[instrument(skip(self, data), fields(conversation_id = %data.conversation_id))]
    async fn append_message(&self, data: &CreateMessageDTO) -> Result<Message, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = to_epoch(&data.created_at);

        let result = sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, sender_role, content, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.conversation_id)
        .bind(&data.sender_id)
        .bind(data.sender_role)
        .bind(&data.content)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await;

        // la foreign key sostituisce il controllo esplicito del backend in memoria
        if let Err(sqlx::Error::Database(ref db_err)) = result {
            if db_err.is_foreign_key_violation() {
                return Err(StoreError::MissingConversation(data.conversation_id.clone()));
            }
        }
        result?;

        debug!("Message {} appended", id);

        Ok(Message {
            id,
            conversation_id: data.conversation_id.clone(),
            sender_id: data.sender_id.clone(),
            sender_role: data.sender_role,
            content: data.content.clone(),
            created_at: from_epoch(created_at)?,
        })
    }

    #[instrument(skip(self))]
    async fn find_messages_by_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<Message>, StoreError> {
        // rowid come spareggio: a parità di secondo vale l'ordine di inserimento
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, conversation_id, sender_id, sender_role, content, created_at
            FROM messages
            WHERE conversation_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.connection_pool)
        .await?;

        rows.into_iter().map(Message::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn latest_message_per_conversation(
        &self,
    ) -> Result<HashMap<String, Message>, StoreError> {
        // max per gruppo; con più messaggi nello stesso secondo arrivano tutti,
        // in ordine di rowid, e nella mappa resta l'ultimo inserito
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT m.id, m.conversation_id, m.sender_id, m.sender_role, m.content, m.created_at
            FROM messages m
            INNER JOIN (
                SELECT conversation_id, MAX(created_at) AS max_ts
                FROM messages
                GROUP BY conversation_id
            ) latest
              ON m.conversation_id = latest.conversation_id
             AND m.created_at = latest.max_ts
            ORDER BY m.rowid ASC
            "#,
        )
        .fetch_all(&self.connection_pool)
        .await?;

        let mut latest = HashMap::with_capacity(rows.len());
        for row in rows {
            let message = Message::try_from(row)?;
            latest.insert(message.conversation_id.clone(), message);
        }
        Ok(latest)
    }
}
