//! Conversazioni sul backend SQLite

use super::{SqlStore, from_epoch, to_epoch};
use crate::dtos::CreateConversationDTO;
use crate::entities::{Conversation, ConversationStatus};
use crate::repositories::{ConversationStore, StoreError};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SELECT_CONVERSATION: &str = r#"
    SELECT id, user_id, status, subject, created_at, updated_at
    FROM conversations
"#;

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: String,
    user_id: String,
    status: ConversationStatus,
    subject: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = StoreError;

    fn try_from(row: ConversationRow) -> Result<Self, Self::Error> {
        Ok(Conversation {
            id: row.id,
            owner_id: row.user_id,
            subject: row.subject,
            status: row.status,
            created_at: from_epoch(row.created_at)?,
            updated_at: from_epoch(row.updated_at)?,
        })
    }
}

fn into_conversations(rows: Vec<ConversationRow>) -> Result<Vec<Conversation>, StoreError> {
    rows.into_iter().map(Conversation::try_from).collect()
}

impl ConversationStore for SqlStore {
    #[instrument(skip(self, data), fields(owner_id = %data.owner_id))]
    async fn create_conversation(
        &self,
        data: &CreateConversationDTO,
    ) -> Result<Conversation, StoreError> {
        debug!("Creating new conversation");
        let id = Uuid::new_v4().to_string();
        let created_at = to_epoch(&data.created_at);

        sqlx::query(
            r#"
            INSERT INTO conversations (id, user_id, status, subject, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.owner_id)
        .bind(ConversationStatus::Open)
        .bind(&data.subject)
        .bind(created_at)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await?;

        info!("Conversation created with id {}", id);

        // ritorna il valore come verrà riletto, cioè troncato al secondo
        let at = from_epoch(created_at)?;
        Ok(Conversation {
            id,
            owner_id: data.owner_id.clone(),
            subject: data.subject.clone(),
            status: ConversationStatus::Open,
            created_at: at,
            updated_at: at,
        })
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn find_conversation(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "{SELECT_CONVERSATION} WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        row.map(Conversation::try_from).transpose()
    }

    async fn find_conversations_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Conversation>, StoreError> {
        let rows = sqlx::query_as::<_, ConversationRow>(&format!(
            "{SELECT_CONVERSATION} WHERE user_id = ? ORDER BY updated_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.connection_pool)
        .await?;

        into_conversations(rows)
    }

    async fn find_all_conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        let rows = sqlx::query_as::<_, ConversationRow>(&format!(
            "{SELECT_CONVERSATION} ORDER BY updated_at DESC"
        ))
        .fetch_all(&self.connection_pool)
        .await?;

        into_conversations(rows)
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn update_conversation_status(
        &self,
        id: &str,
        status: ConversationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Conversation>, StoreError> {
        let result = sqlx::query(
            "UPDATE conversations SET status = ?, updated_at = MAX(updated_at, ?) WHERE id = ?",
        )
        .bind(status)
        .bind(to_epoch(&at))
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!("No conversation to update");
            return Ok(None);
        }

        self.find_conversation(id).await
    }

    async fn touch_conversation(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("UPDATE conversations SET updated_at = MAX(updated_at, ?) WHERE id = ?")
            .bind(to_epoch(&at))
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}
