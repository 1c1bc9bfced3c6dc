//! Utenti sul backend SQLite

use super::{SqlStore, from_epoch, to_epoch};
use crate::dtos::CreateUserDTO;
use crate::entities::{MemberRole, User};
use crate::repositories::{StoreError, UserStore};
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password: String,
    role: MemberRole,
    company: Option<String>,
    phone: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            role: row.role,
            company: row.company,
            phone: row.phone,
            created_at: from_epoch(row.created_at)?,
            updated_at: from_epoch(row.updated_at)?,
        })
    }
}

impl UserStore for SqlStore {
    #[instrument(skip(self, data), fields(email = %data.email))]
    async fn create_user(&self, data: &CreateUserDTO) -> Result<User, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = to_epoch(&data.created_at);

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, role, company, phone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.password)
        .bind(data.role)
        .bind(&data.company)
        .bind(&data.phone)
        .bind(created_at)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await;

        if let Err(sqlx::Error::Database(ref db_err)) = result {
            if db_err.is_unique_violation() {
                return Err(StoreError::DuplicateEmail(data.email.clone()));
            }
        }
        result?;

        info!("User created with id {}", id);

        let at = from_epoch(created_at)?;
        Ok(User {
            id,
            name: data.name.clone(),
            email: data.email.clone(),
            password: data.password.clone(),
            role: data.role,
            company: data.company.clone(),
            phone: data.phone.clone(),
            created_at: at,
            updated_at: at,
        })
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password, role, company, phone, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password, role, company, phone, created_at, updated_at
            FROM users
            WHERE email = ?
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}
