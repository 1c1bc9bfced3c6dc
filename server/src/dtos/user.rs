//! User DTOs - Data Transfer Objects per utenti

use crate::entities::{MemberRole, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// struct per gestire io col client, la password non esce mai
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            company: value.company,
            phone: value.phone,
        }
    }
}

/// DTO per creare un nuovo utente nello store (password già hashata)
#[derive(Debug, Clone)]
pub struct CreateUserDTO {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: MemberRole,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body di POST /auth/register
#[derive(Deserialize, Debug, Validate)]
pub struct RegisterDTO {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(default)]
    #[validate(custom(function = "validate_self_service_role"))]
    pub role: MemberRole,

    pub company: Option<String>,
    pub phone: Option<String>,
}

// gli account staff non si registrano da soli
fn validate_self_service_role(role: &MemberRole) -> Result<(), ValidationError> {
    if *role == MemberRole::Admin {
        return Err(ValidationError::new("role")
            .with_message("Role must be private or enterprise".into()));
    }
    Ok(())
}

impl RegisterDTO {
    /// Nome ed email si validano già ripuliti, così come verranno salvati
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
    }
}

/// DTO per il login
#[derive(Deserialize, Debug)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDTO,
}
