//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità:
//! - `auth`: registrazione, login e seeding dell'account staff
//! - `chat`: conversazioni e messaggi, dietro l'identity middleware

pub mod auth;
pub mod chat;

// Re-exports per facilitare l'import
pub use auth::{ensure_admin_exists, login_user, register_user};
pub use chat::{
    create_conversation, list_conversations, list_messages, send_message,
    update_conversation_status,
};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        format!("Concierge is running ({} store)", state.store.backend_name()),
    )
}
