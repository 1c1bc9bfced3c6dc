#![allow(dead_code)]

use axum_test::TestServer;
use server::core::{AppState, Claims};
use server::dtos::CreateUserDTO;
use server::entities::{self, MemberRole, User};
use server::repositories::{Gateway, SqlStore, UserStore};
use std::sync::Arc;

pub const JWT_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

/// Crea un AppState per i test sopra il Gateway fornito
pub fn create_test_state(store: Gateway) -> Arc<AppState> {
    Arc::new(AppState::new(store, JWT_SECRET.to_string()))
}

/// AppState con store in memoria, nuovo per ogni test
pub fn ephemeral_state() -> Arc<AppState> {
    create_test_state(Gateway::ephemeral())
}

/// AppState con SQLite in memoria e migrazioni applicate
pub async fn durable_state() -> Arc<AppState> {
    let store = SqlStore::connect_in_memory()
        .await
        .expect("Failed to open in-memory SQLite");
    create_test_state(Gateway::from(store))
}

/// Crea un TestServer per i test
///
/// # Arguments
/// * `state` - AppState da utilizzare per il server
///
/// # Returns
/// TestServer configurato e pronto per eseguire richieste
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Genera un JWT token per testing
///
/// # Arguments
/// * `user_id` - ID dell'utente per cui generare il token
/// * `name` - Nome mostrato
/// * `role` - Ruolo del membro (Admin = staff)
///
/// # Returns
/// Token JWT valido per 24 ore, firmato con `JWT_SECRET`
pub fn create_test_jwt(user_id: &str, name: &str, role: MemberRole) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = Utc::now();
    let claims = Claims {
        exp: (now + Duration::hours(24)).timestamp() as usize,
        iat: now.timestamp() as usize,
        id: user_id.to_string(),
        name: name.to_string(),
        role,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to create JWT token")
}

/// Registra direttamente nello store un membro con password "password123"
pub async fn seed_member(state: &AppState, name: &str, email: &str, role: MemberRole) -> User {
    let data = CreateUserDTO {
        name: name.to_string(),
        email: email.to_string(),
        password: User::hash_password("password123").expect("Failed to hash password"),
        role,
        company: None,
        phone: None,
        created_at: entities::now(),
    };
    state
        .store
        .create_user(&data)
        .await
        .expect("Failed to seed member")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
