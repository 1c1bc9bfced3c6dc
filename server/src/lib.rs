//! Server library - espone i moduli principali per i test

pub mod concierge;
pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .nest("/chat", configure_chat_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Configura le routes di autenticazione (login, register)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use axum::routing::post;
    use services::{login_user, register_user};

    Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user))
}

/// Configura le routes di conversazioni e messaggi (membri e guest)
fn configure_chat_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::identity_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_conversations).post(create_conversation))
        .route(
            "/messages",
            get(list_messages)
                .post(send_message)
                .patch(update_conversation_status),
        )
        .layer(middleware::from_fn_with_state(state, identity_middleware))
}
