//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! Questo modulo contiene tutti i componenti "core" dell'applicazione:
//! - Risoluzione dell'identità (membro o guest)
//! - Autenticazione e JWT
//! - Configurazione
//! - Gestione errori
//! - Stato applicazione

pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod state;

// Re-exports per facilitare l'import
pub use auth::{Claims, decode_jwt, encode_jwt, identity_middleware};
pub use config::{AdminSeed, Config, StoreBackend};
pub use error::AppError;
pub use identity::{Actor, ActorKind};
pub use state::AppState;
