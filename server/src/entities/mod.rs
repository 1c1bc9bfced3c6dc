//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità che rappresentano i dati persistiti,
//! indipendentemente dal backend (SQLite o store in memoria).

pub mod conversation;
pub mod enums;
pub mod message;
pub mod user;

// Re-exports per facilitare l'import
pub use conversation::Conversation;
pub use enums::{ConversationStatus, MemberRole, SenderRole};
pub use message::Message;
pub use user::User;

use chrono::{DateTime, SubsecRound, Utc};

/// Istante corrente troncato al secondo.
///
/// Entrambi i backend lavorano alla risoluzione del secondo, così l'ordinamento
/// non dipende dal backend scelto (i pareggi si risolvono con l'ordine di scrittura).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
