//! Concierge - il cuore della messaggistica cliente/staff
//!
//! - `registry`: ciclo di vita delle conversazioni e regole di visibilità
//! - `ledger`: log append-only dei messaggi, aggiorna la recency della conversazione
//!
//! Entrambi parlano solo con il Gateway e ritornano `ConciergeError`;
//! la traduzione in risposte HTTP avviene nei services.

pub mod error;
pub mod ledger;
pub mod registry;

pub use error::ConciergeError;
pub use ledger::MessageLedger;
pub use registry::ConversationRegistry;

/// Oggetto usato quando il client non ne specifica uno
pub const DEFAULT_SUBJECT: &str = "New Conversation";
