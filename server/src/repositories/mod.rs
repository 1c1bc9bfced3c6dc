//! Repositories module - Persistence Gateway
//!
//! Questo modulo organizza l'accesso ai dati in sotto-moduli separati:
//! i trait comuni, i due backend intercambiabili e il Gateway che li unifica.
//!
//! - `sqlite`: backend durevole, timestamp salvati come secondi epoch
//! - `memory`: backend effimero, istanza posseduta dallo stato dell'applicazione
//!
//! Tutte le operazioni sono async e ritornano `StoreError`, che viene propagato
//! con `?` fino al service che lo trasforma nel codice HTTP adeguato.

// ************************* MODULI REPOSITORY ************************* //

pub mod error;
pub mod gateway;
pub mod memory;
pub mod sqlite;
pub mod traits;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{ConversationStore, MessageStore, UserStore};

pub use error::StoreError;
pub use gateway::Gateway;
pub use memory::MemoryStore;
pub use sqlite::SqlStore;
