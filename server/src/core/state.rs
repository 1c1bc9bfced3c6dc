//! Application State - Stato globale dell'applicazione
//!
//! Contiene il Persistence Gateway, i componenti del concierge
//! e la configurazione condivisa tra route e middleware.

use crate::concierge::{ConversationRegistry, MessageLedger};
use crate::repositories::Gateway;
use std::sync::Arc;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Accesso ai dati, condiviso con registry e ledger
    pub store: Arc<Gateway>,

    /// Creazione, visibilità e stato delle conversazioni
    pub conversations: ConversationRegistry,

    /// Log append-only dei messaggi
    pub messages: MessageLedger,

    /// Secret key per JWT token
    pub jwt_secret: String,
}

impl AppState {
    /// Crea una nuova istanza di AppState sopra il Gateway fornito.
    ///
    /// # Arguments
    /// * `store` - Gateway già inizializzato (durevole o effimero)
    /// * `jwt_secret` - Chiave segreta per la firma dei token JWT
    pub fn new(store: Gateway, jwt_secret: String) -> Self {
        let store = Arc::new(store);
        let conversations = ConversationRegistry::new(store.clone());
        let messages = MessageLedger::new(store.clone(), conversations.clone());
        Self {
            store,
            conversations,
            messages,
            jwt_secret,
        }
    }
}
