//! SyncClient - vista locale allineata al server senza connessione persistente
//!
//! La lista conversazioni si legge all'avvio e dopo ogni scrittura; la
//! conversazione aperta viene riletta ogni `POLL_INTERVAL`. Esiste al massimo
//! un timer di polling, fermato quando si cambia o si chiude la conversazione
//! e quando il client viene distrutto.

use crate::api::ConciergeApi;
use crate::error::ClientError;
use crate::models::{Conversation, ConversationStatus, ConversationSummary, Message};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, instrument};

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Stato che la UI disegna
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub conversations: Vec<ConversationSummary>,
    pub active: Option<String>,
    pub messages: Vec<Message>,
    pub status: Option<ConversationStatus>,
}

impl ViewState {
    /// true solo con una conversazione aperta in stato `open`
    pub fn can_send(&self) -> bool {
        self.active.is_some() && self.status == Some(ConversationStatus::Open)
    }
}

pub struct SyncClient<A: ConciergeApi> {
    api: Arc<A>,
    view: Arc<RwLock<ViewState>>,
    poller: Option<JoinHandle<()>>,
}

/// Primo arrivo di ogni id, ordine del server preservato
fn dedup_by_id(messages: Vec<Message>) -> Vec<Message> {
    let mut seen = HashSet::with_capacity(messages.len());
    messages
        .into_iter()
        .filter(|m| seen.insert(m.id.clone()))
        .collect()
}

/// Rilegge i messaggi e li applica solo se la conversazione è ancora quella aperta
async fn fetch_messages<A: ConciergeApi>(
    api: &A,
    view: &RwLock<ViewState>,
    conversation_id: &str,
) -> Result<(), ClientError> {
    let list = api.list_messages(conversation_id).await?;

    let mut view = view.write().await;
    if view.active.as_deref() != Some(conversation_id) {
        debug!("Discarding messages for {}, no longer open", conversation_id);
        return Ok(());
    }
    view.messages = dedup_by_id(list.messages);
    view.status = Some(list.status);
    Ok(())
}

impl<A: ConciergeApi> SyncClient<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            view: Arc::new(RwLock::new(ViewState::default())),
            poller: None,
        }
    }

    /// Primo caricamento della lista, da chiamare quando l'identità è disponibile
    pub async fn start(&self) -> Result<(), ClientError> {
        self.refresh_conversations().await
    }

    pub async fn refresh_conversations(&self) -> Result<(), ClientError> {
        let conversations = self.api.list_conversations().await?;
        self.view.write().await.conversations = conversations;
        Ok(())
    }

    /// Rilegge la conversazione aperta, se c'è
    pub async fn refresh_messages(&self) -> Result<(), ClientError> {
        let active = self.view.read().await.active.clone();
        match active {
            Some(id) => fetch_messages(&*self.api, &self.view, &id).await,
            None => Ok(()),
        }
    }

    /// Apre una conversazione: lettura immediata, poi polling ogni `POLL_INTERVAL`.
    /// Il timer precedente viene fermato prima di tutto; una prima lettura
    /// fallita non lo impedisce, si riprova al tick successivo.
    #[instrument(skip(self))]
    pub async fn open(&mut self, conversation_id: &str) {
        self.stop_polling();
        {
            let mut view = self.view.write().await;
            view.active = Some(conversation_id.to_string());
            view.messages.clear();
            view.status = None;
        }

        self.poller = Some(self.spawn_poller(conversation_id.to_string()));
        info!("Polling conversation {}", conversation_id);

        if let Err(e) = fetch_messages(&*self.api, &self.view, conversation_id).await {
            debug!("Initial fetch for {} skipped: {}", conversation_id, e);
        }
    }

    /// Chiude la conversazione aperta e ferma il polling
    pub async fn close(&mut self) {
        self.stop_polling();
        let mut view = self.view.write().await;
        view.active = None;
        view.messages.clear();
        view.status = None;
    }

    /// Invia un messaggio nella conversazione aperta.
    ///
    /// Nessun inserimento ottimistico: dopo l'invio si rileggono messaggi e lista.
    #[instrument(skip(self, content))]
    pub async fn send(&self, content: &str) -> Result<Message, ClientError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ClientError::EmptyMessage);
        }

        let (conversation_id, status) = {
            let view = self.view.read().await;
            let id = view.active.clone().ok_or(ClientError::NoActiveConversation)?;
            (id, view.status)
        };
        if let Some(status) = status.filter(ConversationStatus::is_terminal) {
            return Err(ClientError::ConversationClosed(status));
        }

        let message = self.api.send_message(&conversation_id, content).await?;

        let (messages, conversations) =
            tokio::join!(self.refresh_messages(), self.refresh_conversations());
        // il messaggio è salvato: un refetch fallito lo recupera il prossimo tick
        if let Err(e) = messages.and(conversations) {
            debug!("Refetch after send failed: {}", e);
        }
        Ok(message)
    }

    /// Crea una conversazione, aggiorna la lista e la apre.
    /// Fallisce solo se fallisce la creazione: le letture successive si recuperano da sole.
    pub async fn create_conversation(
        &mut self,
        subject: Option<&str>,
    ) -> Result<Conversation, ClientError> {
        let conversation = self.api.create_conversation(subject).await?;
        if let Err(e) = self.refresh_conversations().await {
            debug!("List refresh after create failed: {}", e);
        }
        self.open(&conversation.id).await;
        Ok(conversation)
    }

    /// Solo staff: cambia lo stato e rilegge la lista
    pub async fn set_status(
        &self,
        conversation_id: &str,
        status: ConversationStatus,
    ) -> Result<Conversation, ClientError> {
        let conversation = self.api.set_status(conversation_id, status).await?;
        {
            let mut view = self.view.write().await;
            if view.active.as_deref() == Some(conversation_id) {
                view.status = Some(conversation.status);
            }
        }
        self.refresh_conversations().await?;
        Ok(conversation)
    }

    pub async fn can_send(&self) -> bool {
        self.view.read().await.can_send()
    }

    pub async fn snapshot(&self) -> ViewState {
        self.view.read().await.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
        }
    }

    fn spawn_poller(&self, conversation_id: String) -> JoinHandle<()> {
        let api = self.api.clone();
        let view = self.view.clone();

        tokio::spawn(async move {
            // la lettura immediata la fa open()
            let mut ticker = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = fetch_messages(&*api, &view, &conversation_id).await {
                    debug!("Poll for {} skipped: {}", conversation_id, e);
                }
            }
        })
    }
}

impl<A: ConciergeApi> Drop for SyncClient<A> {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
