//! Trasporto HTTP verso il server del concierge

use crate::error::ClientError;
use crate::models::{Conversation, ConversationStatus, ConversationSummary, Message, MessageList};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

pub const GUEST_HEADER: &str = "x-guest-id";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Identità con cui il client si presenta, inviata ad ogni richiesta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// JWT ottenuto da /auth/login
    Bearer(String),
    /// Token opaco generato localmente e conservato per tutta la vita del client
    Guest(String),
}

impl Credentials {
    pub fn new_guest() -> Self {
        Credentials::Guest(Uuid::new_v4().to_string())
    }

    /// Header (nome, valore) che porta l'identità
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Credentials::Bearer(token) => ("authorization", format!("Bearer {}", token)),
            Credentials::Guest(token) => (GUEST_HEADER, token.clone()),
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        let (name, value) = self.header();
        request.header(name, value)
    }
}

/// Operazioni del server usate dal client di sincronizzazione
pub trait ConciergeApi: Send + Sync + 'static {
    fn list_conversations(
        &self,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>, ClientError>> + Send;

    fn create_conversation(
        &self,
        subject: Option<&str>,
    ) -> impl Future<Output = Result<Conversation, ClientError>> + Send;

    fn list_messages(
        &self,
        conversation_id: &str,
    ) -> impl Future<Output = Result<MessageList, ClientError>> + Send;

    fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> impl Future<Output = Result<Message, ClientError>> + Send;

    fn set_status(
        &self,
        conversation_id: &str,
        status: ConversationStatus,
    ) -> impl Future<Output = Result<Conversation, ClientError>> + Send;
}

#[derive(Deserialize)]
struct ConversationsEnvelope {
    conversations: Vec<ConversationSummary>,
}

#[derive(Deserialize)]
struct ConversationEnvelope {
    conversation: Conversation,
}

#[derive(Deserialize)]
struct MessageEnvelope {
    message: Message,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// Implementazione reqwest di `ConciergeApi`
#[derive(Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Decodifica il body atteso oppure trasforma la risposta d'errore in `ClientError::Status`
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(ErrorBody {
            error,
            details: Some(details),
        }) => format!("{}: {}", error, details),
        Ok(ErrorBody { error, .. }) => error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    debug!("Request failed with {}: {}", status, message);
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

impl ConciergeApi for HttpApi {
    #[instrument(skip(self))]
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ClientError> {
        let request = self.credentials.apply(self.http.get(self.url("/chat")));
        let envelope: ConversationsEnvelope = decode(request.send().await?).await?;
        Ok(envelope.conversations)
    }

    #[instrument(skip(self))]
    async fn create_conversation(&self, subject: Option<&str>) -> Result<Conversation, ClientError> {
        let request = self
            .credentials
            .apply(self.http.post(self.url("/chat")))
            .json(&json!({ "subject": subject }));
        let envelope: ConversationEnvelope = decode(request.send().await?).await?;
        Ok(envelope.conversation)
    }

    #[instrument(skip(self))]
    async fn list_messages(&self, conversation_id: &str) -> Result<MessageList, ClientError> {
        let request = self
            .credentials
            .apply(self.http.get(self.url("/chat/messages")))
            .query(&[("conversationId", conversation_id)]);
        decode(request.send().await?).await
    }

    #[instrument(skip(self, content))]
    async fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> Result<Message, ClientError> {
        let request = self
            .credentials
            .apply(self.http.post(self.url("/chat/messages")))
            .json(&json!({ "conversationId": conversation_id, "content": content }));
        let envelope: MessageEnvelope = decode(request.send().await?).await?;
        Ok(envelope.message)
    }

    #[instrument(skip(self))]
    async fn set_status(
        &self,
        conversation_id: &str,
        status: ConversationStatus,
    ) -> Result<Conversation, ClientError> {
        let request = self
            .credentials
            .apply(self.http.patch(self.url("/chat/messages")))
            .json(&json!({ "conversationId": conversation_id, "status": status }));
        let envelope: ConversationEnvelope = decode(request.send().await?).await?;
        Ok(envelope.conversation)
    }
}
