//! Chat services - Endpoint HTTP per conversazioni e messaggi

use crate::concierge::{ConciergeError, DEFAULT_SUBJECT};
use crate::core::{Actor, AppError, AppState};
use crate::dtos::{
    ConversationListResponse, ConversationResponse, CreateConversationRequest,
    MessageListResponse, MessageResponse, MessagesQuery, SendMessageRequest, UpdateStatusRequest,
};
use crate::entities::ConversationStatus;
use axum::{
    Extension,
    extract::{Json, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Estrae un campo stringa obbligatorio, vuoto o solo spazi conta come mancante
fn required<'a>(value: &'a Option<String>, message: &'static str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request(message))
}

#[instrument(skip(state, actor), fields(actor_id = %actor.id))]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ConversationListResponse>, AppError> {
    debug!("Listing conversations");
    let conversations = state.conversations.list_for(&actor).await?;

    info!("Retrieved {} conversations", conversations.len());
    Ok(Json(ConversationListResponse { conversations }))
}

#[instrument(skip(state, actor, body), fields(actor_id = %actor.id))]
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    body: Option<Json<CreateConversationRequest>>,
) -> Result<(StatusCode, Json<ConversationResponse>), AppError> {
    // body assente o senza subject: si usa l'oggetto di default
    let body = body.map(|Json(b)| b).unwrap_or_default();
    body.validate()?;

    let subject = body
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SUBJECT);

    let conversation = state.conversations.create(&actor.id, subject).await?;
    Ok((StatusCode::CREATED, Json(conversation.into())))
}

#[instrument(skip(state, actor, params), fields(actor_id = %actor.id))]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<MessagesQuery>,
) -> Result<Json<MessageListResponse>, AppError> {
    let conversation_id = required(&params.conversation_id, "conversationId is required")?;

    let conversation = state.conversations.authorize(&actor, conversation_id).await?;
    let messages = state.messages.list_for(&conversation.id).await?;

    debug!("Retrieved {} messages", messages.len());
    Ok(Json(MessageListResponse {
        messages,
        status: conversation.status,
    }))
}

#[instrument(skip(state, actor, payload), fields(actor_id = %actor.id))]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    // 1. Validare i campi (presenza e lunghezza) prima di toccare lo store
    // 2. Verificare esistenza e accesso alla conversazione
    // 3. Rifiutare l'invio se la conversazione non è più aperta
    // 4. Delegare al ledger (timestamp, recency)
    let Json(mut body) = payload?;
    body.trim_content();
    body.validate()?;

    let conversation_id = required(&body.conversation_id, "conversationId is required")?;
    let content = required(&body.content, "Message content must not be empty")?;

    let conversation = state.conversations.authorize(&actor, conversation_id).await?;
    if conversation.status.is_terminal() {
        warn!(
            "Send rejected: conversation {} is {}",
            conversation.id, conversation.status
        );
        return Err(ConciergeError::ConversationClosed(conversation.status).into());
    }

    let message = state.messages.append(&conversation.id, &actor, content).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse { message })))
}

#[instrument(skip(state, actor, payload), fields(actor_id = %actor.id))]
pub async fn update_conversation_status(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<ConversationResponse>, AppError> {
    // il controllo sul ruolo precede la validazione: i non-staff non scoprono nulla
    if !actor.is_staff() {
        warn!("Non-staff actor attempted a status change");
        return Err(AppError::forbidden("Forbidden"));
    }

    let Json(body) = payload?;

    let conversation_id = required(&body.conversation_id, "conversationId is required")?;
    let status = required(&body.status, "status is required")?
        .parse::<ConversationStatus>()
        .map_err(|_| {
            AppError::bad_request("Invalid status")
                .with_details("status must be one of: open, closed, whatsapp")
        })?;

    let conversation = state
        .conversations
        .set_status(&actor, conversation_id, status)
        .await?;
    Ok(Json(conversation.into()))
}
