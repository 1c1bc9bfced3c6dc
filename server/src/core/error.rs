use crate::concierge::ConciergeError;
use crate::repositories::StoreError;
use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: &'static str) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: &'static str) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: &'static str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

// il dettaglio dell'errore di store resta nei log, al client arriva un messaggio generico
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        error!("Store failure: {}", err);
        if err.is_unavailable() {
            return Self::service_unavailable("Database unavailable");
        }
        match err {
            StoreError::DuplicateEmail(_) => {
                Self::conflict("An account with this email already exists")
            }
            _ => Self::internal_server_error("Internal server error"),
        }
    }
}

impl From<ConciergeError> for AppError {
    fn from(err: ConciergeError) -> Self {
        match err {
            // generico di proposito: nessun dettaglio sulla conversazione
            ConciergeError::Forbidden => Self::forbidden("Forbidden"),
            ConciergeError::NotFound(_) => Self::not_found("Conversation not found"),
            ConciergeError::Validation(details) => {
                Self::bad_request("Validation error").with_details(details)
            }
            ConciergeError::ConversationClosed(status) => {
                Self::conflict("Conversation is no longer accepting messages")
                    .with_details(format!("Conversation status is {}", status))
            }
            ConciergeError::Store(err) => Self::from(err),
            ConciergeError::PasswordHash(e) => {
                error!("Password hashing failed: {}", e);
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::bad_request("Validation error").with_details(err.to_string())
    }
}

// body illeggibile o campi mancanti: 400 come ogni altro errore di validazione
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid request body").with_details(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}
