use crate::core::identity::{self, GUEST_HEADER};
use crate::core::{AppError, AppState};
use crate::entities::{MemberRole, User};
use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Durata della sessione di un membro
pub const SESSION_DAYS: i64 = 30;

// struct che codifica il contenuto del token jwt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: String,
    pub name: String,
    pub role: MemberRole,
}

#[instrument(skip(user, secret), fields(user_id = %user.id))]
pub fn encode_jwt(user: &User, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let expire = Duration::days(SESSION_DAYS);
    let claim = Claims {
        iat: now.timestamp() as usize,
        exp: (now + expire).timestamp() as usize,
        id: user.id.clone(),
        name: user.name.clone(),
        role: user.role,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .inspect(|_| info!("JWT token encoded successfully"))
    .inspect_err(|e| error!("Failed to encode JWT token: {:?}", e))
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(
    jwt_token: &str,
    secret: &str,
) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
    debug!("Decoding JWT token");
    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .inspect(|data| debug!("JWT token decoded successfully for user: {}", data.claims.id))
}

/// Middleware che risolve l'attore (membro o guest) e lo inserisce nell'Extension.
///
/// Un header Authorization presente ma non valido è sempre un 401: non si ripiega
/// silenziosamente sull'identità guest.
#[instrument(skip(state, req, next))]
pub async fn identity_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running identity middleware");
    let session = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => {
            let token = header
                .to_str()
                .ok()
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .ok_or_else(|| {
                    warn!("Invalid authorization header format");
                    AppError::unauthorized("Malformed authorization header")
                })?;

            let token_data = decode_jwt(token, &state.jwt_secret).map_err(|e| {
                warn!("Failed to decode JWT token: {:?}", e);
                AppError::unauthorized("Unable to decode token")
            })?;
            Some(token_data.claims)
        }
        None => None,
    };

    let guest_token = req
        .headers()
        .get(GUEST_HEADER)
        .and_then(|value| value.to_str().ok());

    let actor = identity::resolve(session.as_ref(), guest_token).ok_or_else(|| {
        warn!("Request without session or guest token");
        AppError::unauthorized("Unauthorized")
    })?;

    debug!("Resolved actor {} (guest: {})", actor.id, actor.is_guest());
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}
