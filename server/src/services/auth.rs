//! Auth services - Registrazione e login dei membri, seeding dell'account staff

use crate::concierge::ConciergeError;
use crate::core::{AdminSeed, AppError, AppState, encode_jwt};
use crate::dtos::{CreateUserDTO, LoginDTO, LoginResponse, RegisterDTO, UserDTO};
use crate::entities::{self, MemberRole, User};
use crate::repositories::{Gateway, StoreError, UserStore};
use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[instrument(skip(state, payload))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginDTO>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<LoginResponse>), AppError> {
    // 1. Cercare l'utente per email
    // 2. Verificare la password con bcrypt
    // 3. Stesso messaggio per email sconosciuta e password errata
    // 4. Generare il JWT e restituirlo sia nel body sia nell'header Authorization
    let Json(body) = payload?;
    if body.password.is_empty() {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let email = body.email.trim().to_lowercase();
    let user = match state.store.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            warn!("Login attempt for unknown email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    if !user.verify_password(&body.password) {
        warn!("Login attempt with wrong password for user {}", user.id);
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = encode_jwt(&user, &state.jwt_secret).map_err(|e| {
        error!("Failed to encode JWT: {:?}", e);
        AppError::internal_server_error("Failed to create session")
    })?;

    let mut headers = HeaderMap::new();
    let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| AppError::internal_server_error("Failed to create session"))?;
    headers.insert(header::AUTHORIZATION, bearer);

    info!("User {} logged in", user.id);
    Ok((
        StatusCode::OK,
        headers,
        Json(LoginResponse {
            token,
            user: UserDTO::from(user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterDTO>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    // 1. Validare il payload già ripulito (nome, email, password, ruolo non admin)
    // 2. Rifiutare email già registrate con CONFLICT
    // 3. Hashare la password e salvare l'utente
    let Json(mut body) = payload?;
    body.normalize();
    body.validate()?;

    if state.store.find_user_by_email(&body.email).await?.is_some() {
        warn!("Registration attempted with an existing email");
        return Err(AppError::conflict("An account with this email already exists"));
    }

    let password = User::hash_password(&body.password).map_err(ConciergeError::from)?;

    let data = CreateUserDTO {
        name: body.name,
        email: body.email,
        password,
        role: body.role,
        company: body.company,
        phone: body.phone,
        created_at: entities::now(),
    };
    // la unique su email copre la corsa tra il controllo sopra e l'insert
    let user = state.store.create_user(&data).await?;

    info!("User {} registered as {:?}", user.id, user.role);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": UserDTO::from(user) })),
    ))
}

/// Crea l'account staff configurato se la sua email non è ancora registrata.
/// Idempotente: chiamato a ogni avvio.
#[instrument(skip(store, seed), fields(email = %seed.email))]
pub async fn ensure_admin_exists(store: &Gateway, seed: &AdminSeed) -> Result<(), ConciergeError> {
    let email = seed.email.trim().to_lowercase();
    if store.find_user_by_email(&email).await?.is_some() {
        info!("Staff account already present");
        return Ok(());
    }

    let data = CreateUserDTO {
        name: seed.name.clone(),
        email,
        password: User::hash_password(&seed.password)?,
        role: MemberRole::Admin,
        company: None,
        phone: None,
        created_at: entities::now(),
    };

    match store.create_user(&data).await {
        Ok(user) => {
            info!("Staff account {} created", user.id);
            Ok(())
        }
        // un'altra istanza lo ha appena creato
        Err(StoreError::DuplicateEmail(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
