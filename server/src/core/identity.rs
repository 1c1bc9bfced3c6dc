//! Identity Resolver - deriva l'attore della richiesta
//!
//! Funzione pura: nessun accesso allo store, nessun effetto collaterale.
//! La sessione autenticata vince sul token guest quando ci sono entrambi.
//!
//! Il token guest è un segreto conservato dal client: chi lo conosce può leggere
//! e scrivere le conversazioni di quel guest. È accettabile solo perché il token
//! non ha valore oltre a quelle conversazioni, e non va mai trattato come
//! equivalente a un account autenticato.

use super::auth::Claims;
use crate::entities::{Conversation, MemberRole, SenderRole};

/// Prefisso che distingue gli id guest dagli id degli account
pub const GUEST_PREFIX: &str = "guest-";

/// Header con cui il client invia il proprio token guest
pub const GUEST_HEADER: &str = "x-guest-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorKind {
    Member(MemberRole),
    Guest,
}

/// Identità risolta per una singola richiesta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub kind: ActorKind,
}

impl Actor {
    pub fn member(id: impl Into<String>, role: MemberRole) -> Self {
        Self {
            id: id.into(),
            kind: ActorKind::Member(role),
        }
    }

    pub fn guest(token: &str) -> Self {
        Self {
            id: format!("{GUEST_PREFIX}{token}"),
            kind: ActorKind::Guest,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.kind == ActorKind::Guest
    }

    /// Lo staff (ruolo admin) vede e amministra ogni conversazione
    pub fn is_staff(&self) -> bool {
        self.kind == ActorKind::Member(MemberRole::Admin)
    }

    /// Ruolo da congelare nei messaggi inviati da questo attore
    pub fn sender_role(&self) -> SenderRole {
        if self.is_staff() {
            SenderRole::Admin
        } else {
            SenderRole::User
        }
    }

    pub fn can_access(&self, conversation: &Conversation) -> bool {
        self.is_staff() || conversation.owner_id == self.id
    }
}

/// true se l'id appartiene a un guest (nessun account da cercare)
pub fn is_guest_id(actor_id: &str) -> bool {
    actor_id.starts_with(GUEST_PREFIX)
}

/// Risolve l'attore da sessione e token guest.
///
/// # Returns
/// * `Some(Actor)` membro se c'è una sessione, altrimenti guest se il token non è vuoto
/// * `None` se non c'è alcuna identità: il chiamante deve rispondere 401
pub fn resolve(session: Option<&Claims>, guest_token: Option<&str>) -> Option<Actor> {
    if let Some(claims) = session {
        return Some(Actor::member(claims.id.clone(), claims.role));
    }

    guest_token
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Actor::guest)
}
