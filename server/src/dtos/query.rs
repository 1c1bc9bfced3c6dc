//! Query DTOs - Data Transfer Objects per query string

use serde::{Deserialize, Serialize};

/// DTO per query parameters di GET /chat/messages
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    #[serde(default)]
    pub conversation_id: Option<String>,
}
