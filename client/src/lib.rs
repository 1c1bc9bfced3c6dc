//! Client del concierge
//!
//! - `api`: trasporto HTTP verso il server, con identità membro o guest
//! - `sync`: vista locale tenuta allineata al server tramite polling
//! - `models`: i tipi così come viaggiano sul filo

pub mod api;
pub mod error;
pub mod models;
pub mod sync;

pub use api::{ConciergeApi, Credentials, HttpApi};
pub use error::ClientError;
pub use models::{Conversation, ConversationStatus, ConversationSummary, Message, SenderRole};
pub use sync::{POLL_INTERVAL, SyncClient, ViewState};
