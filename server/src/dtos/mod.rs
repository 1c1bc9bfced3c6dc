//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server
//! e gli input di scrittura verso il Persistence Gateway.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod conversation;
pub mod message;
pub mod query;
pub mod user;

pub use conversation::{
    ConversationListResponse, ConversationResponse, ConversationSummary, CreateConversationDTO,
    CreateConversationRequest, UpdateStatusRequest,
};
pub use message::{CreateMessageDTO, MessageListResponse, MessageResponse, SendMessageRequest};
pub use query::MessagesQuery;
pub use user::{CreateUserDTO, LoginDTO, LoginResponse, RegisterDTO, UserDTO};
