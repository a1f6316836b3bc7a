//! Data models shared between the web client modules.

mod auth;
mod chat;
mod user;
mod wire;

pub use auth::{
    ApiErrorBody, ArchiveResponse, ArchivedConversationsResponse, ArchivedUser, LoginRequest,
    LoginResponse, OpsMessage, UnarchiveResponse,
};
pub use chat::{ConversationCache, Direction, StoredMessage};
pub use user::{UserInfoResponse, UserProfile};
pub use wire::{
    ClientFrame, ConnectedUser, ConversationSummary, HistoryMessage, ServerFrame, WelcomeUser,
};
