mod broadcast_modal;
mod confirm_modal;
mod connection_status;
mod message_list;
mod password_input;
mod toast_stack;
mod user_info_modal;
mod user_list;

pub use broadcast_modal::BroadcastModal;
pub use confirm_modal::ConfirmModal;
pub use connection_status::{ConnectionState, ConnectionStatus};
pub use message_list::MessageList;
pub use password_input::PasswordInput;
pub use toast_stack::{ToastAction, ToastList, ToastStack};
pub use user_info_modal::UserInfoModal;
pub use user_list::UserList;
