mod admin;
mod chat;
pub mod login;

pub use admin::AdminPage;
pub use chat::ChatPage;
pub use login::LoginPage;
