use shared::models::UserProfile;
use yewdux::Store;

#[derive(Default, Clone, PartialEq, Store)]
pub struct AppState {
    pub user: Option<UserProfile>,
}
