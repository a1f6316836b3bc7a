use serde::{Deserialize, Serialize};

use super::UserProfile;

/// Credentials submitted by the login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account login.
    pub login: String,

    /// Account password.
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Always `true` on the success path.
    #[serde(default)]
    pub success: bool,

    /// Bearer token for REST calls and the WebSocket query string.
    pub access_token: String,

    /// The authenticated account.
    pub user: UserProfile,
}

/// Error body returned by the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human readable failure description.
    pub detail: String,
}

/// Acknowledgement of archiving a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveResponse {
    /// Human readable confirmation.
    pub message: String,

    /// Number of messages moved to the archive.
    #[serde(default)]
    pub archived_messages: u64,
}

/// Acknowledgement of restoring an archived conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnarchiveResponse {
    /// Human readable confirmation.
    pub message: String,

    /// Number of messages restored.
    #[serde(default)]
    pub unarchived_messages: u64,
}

/// One archived conversation in the operator's sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedUser {
    /// Counterpart login.
    pub user_id: String,

    /// Counterpart display name.
    pub name: String,

    /// Unread messages left in the archived conversation.
    #[serde(default)]
    pub unread_count: u32,
}

/// Listing of archived conversations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedConversationsResponse {
    /// One entry per archived counterpart.
    #[serde(default)]
    pub archived_users: Vec<ArchivedUser>,
}

/// Generic acknowledgement for maintenance endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpsMessage {
    /// Human readable confirmation.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_parses_server_body() {
        let raw = r#"{
            "success": true,
            "access_token": "abc.def.ghi",
            "user": { "id": 1, "login": "admin", "first_name": "Olga",
                      "last_name": "Ivanova", "is_admin": true }
        }"#;
        let parsed: LoginResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.access_token, "abc.def.ghi");
        assert!(parsed.user.is_admin);
    }

    #[test]
    fn archived_listing_defaults_to_empty() {
        let parsed: ArchivedConversationsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.archived_users.is_empty());
    }

    #[test]
    fn error_body_exposes_detail() {
        let parsed: ApiErrorBody =
            serde_json::from_str(r#"{ "detail": "Invalid credentials" }"#).unwrap();
        assert_eq!(parsed.detail, "Invalid credentials");
    }
}
