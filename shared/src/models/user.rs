use serde::{Deserialize, Serialize};

/// A user account as stored alongside the auth token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Database id.
    pub id: i64,

    /// Unique login, also the WebSocket routing id.
    pub login: String,

    /// Given name.
    pub first_name: String,

    /// Family name.
    pub last_name: String,

    /// Patronymic, when the user has one.
    #[serde(default)]
    pub patronymic: Option<String>,

    /// Street address.
    #[serde(default)]
    pub address: Option<String>,

    /// Flat number.
    #[serde(default)]
    pub flat: Option<String>,

    /// Whether the account is the support operator.
    #[serde(default)]
    pub is_admin: bool,
}

impl UserProfile {
    /// Name shown in chat headers and rosters.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Profile plus message statistics, as returned by the operator's
/// user-info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfoResponse {
    /// Unique login.
    pub login: String,

    /// Given name.
    pub first_name: String,

    /// Family name.
    pub last_name: String,

    /// Patronymic, when the user has one.
    #[serde(default)]
    pub patronymic: Option<String>,

    /// Street address.
    #[serde(default)]
    pub address: Option<String>,

    /// Flat number.
    #[serde(default)]
    pub flat: Option<String>,

    /// Messages in either direction.
    #[serde(default)]
    pub total_messages: u64,

    /// Messages authored by the user.
    #[serde(default)]
    pub sent_messages: u64,

    /// Messages delivered to the user.
    #[serde(default)]
    pub received_messages: u64,

    /// Messages the user has not read yet.
    #[serde(default)]
    pub unread_messages: u64,

    /// Timestamp of the latest message, ISO formatted.
    #[serde(default)]
    pub last_activity: Option<String>,
}

impl UserInfoResponse {
    /// Name shown in the user-info dialog.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: 7,
            login: "ivan".to_string(),
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            patronymic: None,
            address: Some("Tverskaya 1".to_string()),
            flat: Some("12".to_string()),
            is_admin: false,
        }
    }

    #[test]
    fn display_name_joins_first_and_last() {
        assert_eq!(profile().display_name(), "Ivan Petrov");
    }

    #[test]
    fn profile_round_trips_through_json() {
        let original = profile();
        let raw = serde_json::to_string(&original).unwrap();
        let parsed: UserProfile = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn sparse_profile_uses_defaults() {
        let raw = r#"{ "id": 1, "login": "admin", "first_name": "Olga", "last_name": "Ivanova" }"#;
        let parsed: UserProfile = serde_json::from_str(raw).unwrap();
        assert!(!parsed.is_admin);
        assert!(parsed.patronymic.is_none());
    }

    #[test]
    fn user_info_defaults_statistics() {
        let raw = r#"{ "login": "ivan", "first_name": "Ivan", "last_name": "Petrov" }"#;
        let parsed: UserInfoResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.total_messages, 0);
        assert!(parsed.last_activity.is_none());
    }
}
