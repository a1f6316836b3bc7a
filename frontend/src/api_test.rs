//! Tests for the REST client and WebSocket URL construction.
//!
//! Validates endpoint paths, error rendering, and the scheme selection
//! that backs the chat socket connection.

#[cfg(test)]
mod tests {
    use crate::api::{ApiError, SupportApi, websocket_url_for};

    #[test]
    fn client_creation() {
        let _client = SupportApi::new("http://localhost:8000/");
        // Trailing slashes in the base URL must not break path joining.
    }

    #[test]
    fn websocket_url_plain_http() {
        let url = websocket_url_for("ws", "localhost:8000", "user@example.com", "tok");
        assert_eq!(url, "ws://localhost:8000/ws/user@example.com?token=tok");
    }

    #[test]
    fn websocket_url_secure() {
        let url = websocket_url_for("wss", "chat.example.com", "admin", "tok");
        assert!(url.starts_with("wss://chat.example.com/ws/admin"));
    }

    #[test]
    fn websocket_url_keeps_encoded_token() {
        let url = websocket_url_for("ws", "localhost:8000", "admin", "a%3Db%26c");
        assert!(url.ends_with("token=a%3Db%26c"));
    }

    #[test]
    fn operator_endpoint_paths() {
        let login = "user@example.com";
        assert_eq!(
            format!("ops/user_info_by_login/{login}"),
            "ops/user_info_by_login/user@example.com"
        );
        assert_eq!(
            format!("ops/archive_conversation/{login}"),
            "ops/archive_conversation/user@example.com"
        );
        assert_eq!(
            format!("ops/unarchive_conversation/{login}"),
            "ops/unarchive_conversation/user@example.com"
        );
    }

    #[test]
    fn error_display() {
        assert_eq!(ApiError::Unauthorized.to_string(), "session expired");
        let rejected = ApiError::Rejected("Invalid credentials".to_string());
        assert_eq!(rejected.to_string(), "Invalid credentials");
    }
}
