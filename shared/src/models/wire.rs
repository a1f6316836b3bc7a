//! WebSocket wire protocol: the flat JSON envelope exchanged with the chat
//! server. Every frame carries a `type` tag; the enums below are internally
//! tagged so unknown tags fail deserialization and can be forwarded
//! generically by the transport layer.

use serde::{Deserialize, Serialize};

/// Frames sent from the browser to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// A regular user writes to the support operator.
    UserToAdmin {
        /// Message body.
        message: String,
    },
    /// The operator replies to one user.
    AdminToUser {
        /// Recipient login.
        to_user: String,
        /// Message body.
        message: String,
    },
    /// The operator messages every connected user.
    Broadcast {
        /// Message body.
        message: String,
    },
    /// Request a page of the conversation with one counterpart.
    GetConversationHistory {
        /// Counterpart login (`"admin"` for regular users).
        with_user: String,
        /// Page size.
        limit: u32,
        /// Page offset.
        offset: u32,
    },
    /// Request the caller's conversation summaries.
    GetConversations,
    /// Mark every message from `sender_id` as read.
    MarkAsRead {
        /// Login whose messages are now read.
        sender_id: String,
    },
    /// Request the user roster (operator only).
    GetConnectedUsers,
    /// Heartbeat probe.
    Ping,
}

/// Identity block delivered with the `welcome` frame.
///
/// Only the display name is guaranteed; older servers greet with a bare
/// `{ "name": ... }` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeUser {
    /// Login the connection was authenticated as.
    #[serde(default)]
    pub login: String,
    /// Display name.
    pub name: String,
    /// Whether the connection belongs to the support operator.
    #[serde(default)]
    pub is_admin: bool,
}

/// One entry of the operator's user roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedUser {
    /// User login.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Whether the user currently holds an open socket.
    pub connected: bool,
}

/// One persisted message inside a `conversation_history` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// Server-side message id, when the server includes one.
    #[serde(default)]
    pub id: Option<i64>,
    /// Login of the author.
    pub sender_id: String,
    /// Login of the recipient.
    #[serde(default)]
    pub recipient_id: Option<String>,
    /// Message body.
    pub content: String,
    /// Server timestamp, ISO formatted.
    pub timestamp: String,
    /// Delivery class, e.g. `"broadcast"`.
    #[serde(default)]
    pub message_type: Option<String>,
    /// Whether the recipient has seen the message.
    #[serde(default)]
    pub is_read: bool,
    /// Whether the message belongs to an archived conversation.
    #[serde(default)]
    pub is_archived: bool,
}

/// One entry of a `conversations_list` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Counterpart login.
    pub participant_id: String,
    /// Counterpart display name.
    pub participant_name: String,
    /// Body of the most recent message.
    pub last_message: String,
    /// Timestamp of the most recent message, ISO formatted.
    pub last_message_time: String,
    /// Messages not yet read by the caller.
    pub unread_count: u32,
}

/// Frames received from the server.
///
/// Unknown `type` tags fail to deserialize on purpose; the socket forwards
/// such frames as raw text instead of dropping them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Greets a freshly authenticated connection.
    Welcome {
        /// Human readable greeting.
        #[serde(default)]
        message: Option<String>,
        /// Identity the server authenticated.
        user_data: WelcomeUser,
        /// Server timestamp.
        #[serde(default)]
        timestamp: Option<String>,
    },
    /// A user wrote to the operator.
    UserMessage {
        /// Author login.
        #[serde(rename = "from")]
        sender: String,
        /// Author display name.
        #[serde(default, rename = "from_name")]
        sender_name: Option<String>,
        /// Message body.
        message: String,
        /// Server timestamp.
        timestamp: String,
    },
    /// The operator wrote to this user.
    AdminMessage {
        /// Author login.
        #[serde(rename = "from")]
        sender: String,
        /// Author display name.
        #[serde(default, rename = "from_name")]
        sender_name: Option<String>,
        /// Message body.
        message: String,
        /// Server timestamp.
        timestamp: String,
    },
    /// Echo of another operator session's outbound reply.
    AdminSent {
        /// Sending operator login.
        #[serde(rename = "from")]
        sender: String,
        /// Sending operator display name.
        #[serde(default, rename = "from_name")]
        sender_name: Option<String>,
        /// Recipient login.
        to: String,
        /// Recipient display name.
        #[serde(default)]
        to_name: Option<String>,
        /// Message body.
        message: String,
        /// Server timestamp.
        timestamp: String,
    },
    /// An operator announcement to every user.
    Broadcast {
        /// Author login.
        #[serde(rename = "from")]
        sender: String,
        /// Author display name.
        #[serde(default, rename = "from_name")]
        sender_name: Option<String>,
        /// Message body.
        message: String,
        /// Server timestamp.
        timestamp: String,
    },
    /// A user came online (operator only).
    UserConnected {
        /// User login.
        user_id: String,
        /// Display name.
        #[serde(default)]
        user_name: Option<String>,
    },
    /// Full user roster (operator only).
    ConnectedUsers {
        /// Known users, connected or not.
        users: Vec<ConnectedUser>,
    },
    /// A page of conversation history.
    ConversationHistory {
        /// Counterpart the page belongs to.
        with_user: String,
        /// Messages, oldest first as stored by the server.
        messages: Vec<HistoryMessage>,
    },
    /// Conversation summaries for the caller.
    ConversationsList {
        /// One entry per counterpart.
        conversations: Vec<ConversationSummary>,
    },
    /// A message that arrived while the recipient was offline.
    OfflineMessage {
        /// Author login.
        #[serde(rename = "from")]
        sender: String,
        /// Author display name.
        #[serde(default, rename = "from_name")]
        sender_name: Option<String>,
        /// Message body.
        message: String,
        /// Delivery class.
        #[serde(default)]
        message_type: Option<String>,
        /// Original send time.
        timestamp: String,
    },
    /// Trails a batch of offline messages.
    OfflineMessagesSummary {
        /// Number of messages just replayed.
        count: u32,
        /// Human readable summary.
        message: String,
    },
    /// Heartbeat reply.
    Pong,
    /// Server-side processing failure.
    Error {
        /// Failure description.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_frames_carry_snake_case_tags() {
        let frame = ClientFrame::AdminToUser {
            to_user: "ivan".to_string(),
            message: "hello".to_string(),
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "admin_to_user");
        assert_eq!(value["to_user"], "ivan");
        assert_eq!(value["message"], "hello");
    }

    #[test]
    fn unit_client_frames_serialize_to_bare_tags() {
        let value = serde_json::to_value(ClientFrame::Ping).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "ping" }));

        let value = serde_json::to_value(ClientFrame::GetConnectedUsers).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "get_connected_users" }));
    }

    #[test]
    fn history_request_includes_paging() {
        let frame = ClientFrame::GetConversationHistory {
            with_user: "admin".to_string(),
            limit: 50,
            offset: 0,
        };
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "get_conversation_history");
        assert_eq!(value["limit"], 50);
        assert_eq!(value["offset"], 0);
    }

    #[test]
    fn welcome_frame_deserializes() {
        let raw = r#"{
            "type": "welcome",
            "message": "Welcome, Ivan!",
            "user_data": { "login": "ivan", "name": "Ivan Petrov", "is_admin": false },
            "timestamp": "2024-05-01T12:00:00"
        }"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ServerFrame::Welcome { user_data, .. } => {
                assert_eq!(user_data.login, "ivan");
                assert!(!user_data.is_admin);
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn sparse_welcome_still_decodes() {
        let raw = r#"{ "type": "welcome", "user_data": { "name": "Ann" } }"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ServerFrame::Welcome {
                user_data,
                message,
                timestamp,
            } => {
                assert_eq!(user_data.name, "Ann");
                assert!(user_data.login.is_empty());
                assert!(!user_data.is_admin);
                assert!(message.is_none());
                assert!(timestamp.is_none());
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn admin_message_maps_from_field() {
        let raw = r#"{
            "type": "admin_message",
            "from": "admin",
            "from_name": "Support",
            "message": "how can I help?",
            "timestamp": "2024-05-01T12:01:00"
        }"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ServerFrame::AdminMessage {
                sender,
                sender_name,
                message,
                ..
            } => {
                assert_eq!(sender, "admin");
                assert_eq!(sender_name.as_deref(), Some("Support"));
                assert_eq!(message, "how can I help?");
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn history_defaults_optional_flags() {
        let raw = r#"{
            "type": "conversation_history",
            "with_user": "ivan",
            "messages": [
                { "sender_id": "ivan", "content": "hi", "timestamp": "2024-05-01T11:59:00" }
            ],
            "timestamp": "2024-05-01T12:00:00"
        }"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ServerFrame::ConversationHistory { with_user, messages } => {
                assert_eq!(with_user, "ivan");
                assert_eq!(messages.len(), 1);
                assert!(!messages[0].is_read);
                assert!(!messages[0].is_archived);
                assert!(messages[0].message_type.is_none());
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn pong_ignores_extra_fields() {
        let raw = r#"{ "type": "pong", "timestamp": "2024-05-01T12:00:00" }"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(frame, ServerFrame::Pong);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let raw = r#"{ "type": "server_restart", "message": "brb" }"#;
        assert!(serde_json::from_str::<ServerFrame>(raw).is_err());
    }

    #[test]
    fn conversations_list_deserializes() {
        let raw = r#"{
            "type": "conversations_list",
            "conversations": [{
                "participant_id": "ivan",
                "participant_name": "Ivan Petrov",
                "last_message": "thanks",
                "last_message_time": "2024-05-01T12:02:00",
                "unread_count": 2
            }]
        }"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        match frame {
            ServerFrame::ConversationsList { conversations } => {
                assert_eq!(conversations[0].participant_id, "ivan");
                assert_eq!(conversations[0].unread_count, 2);
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}
