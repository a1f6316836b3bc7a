use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::time;

/// Which side of the conversation authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Authored locally.
    Sent,
    /// Authored by the counterpart.
    Received,
}

/// One message as cached in the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Message body.
    pub content: String,

    /// Author login.
    pub sender: String,

    /// Author display name, when known.
    #[serde(default)]
    pub sender_name: Option<String>,

    /// Wire timestamp, kept as received.
    pub timestamp: String,

    /// Local or remote authorship.
    pub direction: Direction,

    /// Delivered from the offline queue.
    #[serde(default)]
    pub offline: bool,

    /// Part of an archived conversation.
    #[serde(default)]
    pub archived: bool,

    /// Operator announcement to every user.
    #[serde(default)]
    pub broadcast: bool,
}

/// Per-counterpart message cache mirrored to `localStorage`.
///
/// The server may replay history that overlaps live traffic, so every
/// insertion is deduplicated by the (content, timestamp, sender) triple.
/// Bulk loads re-sort by parsed timestamp; no server-side ordering is
/// assumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationCache {
    conversations: BTreeMap<String, Vec<StoredMessage>>,
}

impl ConversationCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one message unless an identical one is already cached.
    /// Returns whether the message was inserted.
    pub fn push(&mut self, counterpart: &str, message: StoredMessage) -> bool {
        let messages = self.conversations.entry(counterpart.to_string()).or_default();
        let duplicate = messages.iter().any(|existing| {
            existing.content == message.content
                && existing.timestamp == message.timestamp
                && existing.sender == message.sender
        });
        if duplicate {
            return false;
        }
        messages.push(message);
        true
    }

    /// Bulk-insert a history page, then re-sort the conversation by
    /// timestamp. Returns how many messages were new.
    pub fn merge_history(
        &mut self,
        counterpart: &str,
        history: impl IntoIterator<Item = StoredMessage>,
    ) -> usize {
        let mut inserted = 0;
        for message in history {
            if self.push(counterpart, message) {
                inserted += 1;
            }
        }
        if let Some(messages) = self.conversations.get_mut(counterpart) {
            messages.sort_by_key(|message| time::sort_key(&message.timestamp));
        }
        inserted
    }

    /// Messages cached for one counterpart, oldest first after a merge.
    #[must_use]
    pub fn messages(&self, counterpart: &str) -> &[StoredMessage] {
        self.conversations
            .get(counterpart)
            .map_or(&[], Vec::as_slice)
    }

    /// Logins with at least one cached message.
    #[must_use]
    pub fn counterparts(&self) -> impl Iterator<Item = &str> {
        self.conversations.keys().map(String::as_str)
    }

    /// Timestamp of the newest cached message for a counterpart.
    #[must_use]
    pub fn last_activity(&self, counterpart: &str) -> Option<&str> {
        self.conversations
            .get(counterpart)?
            .iter()
            .max_by_key(|message| time::sort_key(&message.timestamp))
            .map(|message| message.timestamp.as_str())
    }

    /// Drop one conversation.
    pub fn remove(&mut self, counterpart: &str) {
        self.conversations.remove(counterpart);
    }

    /// Whether nothing is cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str, sender: &str, timestamp: &str) -> StoredMessage {
        StoredMessage {
            content: content.to_string(),
            sender: sender.to_string(),
            sender_name: None,
            timestamp: timestamp.to_string(),
            direction: if sender == "admin" {
                Direction::Received
            } else {
                Direction::Sent
            },
            offline: false,
            archived: false,
            broadcast: false,
        }
    }

    #[test]
    fn duplicate_triple_is_rejected() {
        let mut cache = ConversationCache::new();
        assert!(cache.push("admin", message("hi", "ivan", "2024-05-01T12:00:00")));
        assert!(!cache.push("admin", message("hi", "ivan", "2024-05-01T12:00:00")));
        assert_eq!(cache.messages("admin").len(), 1);
    }

    #[test]
    fn same_content_different_sender_is_kept() {
        let mut cache = ConversationCache::new();
        assert!(cache.push("admin", message("ok", "ivan", "2024-05-01T12:00:00")));
        assert!(cache.push("admin", message("ok", "admin", "2024-05-01T12:00:00")));
        assert_eq!(cache.messages("admin").len(), 2);
    }

    #[test]
    fn merge_sorts_unordered_history() {
        let mut cache = ConversationCache::new();
        cache.push("admin", message("live", "admin", "2024-05-01T12:05:00"));
        let inserted = cache.merge_history(
            "admin",
            vec![
                message("second", "ivan", "2024-05-01T12:01:00"),
                message("first", "admin", "2024-05-01T12:00:00"),
            ],
        );
        assert_eq!(inserted, 2);
        let contents: Vec<_> = cache
            .messages("admin")
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second", "live"]);
    }

    #[test]
    fn merge_skips_messages_already_seen_live() {
        let mut cache = ConversationCache::new();
        cache.push("admin", message("hello", "admin", "2024-05-01T12:00:00"));
        let inserted = cache.merge_history(
            "admin",
            vec![message("hello", "admin", "2024-05-01T12:00:00")],
        );
        assert_eq!(inserted, 0);
        assert_eq!(cache.messages("admin").len(), 1);
    }

    #[test]
    fn unknown_counterpart_is_an_empty_slice() {
        let cache = ConversationCache::new();
        assert!(cache.messages("nobody").is_empty());
        assert!(cache.last_activity("nobody").is_none());
    }

    #[test]
    fn last_activity_picks_latest_timestamp() {
        let mut cache = ConversationCache::new();
        cache.push("ivan", message("a", "ivan", "2024-05-01T12:00:00"));
        cache.push("ivan", message("b", "ivan", "2024-05-01T13:00:00"));
        cache.push("ivan", message("c", "ivan", "2024-05-01T12:30:00"));
        assert_eq!(cache.last_activity("ivan"), Some("2024-05-01T13:00:00"));
    }

    #[test]
    fn cache_round_trips_through_json() {
        let mut cache = ConversationCache::new();
        cache.push("admin", message("persist me", "ivan", "2024-05-01T12:00:00"));
        let raw = serde_json::to_string(&cache).unwrap();
        let parsed: ConversationCache = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, cache);
    }
}
