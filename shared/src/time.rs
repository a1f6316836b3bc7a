//! Timestamp handling for chat display.
//!
//! The server speaks Moscow time (UTC+3) and emits two timestamp shapes:
//! RFC 3339 with an offset, and naive ISO without one. Naive values are
//! assumed to be UTC and shifted into the display zone, matching the
//! product's historical behavior. Timestamps stay strings on the wire;
//! parsing happens only when sorting or rendering.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

const DISPLAY_OFFSET_HOURS: i32 = 3;

/// A (time, date) pair ready for chat bubbles: `"HH:MM"` and `"DD.MM"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTime {
    /// Hours and minutes, zero padded.
    pub time: String,
    /// Day and month, zero padded.
    pub date: String,
}

/// The fixed zone all chat timestamps are rendered in.
///
/// # Panics
///
/// Never panics; the offset is a compile-time constant well inside the
/// valid range.
#[must_use]
pub fn display_zone() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_OFFSET_HOURS * 3600).unwrap()
}

/// Parse a wire timestamp into the display zone.
///
/// Accepts RFC 3339 first; a naive `YYYY-MM-DDTHH:MM:SS[.ffffff]` value is
/// treated as UTC. Returns `None` for anything else.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&display_zone()));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            let utc = Utc.from_utc_datetime(&naive);
            return Some(utc.with_timezone(&display_zone()));
        }
    }
    None
}

/// Sort key for ordering messages by wire timestamp.
///
/// Unparsable values sort first, so stable sorts keep their insertion
/// order at the front instead of interleaving them.
#[must_use]
pub fn sort_key(raw: &str) -> i64 {
    parse_timestamp(raw).map_or(i64::MIN, |parsed| parsed.timestamp_millis())
}

/// Format a wire timestamp for a chat bubble.
#[must_use]
pub fn format_chat_time(raw: &str) -> Option<ChatTime> {
    let parsed = parse_timestamp(raw)?;
    Some(ChatTime {
        time: parsed.format("%H:%M").to_string(),
        date: parsed.format("%d.%m").to_string(),
    })
}

/// Current time as an RFC 3339 string in the display zone, used to stamp
/// locally authored messages before the server echo arrives.
#[must_use]
pub fn now_iso() -> String {
    Utc::now().with_timezone(&display_zone()).to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_is_shifted_into_display_zone() {
        let formatted = format_chat_time("2024-05-01T12:00:00+00:00").unwrap();
        assert_eq!(formatted.time, "15:00");
        assert_eq!(formatted.date, "01.05");
    }

    #[test]
    fn offset_timestamps_keep_their_instant() {
        let formatted = format_chat_time("2024-05-01T15:00:00+03:00").unwrap();
        assert_eq!(formatted.time, "15:00");
    }

    #[test]
    fn naive_timestamps_are_assumed_utc() {
        let formatted = format_chat_time("2024-12-31T21:30:00").unwrap();
        assert_eq!(formatted.time, "00:30");
        assert_eq!(formatted.date, "01.01");
    }

    #[test]
    fn fractional_seconds_are_accepted() {
        assert!(parse_timestamp("2024-05-01T12:00:00.123456").is_some());
    }

    #[test]
    fn garbage_yields_none() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(format_chat_time("").is_none());
    }

    #[test]
    fn sort_key_orders_across_timestamp_shapes() {
        let earlier = sort_key("2024-05-01T11:00:00");
        let later = sort_key("2024-05-01T14:30:00+03:00");
        assert!(earlier < later);
    }

    #[test]
    fn sort_key_puts_unparsable_values_first() {
        assert!(sort_key("not a date") < sort_key("1970-01-01T00:00:00"));
    }
}
