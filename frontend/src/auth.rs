//! Session storage and token validation.
//!
//! The session lives in two `localStorage` keys: the bearer token and the
//! serialized profile. A token whose JWT payload carries a past `exp` (or
//! that cannot be decoded at all) counts as expired and wipes the session.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use gloo_storage::{LocalStorage, Storage};
use once_cell::sync::Lazy;
use regex::Regex;
use shared::models::{LoginResponse, UserProfile};

const TOKEN_KEY: &str = "authToken";
const USER_KEY: &str = "userData";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

pub fn token() -> Option<String> {
    LocalStorage::get(TOKEN_KEY).ok()
}

pub fn profile() -> Option<UserProfile> {
    LocalStorage::get(USER_KEY).ok()
}

/// Persist a successful login.
pub fn remember(response: &LoginResponse) {
    if LocalStorage::set(TOKEN_KEY, &response.access_token).is_err()
        || LocalStorage::set(USER_KEY, &response.user).is_err()
    {
        web_sys::console::warn_1(&"failed to persist session".into());
    }
}

/// Forget the stored session.
pub fn clear() {
    LocalStorage::delete(TOKEN_KEY);
    LocalStorage::delete(USER_KEY);
}

/// Whether a non-expired session is stored. An expired or malformed token
/// clears the session as a side effect.
pub fn is_authenticated() -> bool {
    let Some(token) = token() else { return false };
    if token_expired(&token, chrono::Utc::now().timestamp()) {
        clear();
        return false;
    }
    true
}

pub fn is_admin() -> bool {
    profile().is_some_and(|profile| profile.is_admin)
}

/// Expiry check against the JWT `exp` claim. Tokens without an `exp`
/// never expire; tokens that cannot be decoded are treated as expired.
fn token_expired(token: &str, now_secs: i64) -> bool {
    let Some(payload) = jwt_payload(token) else {
        return true;
    };
    match payload.get("exp").and_then(serde_json::Value::as_i64) {
        Some(exp) => exp <= now_secs,
        None => false,
    }
}

fn jwt_payload(token: &str) -> Option<serde_json::Value> {
    let mut parts = token.split('.');
    let _header = parts.next()?;
    let payload = parts.next()?;
    let _signature = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Login form e-mail check: something, an `@`, something, a dot, something.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_jwt(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn future_exp_is_not_expired() {
        let token = fake_jwt(r#"{"sub":"ivan","exp":2000}"#);
        assert!(!token_expired(&token, 1000));
    }

    #[test]
    fn past_exp_is_expired() {
        let token = fake_jwt(r#"{"sub":"ivan","exp":500}"#);
        assert!(token_expired(&token, 1000));
    }

    #[test]
    fn missing_exp_never_expires() {
        let token = fake_jwt(r#"{"sub":"ivan"}"#);
        assert!(!token_expired(&token, i64::MAX));
    }

    #[test]
    fn malformed_tokens_count_as_expired() {
        assert!(token_expired("not-a-jwt", 0));
        assert!(token_expired("one.two", 0));
        assert!(token_expired("a.b.c.d", 0));
        assert!(token_expired("head.%%%.sig", 0));
    }

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(is_valid_email("ivan@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
    }

    #[test]
    fn email_validation_rejects_junk() {
        assert!(!is_valid_email("ivan"));
        assert!(!is_valid_email("ivan@nodot"));
        assert!(!is_valid_email("iv an@example.com"));
        assert!(!is_valid_email("@example.com"));
    }
}
