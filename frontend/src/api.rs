use once_cell::unsync::OnceCell;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::models::{
    ApiErrorBody, ArchiveResponse, ArchivedConversationsResponse, LoginRequest, LoginResponse,
    OpsMessage, UnarchiveResponse, UserInfoResponse,
};
use thiserror::Error;

use crate::auth;
use crate::config::FrontendConfig;

thread_local! {
    static SHARED_CLIENT: OnceCell<SupportApi> = OnceCell::new();
}

/// Failure modes for REST calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport or decoding failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the bearer token; the stored session is gone.
    #[error("session expired")]
    Unauthorized,

    /// The server answered with an application-level error body.
    #[error("{0}")]
    Rejected(String),
}

/// Lightweight API client for the support chat REST surface.
#[derive(Clone, Debug)]
pub struct SupportApi {
    base_url: String,
    client: Client,
}

impl SupportApi {
    /// Create a new API client with the provided base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn shared() -> Self {
        SHARED_CLIENT.with(|cell| {
            cell.get_or_init(|| Self::new(&FrontendConfig::default().api_base_url))
                .clone()
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match auth::token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// 401/403 from a guarded endpoint wipes the session and surfaces as
    /// `Unauthorized`, which pages translate into a redirect to login.
    fn guard(response: Response) -> Result<Response, ApiError> {
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                auth::clear();
                Err(ApiError::Unauthorized)
            }
            _ => Ok(response),
        }
    }

    async fn rejection(response: Response) -> ApiError {
        let fallback = format!("request failed: {}", response.status());
        match response.json::<ApiErrorBody>().await {
            Ok(body) => ApiError::Rejected(body.detail),
            Err(_) => ApiError::Rejected(fallback),
        }
    }

    async fn accept<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::guard(response)?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::rejection(response).await)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.api_url(path);
        let response = self.authorized(self.client.get(url)).send().await?;
        Self::accept(response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.api_url(path);
        let response = self.authorized(self.client.post(url)).send().await?;
        Self::accept(response).await
    }

    /// Authenticate with login/password form credentials.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let url = self.api_url("auth/login");
        let response = self
            .client
            .post(url)
            .form(&[
                ("login", request.login.as_str()),
                ("password", request.password.as_str()),
            ])
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::rejection(response).await)
        }
    }

    /// Profile and message statistics for one user (operator only).
    pub async fn user_info(&self, login: &str) -> Result<UserInfoResponse, ApiError> {
        self.get_json(&format!("ops/user_info_by_login/{login}")).await
    }

    /// List archived conversations (operator only).
    pub async fn archived_conversations(&self) -> Result<ArchivedConversationsResponse, ApiError> {
        self.get_json("ops/archived_conversations").await
    }

    /// Move one conversation to the archive (operator only).
    pub async fn archive_conversation(&self, login: &str) -> Result<ArchiveResponse, ApiError> {
        self.post_json(&format!("ops/archive_conversation/{login}")).await
    }

    /// Restore one archived conversation (operator only).
    pub async fn unarchive_conversation(&self, login: &str) -> Result<UnarchiveResponse, ApiError> {
        self.post_json(&format!("ops/unarchive_conversation/{login}")).await
    }

    /// Drop the server's cached user state (operator only).
    pub async fn clear_user_cache(&self) -> Result<OpsMessage, ApiError> {
        self.post_json("ops/clear_user_cache").await
    }

    /// Re-seed the database (operator only, destructive).
    pub async fn reset_database(&self) -> Result<OpsMessage, ApiError> {
        self.post_json("ops/setup").await
    }
}

/// Build the chat WebSocket URL from the page location: `ws` on plain
/// HTTP, `wss` on HTTPS, token passed as an encoded query parameter.
pub fn websocket_url(login: &str, token: &str) -> Option<String> {
    let location = web_sys::window()?.location();
    let protocol = location.protocol().ok()?;
    let host = location.host().ok()?;
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    let encoded: String = js_sys::encode_uri_component(token).into();
    Some(websocket_url_for(scheme, &host, login, &encoded))
}

pub(crate) fn websocket_url_for(
    scheme: &str,
    host: &str,
    login: &str,
    encoded_token: &str,
) -> String {
    format!("{scheme}://{host}/ws/{login}?token={encoded_token}")
}
