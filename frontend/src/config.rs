//! Frontend configuration module
//!
//! Compile-time defaults for endpoints and paging, overridable through
//! environment variables at build time.

/// Frontend configuration for URLs and paging.
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    /// Base URL for REST calls. Empty means same-origin paths.
    pub api_base_url: String,

    /// Page size for conversation history requests.
    pub history_page_size: u32,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            api_base_url: option_env!("SUPPORT_CHAT_API_BASE")
                .unwrap_or("")
                .to_string(),
            history_page_size: 50,
        }
    }
}

impl FrontendConfig {
    /// Create a new frontend configuration instance
    pub fn new() -> Self {
        Self::default()
    }
}
