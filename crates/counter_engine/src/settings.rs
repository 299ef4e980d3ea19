use std::fmt;
use std::time::Duration;

use serde::Deserialize;

pub const MAX_POST_LIMIT: u32 = 100;

/// Credentials and endpoints for the listing API.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub token_url: String,
    pub api_base: String,
    pub community: String,
    pub user_agent: String,
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub client_secret: String,
    pub post_limit: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            token_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            api_base: "https://oauth.reddit.com".to_string(),
            community: "countwitheveryone".to_string(),
            user_agent: concat!("CountWithEveryoneCounter/", env!("CARGO_PKG_VERSION"))
                .to_string(),
            username: String::new(),
            password: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            post_limit: 25,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

impl ApiSettings {
    /// `post_limit` clamped to what the listing endpoint accepts.
    pub fn effective_post_limit(&self) -> u32 {
        self.post_limit.clamp(1, MAX_POST_LIMIT)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Secrets stay out of the logs.
impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("token_url", &self.token_url)
            .field("api_base", &self.api_base)
            .field("community", &self.community)
            .field("user_agent", &self.user_agent)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("post_limit", &self.post_limit)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}
