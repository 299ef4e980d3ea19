use counter_logging::{engine_debug, engine_info};
use serde::Deserialize;

use crate::auth::PasswordGrant;
use crate::http::{build_client, map_reqwest_error, parse_url, read_body};
use crate::{ApiSettings, FailureKind, FetchError, ListingPost};

/// Where poll cycles get their batches from.
#[async_trait::async_trait]
pub trait BatchSource: Send + Sync {
    /// Latest posts, newest first.
    async fn fetch_batch(&self) -> Result<Vec<ListingPost>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: ChildData,
}

#[derive(Debug, Deserialize)]
struct ChildData {
    title: String,
    #[serde(default)]
    distinguished: Option<String>,
}

/// Parse a `/new` listing body into posts, keeping the delivered order.
pub fn parse_listing(bytes: &[u8]) -> Result<Vec<ListingPost>, FetchError> {
    let listing: Listing = serde_json::from_slice(bytes)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| ListingPost {
            title: child.data.title,
            distinguished: child.data.distinguished,
        })
        .collect())
}

/// Fetches the newest posts of one community with a password-grant token.
pub struct RedditSource {
    client: reqwest::Client,
    settings: ApiSettings,
    auth: PasswordGrant,
}

impl RedditSource {
    pub fn new(settings: ApiSettings) -> Result<Self, FetchError> {
        let client = build_client(&settings)?;
        let auth = PasswordGrant::new(client.clone(), settings.clone());
        Ok(Self {
            client,
            settings,
            auth,
        })
    }

    fn listing_url(&self) -> Result<reqwest::Url, FetchError> {
        let base = self.settings.api_base.trim_end_matches('/');
        let mut url = parse_url(&format!("{base}/r/{}/new", self.settings.community))?;
        url.query_pairs_mut()
            .append_pair("limit", &self.settings.effective_post_limit().to_string());
        Ok(url)
    }

    async fn fetch_with_token(&self, token: &str) -> Result<Vec<ListingPost>, FetchError> {
        let response = self
            .client
            .get(self.listing_url()?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let bytes = read_body(response, self.settings.max_bytes).await?;
        parse_listing(&bytes)
    }
}

#[async_trait::async_trait]
impl BatchSource for RedditSource {
    async fn fetch_batch(&self) -> Result<Vec<ListingPost>, FetchError> {
        let token = self.auth.token().await?;
        let posts = match self.fetch_with_token(&token).await {
            Err(err) if err.kind == FailureKind::HttpStatus(401) => {
                engine_info!("Access token rejected, requesting a new one");
                self.auth.invalidate().await;
                let token = self.auth.token().await?;
                self.fetch_with_token(&token).await?
            }
            other => other?,
        };
        engine_debug!("Fetched {} posts from r/{}", posts.len(), self.settings.community);
        Ok(posts)
    }
}
