//! Counter engine: credential handling, batch fetching and the poll loop.
mod auth;
mod fetch;
mod http;
mod poller;
mod settings;
mod types;

pub use auth::PasswordGrant;
pub use fetch::{parse_listing, BatchSource, RedditSource};
pub use poller::Poller;
pub use settings::{ApiSettings, MAX_POST_LIMIT};
pub use types::{EngineEvent, FailureKind, FetchError, ListingPost};
