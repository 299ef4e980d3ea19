//! Counter app: configuration, HTTP surface and the effect runner that ties
//! the engine's poll loop to the core state machine.
pub mod config;
pub mod effects;
pub mod hub;
pub mod server;

pub use config::{load_config, parse_config, AppConfig, AppSection, ConfigError};
pub use effects::{drive, to_msg, EffectRunner};
pub use hub::StatusHub;
pub use server::{build_router, ServerState};
