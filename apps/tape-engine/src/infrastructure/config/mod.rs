//! Configuration Module
//!
//! Environment-driven configuration and feed endpoint resolution.

mod endpoint;
mod settings;

pub use endpoint::{DEFAULT_ENDPOINT, OriginContext, resolve_endpoint};
pub use settings::{ConfigError, EngineConfig, ReplaySettings, load_dotenv};
