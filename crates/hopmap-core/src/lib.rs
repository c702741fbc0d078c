pub mod app_config;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod venue;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use venue::{name_key, AliveStatus, Category, Coordinates, Venue, VenuePatch};
