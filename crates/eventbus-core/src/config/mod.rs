//! Configuration schemas.
//!
//! The library reads no configuration on its own; [`BusConfig::load`] is for
//! hosts that want to drive logging and dispatch reporting from files.

pub mod dispatch;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::dispatch::DispatchConfig;
pub use self::logging::LoggingConfig;

use crate::error::BusError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Dispatch reporting settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl BusConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default`, an environment-specific overlay
    /// `config/{env}`, and environment variables prefixed with `EVENTBUS__`.
    /// Every source is optional.
    pub fn load(env: &str) -> Result<Self, BusError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("EVENTBUS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| BusError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| BusError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
