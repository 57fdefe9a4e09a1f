//! Tries to create an `AppConfig` from config files and the environment.
//! Sources are layered with `figment`: `base.toml`, then `{environment}.toml`, then
//! `APP_`-prefixed env variables and finally the `MAILJET_`-prefixed secrets.
//! Gets initialized with `OnceLock` so it only needs to get initialized once.

mod error;
mod types;

use std::{path::Path, sync::OnceLock};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

// Re-export config structs
pub use error::{ConfigError, ConfigResult};
pub use types::{AppConfig, Environment, MailjetConfig, MailjetCredentials, NetConfig};

/// Allocates a static `OnceLock` containing `AppConfig`.
/// This ensures configuration only gets initialized the first time we call this function.
/// Every other caller gets a &'static ref to AppConfig.
/// Panics if anything goes wrong.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!("{:<20} - Initializing the configuration", "config");
        let base_path = std::env::current_dir().expect("Failed to determine the current DIR.");
        let config_dir = base_path.join("config");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .expect("Failed to parse APP_ENVIRONMENT.");

        load_config(&config_dir, &environment)
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"))
    })
}

/// Builds the `AppConfig` from the files in `config_dir` and the process environment.
pub fn load_config(config_dir: &Path, environment: &Environment) -> ConfigResult<AppConfig> {
    let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

    let config = Figment::new()
        .merge(Toml::file(config_dir.join("base.toml")))
        .merge(Toml::file(config_dir.join(environment_filename)))
        // e.g. `APP_NET_CONFIG__APP_PORT=9000`
        .merge(Env::prefixed("APP_").split("__"))
        // `MAILJET_API_KEY`, `MAILJET_SECRET_KEY`, `MAILJET_CONTACT_LIST_ID`, ...
        .merge(Env::prefixed("MAILJET_").map(|key| {
            format!("mailjet_config.{}", key.as_str().to_ascii_lowercase()).into()
        }))
        .extract::<AppConfig>()?;

    Ok(config)
}
