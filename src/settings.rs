/// Runtime settings for the command line tools
///
/// Settings come from an optional TOML file merged with environment
/// variables prefixed with `MIXFAT`, e.g. `MIXFAT_CONTINUE_ON_ERROR=true`.
/// Command line flags take precedence over both.
use config::{Config, ConfigError};
use log::{debug, warn};

use std::path::PathBuf;

use crate::error::Result;
use crate::extract::OnError;

/// Default location of the settings file
pub const DEFAULT_CONFIG: &str = "config/mix-fat.toml";

/// Prefix for settings taken from the environment
pub const ENV_PREFIX: &str = "MIXFAT";

/// Settings shared by the command line tools
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Directory extracted members are written to
    pub output_path: PathBuf,
    /// Keep extracting after an entry fails
    pub continue_on_error: bool,
    /// Print details while working
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output_path: PathBuf::from("output"),
            continue_on_error: false,
            verbose: false,
        }
    }
}

impl Settings {
    /// Load settings from `config_name` and the environment.
    /// A missing file is not an error.
    pub fn load(config_name: &str) -> Result<Self> {
        let config = load_settings(config_name)?;
        Ok(Settings::from_config(&config))
    }

    /// Pick settings out of a merged config, falling back to defaults
    pub fn from_config(config: &Config) -> Self {
        let mut settings = Settings::default();

        if let Some(s) = setting(config.get_string("output_path"), "output_path") {
            settings.output_path = PathBuf::from(s);
        }
        if let Some(b) = setting(config.get_bool("continue_on_error"), "continue_on_error") {
            settings.continue_on_error = b;
        }
        if let Some(b) = setting(config.get_bool("verbose"), "verbose") {
            settings.verbose = b;
        }
        debug!("Settings: {:?}", settings);

        settings
    }

    /// The extraction error policy these settings ask for
    pub fn on_error(&self) -> OnError {
        if self.continue_on_error {
            OnError::Continue
        } else {
            OnError::Abort
        }
    }
}

/// An unset key is silent, a key with a bad value is logged and ignored
fn setting<T>(value: std::result::Result<T, ConfigError>, key: &str) -> Option<T> {
    match value {
        Ok(v) => Some(v),
        Err(ConfigError::NotFound(_)) => None,
        Err(e) => {
            warn!("ignoring setting {}: {}", key, e);
            None
        }
    }
}

/// load settings from a config file
/// returns the config settings as a Config on success, or a ConfigError on failure
pub fn load_settings(config_name: &str) -> std::result::Result<Config, ConfigError> {
    Config::builder()
        .add_source(config::File::with_name(config_name).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()
}
