//! Command line configuration.
//!
//! Loaded via the `config` crate from an optional `waypost.toml` in the
//! data directory, overridden by `WAYPOST__`-prefixed environment
//! variables (for example `WAYPOST__NOTIFICATION__PERMISSION=granted`).

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use waypost_scheduler::{NotificationTemplate, Permission};

/// Name of the optional configuration file inside the data directory.
pub const CONFIG_FILE: &str = "waypost.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub annotations: AnnotationConfig,
}

/// How fired schedules are presented.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_icon")]
    pub icon: String,

    #[serde(default = "default_require_interaction")]
    pub require_interaction: bool,

    /// Permission to start from. `default` asks on the terminal when the
    /// first schedule fires.
    #[serde(default)]
    pub permission: Permission,

    /// How long the permission prompt waits for an answer.
    #[serde(default = "default_prompt_timeout_secs")]
    pub prompt_timeout_secs: u64,
}

fn default_title() -> String {
    NotificationTemplate::default().title
}

fn default_icon() -> String {
    NotificationTemplate::default().icon
}

fn default_require_interaction() -> bool {
    NotificationTemplate::default().require_interaction
}

fn default_prompt_timeout_secs() -> u64 {
    60
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            icon: default_icon(),
            require_interaction: default_require_interaction(),
            permission: Permission::default(),
            prompt_timeout_secs: default_prompt_timeout_secs(),
        }
    }
}

impl NotificationConfig {
    #[must_use]
    pub fn template(&self) -> NotificationTemplate {
        NotificationTemplate {
            title: self.title.clone(),
            icon: self.icon.clone(),
            require_interaction: self.require_interaction,
        }
    }

    #[must_use]
    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationConfig {
    /// Copy URLs typed into notes into the link list.
    #[serde(default = "default_extract_links")]
    pub extract_links: bool,
}

fn default_extract_links() -> bool {
    true
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            extract_links: default_extract_links(),
        }
    }
}

impl CliConfig {
    /// Loads configuration for the workflow in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an environment override is invalid.
    pub fn load(data_dir: &Path) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(data_dir.join(CONFIG_FILE)).required(false))
            .add_source(
                config::Environment::with_prefix("WAYPOST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
