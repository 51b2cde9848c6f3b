// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::process::channel::Framing;

pub const DEFAULT_GRACE_PERIOD: &str = "1s";
pub const DEFAULT_REFERENCE_PREFIX: &str = "godot_";
pub const DEFAULT_MESSAGE_PREFIX: &str = "MSG:";
pub const DEFAULT_QUIT_TOKEN: &str = "QUIT";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [supervisor]
/// grace_period = "1s"
/// reference_prefix = "godot_"
/// message_prefix = "MSG:"
/// quit_token = "QUIT"
/// ```
///
/// Every field is optional and falls back to the values above.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub supervisor: SupervisorSection,
}

/// `[supervisor]` section, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorSection {
    /// How long `shutdown` waits for a voluntary exit before killing the
    /// child. Duration string such as `"500ms"` or `"2s"`.
    #[serde(default = "default_grace_period")]
    pub grace_period: String,

    /// Prefix of every reference handed out by `create`; a counter starting
    /// at 1 is appended.
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,

    /// Marker written in front of each application message.
    #[serde(default = "default_message_prefix")]
    pub message_prefix: String,

    /// Control line asking the engine to quit.
    #[serde(default = "default_quit_token")]
    pub quit_token: String,
}

fn default_grace_period() -> String {
    DEFAULT_GRACE_PERIOD.to_string()
}

fn default_reference_prefix() -> String {
    DEFAULT_REFERENCE_PREFIX.to_string()
}

fn default_message_prefix() -> String {
    DEFAULT_MESSAGE_PREFIX.to_string()
}

fn default_quit_token() -> String {
    DEFAULT_QUIT_TOKEN.to_string()
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            grace_period: default_grace_period(),
            reference_prefix: default_reference_prefix(),
            message_prefix: default_message_prefix(),
            quit_token: default_quit_token(),
        }
    }
}

/// Validated runtime settings shared by the dispatcher and its components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorSettings {
    pub grace_period: Duration,
    pub reference_prefix: String,
    pub message_prefix: String,
    pub quit_token: String,
}

impl SupervisorSettings {
    pub fn framing(&self) -> Framing {
        Framing::new(&self.message_prefix, &self.quit_token)
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(1),
            reference_prefix: DEFAULT_REFERENCE_PREFIX.to_string(),
            message_prefix: DEFAULT_MESSAGE_PREFIX.to_string(),
            quit_token: DEFAULT_QUIT_TOKEN.to_string(),
        }
    }
}
