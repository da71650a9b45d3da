//! Process configuration, built once at entry and passed down.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Environment variable overriding [`ArenaConfig::database_url`].
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Which built-in actor fills a slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentKind {
    /// Uniform choice among empty cells, seeded.
    Random,
    /// First empty cell in row-major order.
    First,
}

/// Runtime configuration for the arena binary.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct ArenaConfig {
    /// SQLite database path.
    #[serde(default = "default_database_url")]
    #[setters(into)]
    database_url: String,

    /// Turn limit per match.
    #[serde(default = "default_max_turns")]
    max_turns: u32,

    /// Actor in the `agentA` slot.
    #[serde(default = "default_agent")]
    agent_a: AgentKind,

    /// Actor in the `agentB` slot.
    #[serde(default = "default_agent")]
    agent_b: AgentKind,
}

fn default_database_url() -> String {
    "strictly_arena.db".to_string()
}

fn default_max_turns() -> u32 {
    9
}

fn default_agent() -> AgentKind {
    AgentKind::Random
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_turns: default_max_turns(),
            agent_a: default_agent(),
            agent_b: default_agent(),
        }
    }
}

impl ArenaConfig {
    /// Parses configuration from TOML text. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid configuration.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Resolves the effective configuration: defaults, then the optional
    /// TOML file, then `DATABASE_URL` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be loaded.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env_override(std::env::var(DATABASE_URL_ENV).ok());
        info!(database_url = %config.database_url, max_turns = config.max_turns, "Config resolved");
        Ok(config)
    }

    /// Replaces the database URL when an override is present and non-empty.
    pub fn with_env_override(self, database_url: Option<String>) -> Self {
        match database_url {
            Some(url) if !url.trim().is_empty() => self.with_database_url(url),
            _ => self,
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = ArenaConfig::from_toml_str("max_turns = 4").unwrap();
        assert_eq!(*config.max_turns(), 4);
        assert_eq!(config.database_url(), "strictly_arena.db");
        assert_eq!(*config.agent_a(), AgentKind::Random);
    }

    #[test]
    fn test_agent_kinds_parse() {
        let config = ArenaConfig::from_toml_str("agent_a = \"first\"\nagent_b = \"random\"").unwrap();
        assert_eq!(*config.agent_a(), AgentKind::First);
        assert_eq!(*config.agent_b(), AgentKind::Random);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(ArenaConfig::from_toml_str("max_turns = \"many\"").is_err());
    }

    #[test]
    fn test_env_override_replaces_database_url() {
        let config = ArenaConfig::default().with_env_override(Some("other.db".to_string()));
        assert_eq!(config.database_url(), "other.db");
        let config = config.with_env_override(Some("  ".to_string()));
        assert_eq!(config.database_url(), "other.db");
        let config = config.with_env_override(None);
        assert_eq!(config.database_url(), "other.db");
    }
}
