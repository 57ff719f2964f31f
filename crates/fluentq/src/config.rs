//! Query configuration.
//!
//! Loaded from TOML or assembled with builder-style setters:
//!
//! ```toml
//! default_alias = "_this"
//! null_policy = "ignore"        # or "reject"
//! show_query = false
//! log_level = "debug"
//! max_logged_query_length = 200
//! ```

use crate::compiler::NullPolicy;
use crate::error::{QueryError, QueryResult};
use serde::Deserialize;
use std::path::Path;
use tracing::Level;

/// Alias of the primary entity when none is given.
pub const DEFAULT_ALIAS: &str = "_this";

/// Level at which compiled statements are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Settings shared by every query built from it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Alias of the primary entity.
    pub default_alias: String,
    /// Handling of predicates whose required value is null.
    pub null_policy: NullPolicy,
    /// Log compiled statements at INFO instead of `log_level`.
    pub show_query: bool,
    pub log_level: LogLevel,
    /// Truncate logged statements (in bytes). `None` means no truncation.
    pub max_logged_query_length: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_alias: DEFAULT_ALIAS.to_string(),
            null_policy: NullPolicy::Ignore,
            show_query: false,
            log_level: LogLevel::Debug,
            max_logged_query_length: Some(200),
        }
    }
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(raw: &str) -> QueryResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            QueryError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            QueryError::Config(msg) => {
                QueryError::Config(format!("failed to parse config file {}: {msg}", path.display()))
            }
            other => other,
        })
    }

    fn validate(&self) -> QueryResult<()> {
        let alias = self.default_alias.as_str();
        let well_formed = !alias.is_empty()
            && alias
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !well_formed {
            return Err(QueryError::Config(format!(
                "default_alias must be a non-empty identifier, got {alias:?}"
            )));
        }
        Ok(())
    }

    /// Set the default alias.
    pub fn default_alias(mut self, alias: impl Into<String>) -> Self {
        self.default_alias = alias.into();
        self
    }

    /// Set the null-handling policy.
    pub fn null_policy(mut self, policy: NullPolicy) -> Self {
        self.null_policy = policy;
        self
    }

    /// Log compiled statements at INFO.
    pub fn show_query(mut self, show: bool) -> Self {
        self.show_query = show;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Set maximum logged statement length.
    pub fn max_logged_query_length(mut self, len: usize) -> Self {
        self.max_logged_query_length = Some(len);
        self
    }

    /// Disable statement truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_query_length = None;
        self
    }

    /// Effective tracing level for compiled statements.
    pub fn effective_level(&self) -> Level {
        if self.show_query {
            Level::INFO
        } else {
            self.log_level.into()
        }
    }
}
