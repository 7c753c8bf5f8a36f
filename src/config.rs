//! Configuration for parsing and rendering, loaded from TOML.
//!
//! ```toml
//! [parse]
//! front_end = "statement"
//! statement_dialect = "postgres"
//!
//! [render]
//! dialect = "sqlite"
//! quote_identifiers = "always"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SqlError, SqlResult};
use crate::transformer::StatementDialect;
use crate::transpiler::{Dialect, IdentifierQuoting, RenderOptions};

/// File name looked up under the platform config directory.
pub const CONFIG_FILE: &str = "sqlcanon/config.toml";

/// Default upper bound on SQL input length, in bytes.
pub const DEFAULT_MAX_INPUT_LEN: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Which parser turns SQL text into the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontEnd {
    /// Built-in grammar (nom lexer + recursive descent).
    #[default]
    Grammar,
    /// sqlparser statement objects.
    Statement,
}

/// Whether the grammar front-end reuses its per-thread session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    #[default]
    Cached,
    Fresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParseConfig {
    #[serde(default)]
    pub front_end: FrontEnd,
    #[serde(default)]
    pub statement_dialect: StatementDialect,
    #[serde(default = "default_max_input_len")]
    pub max_input_len: usize,
    #[serde(default)]
    pub session: SessionMode,
}

fn default_max_input_len() -> usize {
    DEFAULT_MAX_INPUT_LEN
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            front_end: FrontEnd::default(),
            statement_dialect: StatementDialect::default(),
            max_input_len: DEFAULT_MAX_INPUT_LEN,
            session: SessionMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub quote_identifiers: IdentifierQuoting,
}

impl RenderConfig {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            dialect: self.dialect,
            quoting: self.quote_identifiers,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> SqlResult<Self> {
        let config: Config = toml::from_str(content)?;
        if config.parse.max_input_len == 0 {
            return Err(SqlError::Config(
                "parse.max_input_len must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SqlResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `sqlcanon/config.toml` from the user config directory, or defaults when absent.
    pub fn discover() -> SqlResult<Self> {
        match dirs::config_dir().map(|dir| dir.join(CONFIG_FILE)) {
            Some(path) if path.is_file() => Self::load(path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.parse.max_input_len, 1_048_576);
        assert_eq!(config.parse.front_end, FrontEnd::Grammar);
        assert_eq!(config.render.dialect, Dialect::MySql);
    }

    #[test]
    fn test_full_document() {
        let config = Config::from_toml_str(
            r#"
            [parse]
            front_end = "statement"
            statement_dialect = "postgres"
            max_input_len = 4096
            session = "fresh"

            [render]
            dialect = "sqlite"
            quote_identifiers = "always"
            "#,
        )
        .unwrap();
        assert_eq!(config.parse.front_end, FrontEnd::Statement);
        assert_eq!(config.parse.statement_dialect, StatementDialect::Postgres);
        assert_eq!(config.parse.max_input_len, 4096);
        assert_eq!(config.parse.session, SessionMode::Fresh);
        assert_eq!(
            config.render.options(),
            RenderOptions {
                dialect: Dialect::Sqlite,
                quoting: IdentifierQuoting::Always,
            }
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml_str("[render]\ncolour = \"blue\"").unwrap_err();
        assert!(matches!(err, SqlError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/nonexistent/sqlcanon.toml").unwrap_err();
        assert!(matches!(err, SqlError::Io(_)));
    }
}
