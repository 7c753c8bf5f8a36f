//! Error types for sqlcanon.

use thiserror::Error;

/// The main error type for parsing, building and configuring queries.
#[derive(Debug, Error)]
pub enum SqlError {
    /// Malformed SQL text rejected by the grammar front-end.
    #[error("Parse error at line {line}, column {column} near '{found}': {message}")]
    Parse {
        line: usize,
        column: usize,
        found: String,
        message: String,
    },

    /// Valid SQL that falls outside the supported SELECT subset.
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Structurally invalid expression node (empty condition group, empty CASE, ...).
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Structurally invalid query (combine operator without enough selects, duplicate join, ...).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Failure reported by the statement-object toolkit.
    #[error("Statement error: {0}")]
    Statement(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SqlError {
    /// Create a parse error at the given line and column.
    pub fn parse(
        line: usize,
        column: usize,
        found: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            line,
            column,
            found: found.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature(feature.into())
    }

    pub fn invalid_expression(message: impl Into<String>) -> Self {
        Self::InvalidExpression(message.into())
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    /// True for errors that carry a source position.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

impl From<sqlparser::parser::ParserError> for SqlError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        Self::Statement(err.to_string())
    }
}

impl From<toml::de::Error> for SqlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for sqlcanon operations.
pub type SqlResult<T> = Result<T, SqlError>;
