//! Transpiler traits and utilities.

use serde::{Deserialize, Serialize};

/// SQL reserved words that must be quoted when used as identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "all",
    "alter",
    "and",
    "as",
    "asc",
    "between",
    "by",
    "case",
    "cast",
    "check",
    "constraint",
    "create",
    "cross",
    "default",
    "delete",
    "desc",
    "distinct",
    "drop",
    "else",
    "end",
    "except",
    "exists",
    "false",
    "foreign",
    "from",
    "full",
    "group",
    "having",
    "in",
    "index",
    "inner",
    "insert",
    "intersect",
    "is",
    "join",
    "key",
    "left",
    "like",
    "limit",
    "natural",
    "not",
    "null",
    "offset",
    "on",
    "or",
    "order",
    "outer",
    "over",
    "primary",
    "references",
    "right",
    "select",
    "table",
    "then",
    "true",
    "union",
    "update",
    "user",
    "using",
    "when",
    "where",
    "with",
];

/// Whether an identifier part must be quoted to survive a re-parse.
pub fn needs_quoting(name: &str) -> bool {
    let lower = name.to_lowercase();
    name.is_empty()
        || RESERVED_WORDS.contains(&lower.as_str())
        || name.chars().any(|c| !c.is_alphanumeric() && c != '_')
        || name.chars().next().map(|c| c.is_numeric()).unwrap_or(false)
}

/// When identifiers are quoted on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierQuoting {
    /// Only reserved words, special characters and leading digits.
    #[default]
    AsNeeded,
    Always,
}

/// Trait for dialect-specific SQL generation.
pub trait SqlGenerator {
    /// Quote an identifier part (table, column or alias name).
    fn quote_identifier(&self, name: &str) -> String;

    /// Escape the body of a single-quoted string value.
    fn escape_string(&self, value: &str) -> String {
        value.replace('\'', "''")
    }

    /// Pagination suffix, with a leading space, or empty.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String;

    fn identifier(&self, name: &str, quoting: IdentifierQuoting) -> String {
        match quoting {
            IdentifierQuoting::Always => self.quote_identifier(name),
            IdentifierQuoting::AsNeeded if needs_quoting(name) => self.quote_identifier(name),
            IdentifierQuoting::AsNeeded => name.to_string(),
        }
    }
}

/// Standard `LIMIT n OFFSET m` form shared by every dialect when a limit is present.
pub(crate) fn standard_limit_offset(limit: u64, offset: Option<u64>) -> String {
    match offset {
        Some(offset) => format!(" LIMIT {} OFFSET {}", limit, offset),
        None => format!(" LIMIT {}", limit),
    }
}
