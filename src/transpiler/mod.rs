//! SQL Transpiler for the query model.
//!
//! Converts expressions and queries into dialect-specific SQL strings.

pub mod dialect;
pub mod expressions;
pub mod select;
pub mod sql;
pub mod traits;

#[cfg(test)]
mod tests;

use crate::ast::*;
pub use dialect::Dialect;
pub use traits::{IdentifierQuoting, SqlGenerator, needs_quoting};

/// Dialect and quoting policy used for one rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub dialect: Dialect,
    pub quoting: IdentifierQuoting,
}

impl From<Dialect> for RenderOptions {
    fn from(dialect: Dialect) -> Self {
        Self {
            dialect,
            quoting: IdentifierQuoting::default(),
        }
    }
}

/// Generator plus quoting policy, threaded through every render function.
pub struct RenderContext {
    generator: Box<dyn SqlGenerator>,
    quoting: IdentifierQuoting,
}

impl RenderContext {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            generator: options.dialect.generator(),
            quoting: options.quoting,
        }
    }

    /// One identifier part, quoted per the policy.
    pub fn ident(&self, name: &str) -> String {
        self.generator.identifier(name, self.quoting)
    }

    /// A single-quoted, escaped string value.
    pub fn string(&self, value: &str) -> String {
        format!("'{}'", self.generator.escape_string(value))
    }

    pub fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        self.generator.limit_offset(limit, offset)
    }
}

/// Trait for converting AST nodes to SQL.
pub trait ToSql {
    /// Convert this node to a SQL string using default dialect.
    fn to_sql(&self) -> String {
        self.to_sql_with_dialect(Dialect::default())
    }

    /// Convert this node to a SQL string with specific dialect.
    fn to_sql_with_dialect(&self, dialect: Dialect) -> String {
        self.to_sql_with_options(RenderOptions::from(dialect))
    }

    fn to_sql_with_options(&self, options: RenderOptions) -> String;
}

impl ToSql for Expression {
    fn to_sql_with_options(&self, options: RenderOptions) -> String {
        expressions::build_expr(self, &RenderContext::new(options))
    }
}

impl ToSql for OrderExpr {
    fn to_sql_with_options(&self, options: RenderOptions) -> String {
        expressions::build_order(self, &RenderContext::new(options))
    }
}

impl ToSql for TableSource {
    fn to_sql_with_options(&self, options: RenderOptions) -> String {
        select::build_table(self, &RenderContext::new(options))
    }
}

impl ToSql for SingleSelect {
    fn to_sql_with_options(&self, options: RenderOptions) -> String {
        select::build_single(self, &RenderContext::new(options))
    }
}

impl ToSql for SelectQuery {
    fn to_sql_with_options(&self, options: RenderOptions) -> String {
        tracing::debug!(
            dialect = ?options.dialect,
            members = self.single_selects().len(),
            "rendering query"
        );
        select::build_query(self, &RenderContext::new(options))
    }
}
