//! Statement-object front-end.
//!
//! Builds the same query model as the grammar front-end, starting from the
//! `sqlparser` statement tree instead of raw tokens.
//!
//! ```text
//! SQL String → sqlparser::Parser → Statement → extract_* → SelectBuilder → SelectQuery
//! ```

mod clauses;
mod query;
mod tables;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use sqlparser::ast::Statement;
use sqlparser::dialect::{
    Dialect as SqlparserDialect, GenericDialect, MySqlDialect, PostgreSqlDialect,
};
use sqlparser::parser::Parser;
use tracing::debug;

use crate::ast::SelectQuery;
use crate::error::{SqlError, SqlResult};

pub use clauses::{
    extract_expr, extract_function, extract_join, extract_order_by, extract_table_factor,
};
pub use query::{extract_limit, extract_query, extract_select, extract_set_expr};
pub use tables::extract_tables;

/// Dialect handed to the statement parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatementDialect {
    #[default]
    MySql,
    Postgres,
    Generic,
}

impl StatementDialect {
    pub fn parser_dialect(&self) -> Box<dyn SqlparserDialect> {
        match self {
            StatementDialect::MySql => Box::new(MySqlDialect {}),
            StatementDialect::Postgres => Box::new(PostgreSqlDialect {}),
            StatementDialect::Generic => Box::new(GenericDialect {}),
        }
    }
}

/// Parse `sql` with `sqlparser` and convert the single SELECT statement it contains.
pub fn parse_statement(sql: &str, dialect: StatementDialect) -> SqlResult<SelectQuery> {
    debug!(front_end = "statement", ?dialect, len = sql.len(), "parsing");
    let statements = parse_statements(sql, dialect)?;
    match statements.as_slice() {
        [statement] => from_statement(statement),
        [] => Err(SqlError::invalid_query("no statement found")),
        _ => Err(SqlError::unsupported("multiple statements")),
    }
}

/// Convert an already parsed statement.
pub fn from_statement(statement: &Statement) -> SqlResult<SelectQuery> {
    match statement {
        Statement::Query(query) => extract_query(query),
        other => Err(SqlError::unsupported(format!(
            "{} statements",
            statement_keyword(other)
        ))),
    }
}

pub(crate) fn parse_statements(sql: &str, dialect: StatementDialect) -> SqlResult<Vec<Statement>> {
    let parser_dialect = dialect.parser_dialect();
    Ok(Parser::parse_sql(parser_dialect.as_ref(), sql)?)
}

/// Leading keyword of a statement, for error messages.
fn statement_keyword(statement: &Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .next()
        .unwrap_or("unknown")
        .to_uppercase()
}
