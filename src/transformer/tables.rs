//! Table lineage: every relation a statement reads or writes.

use std::ops::ControlFlow;

use sqlparser::ast::visit_relations;
use tracing::debug;

use super::clauses::object_name_parts;
use super::{StatementDialect, parse_statements};
use crate::error::{SqlError, SqlResult};

/// Names of all tables referenced by `sql`, in first-seen order without duplicates.
///
/// Accepts any statement kind the statement parser understands, not only SELECT.
/// Qualified names keep their qualifier (`shop.orders`).
pub fn extract_tables(sql: &str, dialect: StatementDialect) -> SqlResult<Vec<String>> {
    let statements = parse_statements(sql, dialect)?;
    let mut tables: Vec<String> = Vec::new();
    let mut failure: Option<SqlError> = None;

    let _ = visit_relations(&statements, |name| match object_name_parts(name) {
        Ok(parts) => {
            let joined = parts.join(".");
            if !tables.contains(&joined) {
                tables.push(joined);
            }
            ControlFlow::Continue(())
        }
        Err(err) => {
            failure = Some(err);
            ControlFlow::Break(())
        }
    });

    if let Some(err) = failure {
        return Err(err);
    }
    debug!(count = tables.len(), "extracted tables");
    Ok(tables)
}
