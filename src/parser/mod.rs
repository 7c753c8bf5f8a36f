//! Grammar front-end.
//!
//! Parses one SQL SELECT statement into a [`SelectQuery`].
//!
//! ```text
//! SELECT o.id, c.name FROM orders o LEFT JOIN customers c ON o.customer_id = c.id
//! ───┬── ─────┬────── ─────┬───────  ───────────────┬──────────────────────────────
//!    │        │            │                        │
//!    │        │            │                        └── JoinTableSource
//!    │        │            └── TableSource (FROM)
//!    │        └── select list
//!    └── SingleSelect
//! ```
//!
//! Keywords match case-insensitively; identifiers keep their spelling.

pub mod grammar;
pub mod session;

#[cfg(test)]
mod tests;

use tracing::debug;

use crate::ast::SelectQuery;
use crate::config::DEFAULT_MAX_INPUT_LEN;
use crate::error::SqlResult;
use grammar::lexer::error_at;

pub use session::{ParserSession, SessionGuard};

/// Parse a SELECT statement using this thread's cached session.
pub fn parse(sql: &str) -> SqlResult<SelectQuery> {
    parse_with_limit(sql, DEFAULT_MAX_INPUT_LEN)
}

/// Parse with an explicit input length limit in bytes.
pub fn parse_with_limit(sql: &str, max_len: usize) -> SqlResult<SelectQuery> {
    debug!(front_end = "grammar", len = sql.len(), "parsing");
    ParserSession::acquire().parse(sql, max_len)
}

/// Parse with a session built for this call only.
pub fn parse_with_fresh_session(sql: &str, max_len: usize) -> SqlResult<SelectQuery> {
    debug!(front_end = "grammar", len = sql.len(), session = "fresh", "parsing");
    ParserSession::new().parse(sql, max_len)
}

/// Reject input longer than `max_len` bytes with a parse error at the first byte past the limit.
pub fn check_input_len(sql: &str, max_len: usize) -> SqlResult<()> {
    if sql.len() <= max_len {
        return Ok(());
    }
    Err(error_at(
        sql,
        max_len,
        "input length limit",
        &format!("input is longer than {} bytes", max_len),
    ))
}
