//! # sqlcanon
//!
//! A canonical model of SQL SELECT queries with two parsing front-ends, a fluent
//! builder and a dialect-aware renderer.
//!
//! ## Quick Example
//!
//! ```
//! use sqlcanon::prelude::*;
//!
//! // Parse with the built-in grammar
//! let query = sqlcanon::parse("SELECT a.id, b.name FROM a JOIN b ON a.id = b.id").unwrap();
//!
//! // Render for another dialect
//! let sql = query.to_sql_with_dialect(Dialect::Postgres);
//! assert_eq!(sql, "SELECT a.id, b.name FROM a JOIN b ON a.id = b.id");
//!
//! // Or build the same query
//! let built: SelectQuery = select(["a.id", "b.name"])
//!     .from("a")
//!     .inner_join("b", eq("a.id", "b.id"))
//!     .build()
//!     .unwrap()
//!     .into();
//! assert_eq!(built, query);
//! ```
//!
//! ## Layout
//!
//! | Module        | Role                                                 |
//! |---------------|------------------------------------------------------|
//! | `ast`         | Query model and builders                             |
//! | `parser`      | Grammar front-end (nom lexer + recursive descent)    |
//! | `transformer` | Statement-object front-end (`sqlparser`)             |
//! | `transpiler`  | Rendering for MySQL, PostgreSQL and SQLite           |
//! | `config`      | TOML configuration                                   |

pub mod ast;
pub mod config;
pub mod error;
pub mod parser;
pub mod transformer;
pub mod transpiler;

use tracing::debug;

use crate::config::{Config, FrontEnd, SessionMode};

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::*;
    pub use crate::config::Config;
    pub use crate::error::*;
    pub use crate::parser::parse;
    pub use crate::transformer::{StatementDialect, parse_statement};
    pub use crate::transpiler::{Dialect, IdentifierQuoting, RenderOptions, ToSql};
}

/// Parse a SELECT statement with the grammar front-end.
///
/// # Example
///
/// ```
/// let query = sqlcanon::parse("SELECT id FROM users").unwrap();
/// assert_eq!(query.single_selects().len(), 1);
/// ```
pub fn parse(sql: &str) -> error::SqlResult<ast::SelectQuery> {
    parser::parse(sql)
}

/// Parse with the configured front-end and render with the configured dialect.
///
/// # Example
///
/// ```
/// let config = sqlcanon::config::Config::from_toml_str("[render]\ndialect = \"sqlite\"").unwrap();
/// let sql = sqlcanon::transpile("SELECT a FROM t OFFSET 5", &config).unwrap();
/// assert_eq!(sql, "SELECT a FROM t LIMIT -1 OFFSET 5");
/// ```
pub fn transpile(sql: &str, config: &Config) -> error::SqlResult<String> {
    let max_len = config.parse.max_input_len;
    parser::check_input_len(sql, max_len)?;

    let query = match (config.parse.front_end, config.parse.session) {
        (FrontEnd::Grammar, SessionMode::Cached) => parser::parse_with_limit(sql, max_len)?,
        (FrontEnd::Grammar, SessionMode::Fresh) => parser::parse_with_fresh_session(sql, max_len)?,
        (FrontEnd::Statement, _) => {
            transformer::parse_statement(sql, config.parse.statement_dialect)?
        }
    };

    let options = config.render.options();
    debug!(dialect = ?options.dialect, quoting = ?options.quoting, "rendering");
    Ok(transpiler::ToSql::to_sql_with_options(&query, options))
}
