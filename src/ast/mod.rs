//! Canonical SELECT model.
//!
//! [`Expression`] nodes form the scalar and boolean layer; [`SingleSelect`] and
//! [`SelectQuery`] form the clause layer. Both front-ends and the builders produce these
//! types, and the transpiler renders them.

pub mod builders;
pub mod expr;
pub mod operators;
pub mod query;

pub use expr::*;
pub use operators::*;
pub use query::*;
