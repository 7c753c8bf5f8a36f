//! Ergonomic builders for the query model.
//!
//! ```ignore
//! use sqlcanon::ast::builders::*;
//!
//! let query = select(["a.id", "b.name"])
//!     .from("a")
//!     .inner_join("b", eq("a.id", "b.id"))
//!     .where_(is_not_null("a.id"))
//!     .build()?;
//! ```

mod columns;
mod conditions;
mod select;

pub use columns::*;
pub use conditions::*;
pub use select::*;
