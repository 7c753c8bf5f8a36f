//! Column, literal and function builders.

use crate::ast::{
    CaseExpr, Column, ExprList, Expression, FuncCall, OrderExpr, OrderType, SelectQuery,
};
use crate::error::SqlResult;

/// Create a column reference from a dotted path (`id`, `a.id`, `s.a.id`).
pub fn col(path: &str) -> Expression {
    Expression::from_path(path)
}

/// Create a table-qualified column reference.
pub fn qualified(table: &str, name: &str) -> Expression {
    Column::qualified(table, name).into()
}

/// Raw text emitted verbatim (numbers, NULL, TRUE).
pub fn lit(text: impl ToString) -> Expression {
    Expression::Literal(text.to_string())
}

/// String value, quoted and escaped on output.
pub fn value(text: impl Into<String>) -> Expression {
    Expression::Value(text.into())
}

pub fn star() -> Expression {
    Expression::Star(None)
}

/// `t.*`
pub fn table_star(table: &str) -> Expression {
    Expression::Star(Some(table.to_string()))
}

/// Create a function call.
/// # Example
/// ```ignore
/// func("count", [star()])?  // count(*)
/// ```
pub fn func(name: &str, args: impl IntoIterator<Item = Expression>) -> SqlResult<Expression> {
    Ok(FuncCall::new(name, args.into_iter().collect())?.into())
}

/// `name(DISTINCT args)`
pub fn func_distinct(
    name: &str,
    args: impl IntoIterator<Item = Expression>,
) -> SqlResult<Expression> {
    Ok(FuncCall::new(name, args.into_iter().collect())?
        .with_distinct(true)
        .into())
}

pub fn alias(expr: impl Into<Expression>, name: &str) -> Expression {
    expr.into().alias(name)
}

pub fn asc(expr: impl Into<Expression>) -> OrderExpr {
    OrderExpr::new(expr, OrderType::Asc)
}

pub fn desc(expr: impl Into<Expression>) -> OrderExpr {
    OrderExpr::new(expr, OrderType::Desc)
}

/// Parenthesized value list for IN / NOT IN.
pub fn list<E: Into<Expression>>(items: impl IntoIterator<Item = E>) -> SqlResult<Expression> {
    Ok(ExprList::new(items.into_iter().map(Into::into).collect())?.into())
}

pub fn subquery(query: impl Into<SelectQuery>) -> Expression {
    Expression::Subquery(Box::new(query.into()))
}

/// Start a searched CASE with its first WHEN/THEN pair.
pub fn case_when(when: impl Into<Expression>, then: impl Into<Expression>) -> CaseBuilder {
    CaseBuilder {
        when_then: vec![(when.into(), then.into())],
        else_result: None,
    }
}

/// Fluent CASE builder. Always holds at least one pair, so `build` cannot fail.
#[derive(Debug, Clone)]
pub struct CaseBuilder {
    when_then: Vec<(Expression, Expression)>,
    else_result: Option<Expression>,
}

impl CaseBuilder {
    pub fn when(mut self, when: impl Into<Expression>, then: impl Into<Expression>) -> Self {
        self.when_then.push((when.into(), then.into()));
        self
    }

    pub fn otherwise(mut self, result: impl Into<Expression>) -> Self {
        self.else_result = Some(result.into());
        self
    }

    pub fn build(self) -> Expression {
        CaseExpr::from_nonempty(self.when_then, self.else_result).into()
    }
}
