//! Condition builders for WHERE, HAVING and ON clauses.

use crate::ast::{BooleanExpr, BooleanOperator, Condition, ExprList, Expression, SelectQuery};
use crate::error::SqlResult;

/// Helper to create a binary comparison
fn compare(
    left: impl Into<Expression>,
    op: BooleanOperator,
    right: impl Into<Expression>,
) -> Expression {
    BooleanExpr::compare(left.into(), op, right.into()).into()
}

/// Create an equality condition (left = right)
pub fn eq(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    compare(left, BooleanOperator::Eq, right)
}

pub fn ne(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    compare(left, BooleanOperator::NotEq, right)
}

pub fn gt(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    compare(left, BooleanOperator::Gt, right)
}
pub fn gte(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    compare(left, BooleanOperator::GtEq, right)
}
pub fn lt(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    compare(left, BooleanOperator::Lt, right)
}

pub fn lte(left: impl Into<Expression>, right: impl Into<Expression>) -> Expression {
    compare(left, BooleanOperator::LtEq, right)
}

pub fn like(left: impl Into<Expression>, pattern: impl Into<Expression>) -> Expression {
    compare(left, BooleanOperator::Like, pattern)
}

pub fn not_like(left: impl Into<Expression>, pattern: impl Into<Expression>) -> Expression {
    compare(left, BooleanOperator::NotLike, pattern)
}

/// `left in (v1, v2, ...)`; fails on an empty value list.
pub fn is_in<V: Into<Expression>>(
    left: impl Into<Expression>,
    values: impl IntoIterator<Item = V>,
) -> SqlResult<Expression> {
    let list = ExprList::new(values.into_iter().map(Into::into).collect())?;
    Ok(compare(left, BooleanOperator::In, list))
}

pub fn not_in<V: Into<Expression>>(
    left: impl Into<Expression>,
    values: impl IntoIterator<Item = V>,
) -> SqlResult<Expression> {
    let list = ExprList::new(values.into_iter().map(Into::into).collect())?;
    Ok(compare(left, BooleanOperator::NotIn, list))
}

/// `left in (SELECT ...)`
pub fn in_subquery(left: impl Into<Expression>, query: impl Into<SelectQuery>) -> Expression {
    compare(left, BooleanOperator::In, Expression::Subquery(Box::new(query.into())))
}

pub fn not_in_subquery(left: impl Into<Expression>, query: impl Into<SelectQuery>) -> Expression {
    compare(left, BooleanOperator::NotIn, Expression::Subquery(Box::new(query.into())))
}

pub fn is_null(left: impl Into<Expression>) -> Expression {
    BooleanExpr::unary(left.into(), BooleanOperator::IsNull).into()
}

pub fn is_not_null(left: impl Into<Expression>) -> Expression {
    BooleanExpr::unary(left.into(), BooleanOperator::IsNotNull).into()
}

/// `subject BETWEEN low AND high`
pub fn between(
    subject: impl Into<Expression>,
    low: impl Into<Expression>,
    high: impl Into<Expression>,
) -> Expression {
    BooleanExpr::between(subject.into(), low.into(), high.into(), false).into()
}

pub fn not_between(
    subject: impl Into<Expression>,
    low: impl Into<Expression>,
    high: impl Into<Expression>,
) -> Expression {
    BooleanExpr::between(subject.into(), low.into(), high.into(), true).into()
}

pub fn exists(query: impl Into<SelectQuery>) -> Expression {
    BooleanExpr::unary(Expression::Subquery(Box::new(query.into())), BooleanOperator::Exists).into()
}

pub fn not_exists(query: impl Into<SelectQuery>) -> Expression {
    BooleanExpr::unary(
        Expression::Subquery(Box::new(query.into())),
        BooleanOperator::NotExists,
    )
    .into()
}

/// Join expressions with AND; fails when `items` is empty.
pub fn and(items: impl IntoIterator<Item = Expression>) -> SqlResult<Expression> {
    Ok(Condition::and(items.into_iter().collect())?.into())
}

/// Join expressions with OR; fails when `items` is empty.
pub fn or(items: impl IntoIterator<Item = Expression>) -> SqlResult<Expression> {
    Ok(Condition::or(items.into_iter().collect())?.into())
}
