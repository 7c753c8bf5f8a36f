//! Clause and expression extractors.

use sqlparser::ast::{
    BinaryOperator, DuplicateTreatment, Expr, Function, FunctionArg, FunctionArgExpr,
    FunctionArguments, Join, JoinConstraint, JoinOperator, ObjectName, ObjectNamePart, OrderBy,
    OrderByExpr, OrderByKind, TableAlias, TableFactor, UnaryOperator, Value,
};

use super::query::extract_query;
use crate::ast::{
    BooleanExpr, BooleanOperator, CaseExpr, Column, Condition, ConditionOperator, ExprList,
    Expression, FuncCall, JoinTableType, OrderExpr, OrderType, TableSource,
};
use crate::error::{SqlError, SqlResult};

/// Extract a table in FROM or JOIN position.
pub fn extract_table_factor(factor: &TableFactor) -> SqlResult<TableSource> {
    match factor {
        TableFactor::Table {
            name, alias, args, ..
        } => {
            if args.is_some() {
                return Err(SqlError::unsupported("table functions"));
            }
            let table = match object_name_parts(name)?.as_slice() {
                [name] => TableSource::named(name),
                [schema, name] => TableSource::qualified(schema, name),
                _ => return Err(SqlError::unsupported("catalog-qualified table names")),
            };
            Ok(match alias {
                Some(alias) => table.with_alias(table_alias(alias)?),
                None => table,
            })
        }
        TableFactor::Derived {
            lateral,
            subquery,
            alias,
            ..
        } => {
            if *lateral {
                return Err(SqlError::unsupported("LATERAL derived tables"));
            }
            let alias = alias
                .as_ref()
                .ok_or_else(|| SqlError::invalid_query("derived table needs an alias"))?;
            Ok(TableSource::derived(extract_query(subquery)?, table_alias(alias)?))
        }
        TableFactor::NestedJoin { .. } => Err(SqlError::unsupported("parenthesized joins")),
        other => Err(SqlError::unsupported(format!("table source {}", other))),
    }
}

fn table_alias(alias: &TableAlias) -> SqlResult<String> {
    if !alias.columns.is_empty() {
        return Err(SqlError::unsupported("column lists in table aliases"));
    }
    Ok(alias.name.value.clone())
}

/// Extract a joined table with its type and ON condition.
pub fn extract_join(join: &Join) -> SqlResult<(TableSource, JoinTableType, Expression)> {
    let (join_type, constraint) = match &join.join_operator {
        JoinOperator::Join(c) | JoinOperator::Inner(c) => (JoinTableType::Inner, c),
        JoinOperator::Left(c) | JoinOperator::LeftOuter(c) => (JoinTableType::Left, c),
        JoinOperator::Right(c) | JoinOperator::RightOuter(c) => (JoinTableType::Right, c),
        JoinOperator::FullOuter(c) => (JoinTableType::Full, c),
        JoinOperator::CrossJoin { .. } => return Err(SqlError::unsupported("CROSS JOIN")),
        other => return Err(SqlError::unsupported(format!("join operator {:?}", other))),
    };
    let on = match constraint {
        JoinConstraint::On(expr) => extract_expr(expr)?,
        JoinConstraint::Using(_) => return Err(SqlError::unsupported("JOIN ... USING")),
        JoinConstraint::Natural => return Err(SqlError::unsupported("NATURAL JOIN")),
        JoinConstraint::None => return Err(SqlError::unsupported("join without ON")),
    };
    Ok((extract_table_factor(&join.relation)?, join_type, on))
}

pub fn extract_order_by(order_by: &OrderBy) -> SqlResult<Vec<OrderExpr>> {
    match &order_by.kind {
        OrderByKind::All(_) => Err(SqlError::unsupported("ORDER BY ALL")),
        OrderByKind::Expressions(exprs) => exprs.iter().map(extract_order_by_expr).collect(),
    }
}

fn extract_order_by_expr(order: &OrderByExpr) -> SqlResult<OrderExpr> {
    if order.options.nulls_first.is_some() {
        return Err(SqlError::unsupported("NULLS FIRST / NULLS LAST"));
    }
    if order.with_fill.is_some() {
        return Err(SqlError::unsupported("WITH FILL"));
    }
    let direction = if order.options.asc == Some(false) {
        OrderType::Desc
    } else {
        OrderType::Asc
    };
    Ok(OrderExpr::new(extract_expr(&order.expr)?, direction))
}

/// Convert a scalar or boolean expression.
pub fn extract_expr(expr: &Expr) -> SqlResult<Expression> {
    match expr {
        Expr::Identifier(ident) => Ok(Column::new(ident.value.clone()).into()),
        Expr::CompoundIdentifier(parts) => match parts.as_slice() {
            [table, name] => Ok(Column::qualified(&table.value, &name.value).into()),
            [schema, table, name] => Ok(Column::qualified(&table.value, &name.value)
                .with_schema(&schema.value)
                .into()),
            _ => Err(SqlError::unsupported(
                "column references with more than three parts",
            )),
        },
        Expr::Value(v) => extract_value(&v.value),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr: inner,
        } => match inner.as_ref() {
            Expr::Value(v) => match &v.value {
                Value::Number(n, _) => Ok(Expression::Literal(format!("-{}", n))),
                _ => Err(SqlError::unsupported("arithmetic operators")),
            },
            _ => Err(SqlError::unsupported("arithmetic operators")),
        },
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            ..
        } => Err(SqlError::unsupported("NOT over an arbitrary expression")),
        Expr::Nested(inner) => extract_expr(inner),
        Expr::BinaryOp { left, op, right } => extract_binary(left, op, right),
        Expr::IsNull(inner) => {
            Ok(BooleanExpr::new(extract_expr(inner)?, BooleanOperator::IsNull, None)?.into())
        }
        Expr::IsNotNull(inner) => {
            Ok(BooleanExpr::new(extract_expr(inner)?, BooleanOperator::IsNotNull, None)?.into())
        }
        Expr::Like {
            negated,
            any,
            expr: subject,
            pattern,
            escape_char,
            ..
        } => {
            if *any || escape_char.is_some() {
                return Err(SqlError::unsupported("LIKE ANY / LIKE ... ESCAPE"));
            }
            let op = BooleanOperator::Like.negated_if(*negated);
            Ok(BooleanExpr::new(extract_expr(subject)?, op, Some(extract_expr(pattern)?))?.into())
        }
        Expr::InList {
            expr: subject,
            list,
            negated,
            ..
        } => {
            let items = list.iter().map(extract_expr).collect::<SqlResult<Vec<_>>>()?;
            let op = BooleanOperator::In.negated_if(*negated);
            let list = ExprList::new(items)?;
            Ok(BooleanExpr::new(extract_expr(subject)?, op, Some(list.into()))?.into())
        }
        Expr::InSubquery {
            expr: subject,
            subquery,
            negated,
            ..
        } => {
            let op = BooleanOperator::In.negated_if(*negated);
            let right = Expression::Subquery(Box::new(extract_query(subquery)?));
            Ok(BooleanExpr::new(extract_expr(subject)?, op, Some(right))?.into())
        }
        Expr::Between {
            expr: subject,
            negated,
            low,
            high,
            ..
        } => Ok(BooleanExpr::between(
            extract_expr(subject)?,
            extract_expr(low)?,
            extract_expr(high)?,
            *negated,
        )
        .into()),
        Expr::Exists {
            subquery, negated, ..
        } => {
            let op = BooleanOperator::Exists.negated_if(*negated);
            let query = Expression::Subquery(Box::new(extract_query(subquery)?));
            Ok(BooleanExpr::new(query, op, None)?.into())
        }
        Expr::Subquery(query) => Ok(Expression::Subquery(Box::new(extract_query(query)?))),
        Expr::Function(function) => extract_function(function),
        Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => {
            let subject = operand.as_deref().map(extract_expr).transpose()?;
            let mut when_then = Vec::with_capacity(conditions.len());
            for case_when in conditions {
                let when = extract_expr(&case_when.condition)?;
                let when = match &subject {
                    Some(subject) => {
                        BooleanExpr::new(subject.clone(), BooleanOperator::Eq, Some(when))?.into()
                    }
                    None => when,
                };
                when_then.push((when, extract_expr(&case_when.result)?));
            }
            let else_result = else_result.as_deref().map(extract_expr).transpose()?;
            Ok(CaseExpr::new(when_then, else_result)?.into())
        }
        Expr::Cast { .. } => Err(SqlError::unsupported("CAST")),
        Expr::Tuple(_) => Err(SqlError::unsupported("row value constructors")),
        other => Err(SqlError::unsupported(format!("expression {}", other))),
    }
}

fn extract_value(value: &Value) -> SqlResult<Expression> {
    match value {
        Value::Number(n, _) => Ok(Expression::Literal(n.clone())),
        Value::SingleQuotedString(s) | Value::DoubleQuotedString(s) => {
            Ok(Expression::Value(s.clone()))
        }
        Value::Boolean(b) => Ok(Expression::from(*b)),
        Value::Null => Ok(Expression::Literal("NULL".to_string())),
        Value::Placeholder(p) => Err(SqlError::unsupported(format!("placeholder {}", p))),
        other => Err(SqlError::unsupported(format!("literal {}", other))),
    }
}

fn extract_binary(left: &Expr, op: &BinaryOperator, right: &Expr) -> SqlResult<Expression> {
    let comparison = match op {
        BinaryOperator::And | BinaryOperator::Or => {
            let operator = if *op == BinaryOperator::And {
                ConditionOperator::And
            } else {
                ConditionOperator::Or
            };
            let mut items = Vec::new();
            collect_chain(left, op, &mut items)?;
            collect_chain(right, op, &mut items)?;
            return Ok(Condition::new(operator, items)?.into());
        }
        BinaryOperator::Eq => BooleanOperator::Eq,
        BinaryOperator::NotEq => BooleanOperator::NotEq,
        BinaryOperator::Gt => BooleanOperator::Gt,
        BinaryOperator::GtEq => BooleanOperator::GtEq,
        BinaryOperator::Lt => BooleanOperator::Lt,
        BinaryOperator::LtEq => BooleanOperator::LtEq,
        BinaryOperator::Plus
        | BinaryOperator::Minus
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Modulo
        | BinaryOperator::StringConcat => {
            return Err(SqlError::unsupported("arithmetic operators"));
        }
        other => return Err(SqlError::unsupported(format!("operator {}", other))),
    };
    Ok(BooleanExpr::new(extract_expr(left)?, comparison, Some(extract_expr(right)?))?.into())
}

/// Flatten an unparenthesized chain of one logical operator; `Nested` stops the flattening.
fn collect_chain(expr: &Expr, op: &BinaryOperator, items: &mut Vec<Expression>) -> SqlResult<()> {
    match expr {
        Expr::BinaryOp {
            left,
            op: inner,
            right,
        } if inner == op => {
            collect_chain(left, op, items)?;
            collect_chain(right, op, items)
        }
        _ => {
            items.push(extract_expr(expr)?);
            Ok(())
        }
    }
}

/// Convert a function call. A bare name without parentheses (`CURRENT_DATE`) becomes a column.
pub fn extract_function(function: &Function) -> SqlResult<Expression> {
    if function.over.is_some() {
        return Err(SqlError::unsupported("window functions (OVER)"));
    }
    if function.filter.is_some() {
        return Err(SqlError::unsupported("aggregate FILTER"));
    }
    if !function.within_group.is_empty() {
        return Err(SqlError::unsupported("WITHIN GROUP"));
    }

    let name = object_name_parts(&function.name)?.join(".");
    match &function.args {
        FunctionArguments::None => Ok(Column::new(name).into()),
        FunctionArguments::Subquery(_) => {
            Err(SqlError::unsupported("subquery as function argument list"))
        }
        FunctionArguments::List(list) => {
            if !list.clauses.is_empty() {
                return Err(SqlError::unsupported("function argument clauses"));
            }
            let distinct = matches!(list.duplicate_treatment, Some(DuplicateTreatment::Distinct));
            let args = list
                .args
                .iter()
                .map(extract_function_arg)
                .collect::<SqlResult<Vec<_>>>()?;
            Ok(FuncCall::new(name, args)?.with_distinct(distinct).into())
        }
    }
}

fn extract_function_arg(arg: &FunctionArg) -> SqlResult<Expression> {
    match arg {
        FunctionArg::Unnamed(FunctionArgExpr::Expr(expr)) => extract_expr(expr),
        FunctionArg::Unnamed(FunctionArgExpr::Wildcard) => Ok(Expression::Star(None)),
        FunctionArg::Unnamed(FunctionArgExpr::QualifiedWildcard(name)) => {
            match object_name_parts(name)?.as_slice() {
                [table] => Ok(Expression::Star(Some(table.clone()))),
                _ => Err(SqlError::unsupported("schema-qualified star")),
            }
        }
        _ => Err(SqlError::unsupported("named function arguments")),
    }
}

pub(crate) fn object_name_parts(name: &ObjectName) -> SqlResult<Vec<String>> {
    name.0
        .iter()
        .map(|part| match part {
            ObjectNamePart::Identifier(ident) => Ok(ident.value.clone()),
            #[allow(unreachable_patterns)]
            other => Err(SqlError::unsupported(format!("name part {:?}", other))),
        })
        .collect()
}
