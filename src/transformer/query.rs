//! Query-level extractors: set operations, single selects, ORDER BY / LIMIT placement.

use sqlparser::ast::{
    Distinct, Expr, GroupByExpr, LimitClause, Query, Select, SelectItem,
    SelectItemQualifiedWildcardKind, SetExpr, SetOperator, SetQuantifier, UnaryOperator, Value,
    WildcardAdditionalOptions,
};

use super::clauses::{
    extract_expr, extract_join, extract_order_by, extract_table_factor, object_name_parts,
};
use crate::ast::builders::{SelectBuilder, SelectQueryBuilder};
use crate::ast::{CombineOperator, Expression, SelectQuery, SetBase};
use crate::error::{SqlError, SqlResult};

/// Convert a full query (possibly compound) into the model.
pub fn extract_query(query: &Query) -> SqlResult<SelectQuery> {
    let (operator, mut members) = query_members(query)?;
    if members.is_empty() {
        return Err(SqlError::invalid_query("query has no select"));
    }
    let first = members.remove(0).build()?;
    let Some(operator) = operator else {
        return Ok(SelectQuery::single(first));
    };
    let mut builder = SelectQueryBuilder::new(first);
    for member in members {
        builder = builder.combine(operator, member.build()?);
    }
    builder.build()
}

/// Members of a query body with the query's ORDER BY / LIMIT attached to the last member.
fn query_members(query: &Query) -> SqlResult<(Option<CombineOperator>, Vec<SelectBuilder>)> {
    if query.with.is_some() {
        return Err(SqlError::unsupported("WITH (common table expressions)"));
    }
    if query.fetch.is_some() {
        return Err(SqlError::unsupported("FETCH"));
    }
    if !query.locks.is_empty() {
        return Err(SqlError::unsupported("locking clauses"));
    }

    let (operator, mut members) = extract_set_expr(&query.body)?;
    let Some(mut last) = members.pop() else {
        return Err(SqlError::invalid_query("query has no select"));
    };
    if operator.is_some()
        && last_member_parenthesized(&query.body)
        && (last.has_order() || last.has_pagination())
    {
        return Err(SqlError::unsupported(
            "ORDER BY or LIMIT inside the last parenthesized member of a compound query",
        ));
    }

    if let Some(order_by) = &query.order_by {
        let orders = extract_order_by(order_by)?;
        if !orders.is_empty() && last.has_order() {
            return Err(SqlError::unsupported(
                "ORDER BY both inside and after a parenthesized query",
            ));
        }
        for order in orders {
            last = last.order_by(order);
        }
    }
    if let Some(limit_clause) = &query.limit_clause {
        let (limit, offset) = extract_limit(limit_clause)?;
        if (limit.is_some() || offset.is_some()) && last.has_pagination() {
            return Err(SqlError::unsupported(
                "LIMIT both inside and after a parenthesized query",
            ));
        }
        if let Some(limit) = limit {
            last = last.limit(limit);
        }
        if let Some(offset) = offset {
            last = last.offset(offset);
        }
    }

    members.push(last);
    if members.iter().any(SelectBuilder::has_clauses_without_from) {
        return Err(SqlError::unsupported("clauses after a select list without FROM"));
    }
    Ok((operator, members))
}

fn last_member_parenthesized(body: &SetExpr) -> bool {
    match body {
        SetExpr::SetOperation { right, .. } => last_member_parenthesized(right),
        SetExpr::Query(_) => true,
        _ => false,
    }
}

/// Flatten a set-expression tree into its members; every operator in it must be the same.
pub fn extract_set_expr(
    body: &SetExpr,
) -> SqlResult<(Option<CombineOperator>, Vec<SelectBuilder>)> {
    match body {
        SetExpr::Select(select) => Ok((None, vec![extract_select(select)?])),
        SetExpr::Query(query) => {
            let (_, members) = query_members(query)?;
            if members.len() != 1 {
                return Err(SqlError::unsupported("nested set operations in parentheses"));
            }
            Ok((None, members))
        }
        SetExpr::SetOperation {
            op,
            set_quantifier,
            left,
            right,
        } => {
            let operator = combine_operator(op, set_quantifier)?;
            let (left_op, mut members) = extract_set_expr(left)?;
            let (right_op, right_members) = extract_set_expr(right)?;
            for other in [left_op, right_op].into_iter().flatten() {
                if other != operator {
                    return Err(SqlError::unsupported(format!(
                        "mixing {} and {} in one query",
                        other, operator
                    )));
                }
            }
            members.extend(right_members);
            Ok((Some(operator), members))
        }
        SetExpr::Values(_) => Err(SqlError::unsupported("VALUES lists")),
        other => Err(SqlError::unsupported(format!("query body: {}", other))),
    }
}

fn combine_operator(op: &SetOperator, quantifier: &SetQuantifier) -> SqlResult<CombineOperator> {
    let base = match op {
        SetOperator::Union => SetBase::Union,
        SetOperator::Intersect => SetBase::Intersect,
        SetOperator::Except => SetBase::Except,
        other => return Err(SqlError::unsupported(format!("set operator {}", other))),
    };
    let all = match quantifier {
        SetQuantifier::All => true,
        SetQuantifier::Distinct | SetQuantifier::None => false,
        other => return Err(SqlError::unsupported(format!("set quantifier {}", other))),
    };
    Ok(CombineOperator::from_parts(base, all))
}

/// One SELECT block, returned unbuilt so the enclosing query's ORDER BY / LIMIT can be added.
pub fn extract_select(select: &Select) -> SqlResult<SelectBuilder> {
    if select.top.is_some() {
        return Err(SqlError::unsupported("TOP"));
    }
    if select.into.is_some() {
        return Err(SqlError::unsupported("SELECT INTO"));
    }
    if !select.lateral_views.is_empty() {
        return Err(SqlError::unsupported("LATERAL VIEW"));
    }
    if !select.named_window.is_empty() || select.qualify.is_some() {
        return Err(SqlError::unsupported("window functions (OVER)"));
    }

    let mut builder = SelectBuilder::new();
    match &select.distinct {
        None => {}
        Some(Distinct::Distinct) => builder = builder.distinct(),
        Some(Distinct::On(_)) => return Err(SqlError::unsupported("DISTINCT ON")),
        #[allow(unreachable_patterns)]
        Some(other) => return Err(SqlError::unsupported(format!("{:?}", other))),
    }

    for item in &select.projection {
        builder = builder.field(extract_select_item(item)?);
    }

    match select.from.as_slice() {
        [] => {}
        [table] => {
            builder = builder.from(extract_table_factor(&table.relation)?);
            for join in &table.joins {
                let (table, join_type, on) = extract_join(join)?;
                builder = builder.join(table, join_type, on);
            }
        }
        _ => return Err(SqlError::unsupported("comma-separated FROM tables")),
    }

    if let Some(selection) = &select.selection {
        builder = builder.where_(extract_expr(selection)?);
    }
    match &select.group_by {
        GroupByExpr::Expressions(exprs, modifiers) => {
            if !modifiers.is_empty() {
                return Err(SqlError::unsupported("GROUP BY modifiers"));
            }
            let exprs = exprs.iter().map(extract_expr).collect::<SqlResult<Vec<_>>>()?;
            builder = builder.group_by(exprs);
        }
        GroupByExpr::All(_) => return Err(SqlError::unsupported("GROUP BY ALL")),
    }
    if let Some(having) = &select.having {
        builder = builder.having(extract_expr(having)?);
    }
    Ok(builder)
}

fn extract_select_item(item: &SelectItem) -> SqlResult<Expression> {
    match item {
        SelectItem::UnnamedExpr(expr) => extract_expr(expr),
        SelectItem::ExprWithAlias { expr, alias } => {
            Ok(extract_expr(expr)?.alias(alias.value.clone()))
        }
        SelectItem::Wildcard(options) => {
            check_wildcard_options(options)?;
            Ok(Expression::Star(None))
        }
        SelectItem::QualifiedWildcard(
            SelectItemQualifiedWildcardKind::ObjectName(name),
            options,
        ) => {
            check_wildcard_options(options)?;
            match object_name_parts(name)?.as_slice() {
                [table] => Ok(Expression::Star(Some(table.clone()))),
                _ => Err(SqlError::unsupported("schema-qualified star")),
            }
        }
        SelectItem::QualifiedWildcard(SelectItemQualifiedWildcardKind::Expr(_), _) => {
            Err(SqlError::unsupported("star over an expression"))
        }
        #[allow(unreachable_patterns)]
        other => Err(SqlError::unsupported(format!("select item {}", other))),
    }
}

fn check_wildcard_options(options: &WildcardAdditionalOptions) -> SqlResult<()> {
    let WildcardAdditionalOptions {
        opt_ilike,
        opt_exclude,
        opt_except,
        opt_replace,
        opt_rename,
        ..
    } = options;
    let modifier = if opt_ilike.is_some() {
        "ILIKE"
    } else if opt_exclude.is_some() {
        "EXCLUDE"
    } else if opt_except.is_some() {
        "EXCEPT"
    } else if opt_replace.is_some() {
        "REPLACE"
    } else if opt_rename.is_some() {
        "RENAME"
    } else {
        return Ok(());
    };
    Err(SqlError::unsupported(format!("* {} modifier", modifier)))
}

/// `(limit, offset)`; a negative limit or the maximum unsigned value means "no limit".
pub fn extract_limit(clause: &LimitClause) -> SqlResult<(Option<u64>, Option<u64>)> {
    let (limit, offset) = match clause {
        LimitClause::LimitOffset {
            limit,
            offset,
            limit_by,
        } => {
            if !limit_by.is_empty() {
                return Err(SqlError::unsupported("LIMIT BY"));
            }
            (limit.as_ref(), offset.as_ref().map(|o| &o.value))
        }
        LimitClause::OffsetCommaLimit { offset, limit } => (Some(limit), Some(offset)),
    };

    let limit = match limit {
        Some(expr) => match row_count(expr)? {
            Some(n) if n != u64::MAX => Some(n),
            _ => None,
        },
        None => None,
    };
    let offset = match offset {
        Some(expr) => Some(row_count(expr)?.ok_or_else(|| {
            SqlError::invalid_query("offset must be a non-negative integer")
        })?),
        None => None,
    };
    Ok((limit, offset))
}

/// `Some(n)` for a non-negative integer, `None` for a negative one.
fn row_count(expr: &Expr) -> SqlResult<Option<u64>> {
    match expr {
        Expr::Value(v) => match &v.value {
            Value::Number(text, _) => text
                .parse()
                .map(Some)
                .map_err(|_| {
                    SqlError::invalid_query(format!("row count {} is not an integer", text))
                }),
            other => Err(SqlError::invalid_query(format!("row count {} is not a number", other))),
        },
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } if matches!(expr.as_ref(), Expr::Value(_)) => {
            row_count(expr)?;
            Ok(None)
        }
        other => Err(SqlError::unsupported(format!("row count expression {}", other))),
    }
}
