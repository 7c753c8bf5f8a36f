//! Expression SQL generation.

use crate::ast::*;
use crate::transpiler::RenderContext;
use crate::transpiler::select::build_query;

pub fn build_expr(expr: &Expression, ctx: &RenderContext) -> String {
    match expr {
        Expression::Column(column) => column
            .parts()
            .into_iter()
            .map(|part| ctx.ident(part))
            .collect::<Vec<_>>()
            .join("."),
        Expression::Literal(text) => text.clone(),
        Expression::Value(text) => ctx.string(text),
        Expression::Star(None) => "*".to_string(),
        Expression::Star(Some(table)) => format!("{}.*", ctx.ident(table)),
        Expression::Alias(alias) => {
            format!("{} as {}", build_operand(&alias.expr, ctx), ctx.ident(&alias.alias))
        }
        Expression::Boolean(boolean) => build_boolean(boolean, ctx),
        Expression::Condition(condition) => build_condition(condition, ctx),
        Expression::Case(case) => build_case(case, ctx),
        Expression::Func(func) => build_func(func, ctx),
        Expression::Order(order) => build_order(order, ctx),
        Expression::List(list) => format!("({})", build_list(list.items(), ctx)),
        Expression::Subquery(query) => format!("({})", build_query(query, ctx)),
    }
}

/// Render an expression in operand position; nested condition groups get parentheses.
fn build_operand(expr: &Expression, ctx: &RenderContext) -> String {
    match expr {
        Expression::Condition(_) => format!("({})", build_expr(expr, ctx)),
        _ => build_expr(expr, ctx),
    }
}

pub(crate) fn build_list(items: &[Expression], ctx: &RenderContext) -> String {
    items
        .iter()
        .map(|item| build_expr(item, ctx))
        .collect::<Vec<_>>()
        .join(", ")
}

fn build_boolean(boolean: &BooleanExpr, ctx: &RenderContext) -> String {
    let op = boolean.operator();
    let left = build_operand(boolean.left(), ctx);

    if op.is_postfix() {
        return format!("{} {}", left, op.sql_symbol());
    }
    if op.is_prefix() {
        return format!("{} {}", op.sql_symbol(), left);
    }

    let right = boolean
        .right()
        .map(|r| build_operand(r, ctx))
        .unwrap_or_default();

    if op.is_range() {
        let keyword = match op {
            BooleanOperator::NotBetween => "NOT BETWEEN",
            _ => "BETWEEN",
        };
        return match boolean.subject() {
            Some(subject) => format!(
                "{} {} {} AND {}",
                build_operand(subject, ctx),
                keyword,
                left,
                right
            ),
            None => format!("{} {} AND {}", keyword, left, right),
        };
    }

    format!("{} {} {}", left, op.sql_symbol(), right)
}

fn build_condition(condition: &Condition, ctx: &RenderContext) -> String {
    let separator = format!(" {} ", condition.operator().sql_keyword());
    condition
        .items()
        .iter()
        .map(|item| build_operand(item, ctx))
        .collect::<Vec<_>>()
        .join(&separator)
}

fn build_case(case: &CaseExpr, ctx: &RenderContext) -> String {
    let mut sql = String::from("CASE");
    for (when, then) in case.when_then() {
        sql.push_str(&format!(
            " WHEN {} THEN {}",
            build_expr(when, ctx),
            build_expr(then, ctx)
        ));
    }
    if let Some(else_result) = case.else_result() {
        sql.push_str(&format!(" ELSE {}", build_expr(else_result, ctx)));
    }
    sql.push_str(" END");
    sql
}

fn build_func(func: &FuncCall, ctx: &RenderContext) -> String {
    let args = build_list(func.args(), ctx);
    if func.is_distinct() {
        format!("{}(DISTINCT {})", func.name(), args)
    } else {
        format!("{}({})", func.name(), args)
    }
}

pub fn build_order(order: &OrderExpr, ctx: &RenderContext) -> String {
    format!(
        "{} {}",
        build_operand(&order.expr, ctx),
        order.direction.sql_keyword()
    )
}
