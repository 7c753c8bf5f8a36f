//! SELECT SQL generation.

use tracing::warn;

use crate::ast::*;
use crate::transpiler::RenderContext;
use crate::transpiler::expressions::{build_expr, build_list, build_order};

pub fn build_query(query: &SelectQuery, ctx: &RenderContext) -> String {
    let selects = query.single_selects();
    let Some(op) = query.combine_operator() else {
        return selects
            .first()
            .map(|s| build_single(s, ctx))
            .unwrap_or_default();
    };

    if let Some((expected, found)) = query.arity_mismatch() {
        warn!(
            operator = %op,
            expected,
            found,
            "combined selects project different column counts"
        );
    }

    let last = selects.len().saturating_sub(1);
    let separator = format!(" {} ", op.sql_keyword());
    selects
        .iter()
        .enumerate()
        .map(|(i, select)| {
            let sql = build_single(select, ctx);
            // Trailing ORDER BY / LIMIT would otherwise bind to the whole compound.
            if i < last && (!select.order_by.is_empty() || select.has_pagination()) {
                format!("({})", sql)
            } else {
                sql
            }
        })
        .collect::<Vec<_>>()
        .join(&separator)
}

pub fn build_single(select: &SingleSelect, ctx: &RenderContext) -> String {
    let mut sql = if select.distinct {
        String::from("SELECT DISTINCT ")
    } else {
        String::from("SELECT ")
    };

    if select.select_list.is_empty() {
        sql.push('*');
    } else {
        sql.push_str(&build_list(&select.select_list, ctx));
    }

    let Some(from) = &select.from else {
        return sql;
    };

    sql.push_str(" FROM ");
    sql.push_str(&build_table(from, ctx));

    for join in &select.joins {
        sql.push_str(&format!(
            " {} {} ON {}",
            join.join_type.sql_keyword(),
            build_table(&join.table, ctx),
            build_expr(&join.on_condition, ctx)
        ));
    }

    if let Some(condition) = &select.where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(&build_expr(condition, ctx));
    }

    if !select.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&build_list(&select.group_by, ctx));
    }

    if let Some(condition) = &select.having {
        sql.push_str(" HAVING ");
        sql.push_str(&build_expr(condition, ctx));
    }

    if !select.order_by.is_empty() {
        let orders: Vec<String> = select.order_by.iter().map(|o| build_order(o, ctx)).collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&orders.join(", "));
    }

    sql.push_str(&ctx.limit_offset(select.limit, select.offset));
    sql
}

pub fn build_table(table: &TableSource, ctx: &RenderContext) -> String {
    match table {
        TableSource::Named {
            schema,
            name,
            alias,
        } => {
            let mut sql = match schema {
                Some(schema) => format!("{}.{}", ctx.ident(schema), ctx.ident(name)),
                None => ctx.ident(name),
            };
            if let Some(alias) = alias {
                sql.push_str(" as ");
                sql.push_str(&ctx.ident(alias));
            }
            sql
        }
        TableSource::Derived { query, alias } => {
            format!("({}) as {}", build_query(query, ctx), ctx.ident(alias))
        }
    }
}
