//! Walks the concrete syntax tree and emits the query model through the builders.

use super::lexer::{Keyword, Symbol, Token, TokenKind, error_at};
use super::tree::{Rule, SyntaxNode};
use crate::ast::builders::{SelectBuilder, SelectQueryBuilder};
use crate::ast::{
    BooleanExpr, BooleanOperator, CaseExpr, Column, CombineOperator, ConditionOperator,
    Condition, ExprList, Expression, FuncCall, JoinTableType, OrderExpr, OrderType, SelectQuery,
    TableSource,
};
use crate::error::{SqlError, SqlResult};

/// Row count in LIMIT position; negative counts and the maximum unsigned value mean "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowCount {
    Rows(u64),
    Unbounded,
}

pub struct ModelVisitor<'a> {
    source: &'a str,
}

impl<'a> ModelVisitor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    pub fn visit_statement(&self, node: &SyntaxNode) -> SqlResult<SelectQuery> {
        let query = required(node.child(Rule::QueryExpression), "query expression")?;
        self.visit_query(query)
    }

    fn visit_query(&self, node: &SyntaxNode) -> SqlResult<SelectQuery> {
        let (operator, mut members) = self.members(node)?;
        let first = members.remove(0).build()?;
        let Some(operator) = operator else {
            return Ok(SelectQuery::single(first));
        };
        let mut query = SelectQueryBuilder::new(first);
        for member in members {
            query = query.combine(operator, member.build()?);
        }
        query.build()
    }

    /// Members of a query expression, with trailing ORDER BY / LIMIT attached to the last one.
    fn members(
        &self,
        node: &SyntaxNode,
    ) -> SqlResult<(Option<CombineOperator>, Vec<SelectBuilder>)> {
        let mut operator: Option<CombineOperator> = None;
        for op in node.children_of(Rule::SetOperator) {
            let text = op
                .tokens()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let parsed = CombineOperator::from_sql(&text)
                .ok_or_else(|| SqlError::unsupported(format!("set operator {}", text)))?;
            match operator {
                Some(existing) if existing != parsed => {
                    return Err(SqlError::unsupported(format!(
                        "mixing {} and {} in one query",
                        existing, parsed
                    )));
                }
                _ => operator = Some(parsed),
            }
        }

        let terms: Vec<&SyntaxNode> = node.children_of(Rule::QueryTerm).collect();
        let mut members = terms
            .iter()
            .map(|term| self.visit_query_term(term))
            .collect::<SqlResult<Vec<_>>>()?;

        let order_by = match node.child(Rule::OrderByClause) {
            Some(clause) => self.visit_order_by(clause)?,
            None => Vec::new(),
        };
        let pagination = match node.child(Rule::LimitClause) {
            Some(clause) => Some(self.visit_limit(clause)?),
            None => None,
        };

        let Some(mut last) = members.pop() else {
            return Err(SqlError::invalid_query("query has no select"));
        };
        let last_parenthesized = terms
            .last()
            .is_some_and(|term| term.child(Rule::QuerySpecification).is_none());
        if operator.is_some()
            && last_parenthesized
            && (last.has_order() || last.has_pagination())
        {
            return Err(SqlError::unsupported(
                "ORDER BY or LIMIT inside the last parenthesized member of a compound query",
            ));
        }
        if !order_by.is_empty() {
            if last.has_order() {
                return Err(SqlError::unsupported(
                    "ORDER BY both inside and after a parenthesized query",
                ));
            }
            for order in order_by {
                last = last.order_by(order);
            }
        }
        if let Some((limit, offset)) = pagination {
            if last.has_pagination() {
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

    fn visit_query_term(&self, node: &SyntaxNode) -> SqlResult<SelectBuilder> {
        if let Some(spec) = node.child(Rule::QuerySpecification) {
            return self.visit_query_specification(spec);
        }
        let inner = required(node.child(Rule::QueryExpression), "parenthesized query")?;
        let (_, mut members) = self.members(inner)?;
        if members.len() != 1 {
            return Err(SqlError::unsupported("nested set operations in parentheses"));
        }
        members
            .pop()
            .ok_or_else(|| SqlError::invalid_query("query has no select"))
    }

    fn visit_query_specification(&self, node: &SyntaxNode) -> SqlResult<SelectBuilder> {
        let mut builder = SelectBuilder::new();
        if node.has_keyword(Keyword::Distinct) {
            builder = builder.distinct();
        }

        let list = required(node.child(Rule::SelectList), "select list")?;
        for item in list.children_of(Rule::SelectItem) {
            builder = builder.field(self.visit_select_item(item)?);
        }

        if let Some(from) = node.child(Rule::FromClause) {
            let table = required(from.child(Rule::TableSource), "table")?;
            builder = builder.from(self.visit_table_source(table)?);
        }
        for join in node.children_of(Rule::JoinClause) {
            let (table, join_type, on) = self.visit_join(join)?;
            builder = builder.join(table, join_type, on);
        }
        if let Some(clause) = node.child(Rule::WhereClause) {
            builder = builder.where_(self.visit_expr(nth_node(clause, 0)?)?);
        }
        if let Some(clause) = node.child(Rule::GroupByClause) {
            let exprs = clause
                .nodes()
                .map(|n| self.visit_expr(n))
                .collect::<SqlResult<Vec<_>>>()?;
            builder = builder.group_by(exprs);
        }
        if let Some(clause) = node.child(Rule::HavingClause) {
            builder = builder.having(self.visit_expr(nth_node(clause, 0)?)?);
        }
        Ok(builder)
    }

    fn visit_select_item(&self, node: &SyntaxNode) -> SqlResult<Expression> {
        let expr = self.visit_expr(nth_node(node, 0)?)?;
        match node.child(Rule::Alias) {
            Some(alias) => Ok(expr.alias(alias_name(alias)?)),
            None => Ok(expr),
        }
    }

    fn visit_table_source(&self, node: &SyntaxNode) -> SqlResult<TableSource> {
        let alias = node.child(Rule::Alias).map(alias_name).transpose()?;

        if let Some(query) = node.child(Rule::QueryExpression) {
            let alias =
                alias.ok_or_else(|| SqlError::invalid_query("derived table needs an alias"))?;
            return Ok(TableSource::derived(self.visit_query(query)?, alias));
        }

        let name = required(node.child(Rule::TableName), "table name")?;
        let parts: Vec<&str> = name.names().map(|t| t.text.as_str()).collect();
        let table = match parts.as_slice() {
            [name] => TableSource::named(*name),
            [schema, name] => TableSource::qualified(*schema, *name),
            _ => return Err(SqlError::unsupported("catalog-qualified table names")),
        };
        Ok(match alias {
            Some(alias) => table.with_alias(alias),
            None => table,
        })
    }

    fn visit_join(&self, node: &SyntaxNode) -> SqlResult<(TableSource, JoinTableType, Expression)> {
        let words = node
            .tokens()
            .take_while(|t| !t.is_keyword(Keyword::On))
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let join_type = JoinTableType::from_sql(&words)
            .ok_or_else(|| SqlError::unsupported(format!("join type {}", words)))?;
        let table = self.visit_table_source(nth_node(node, 0)?)?;
        let on = self.visit_expr(nth_node(node, 1)?)?;
        Ok((table, join_type, on))
    }

    fn visit_order_by(&self, node: &SyntaxNode) -> SqlResult<Vec<OrderExpr>> {
        node.children_of(Rule::OrderItem)
            .map(|item| {
                let direction = if item.has_keyword(Keyword::Desc) {
                    OrderType::Desc
                } else {
                    OrderType::Asc
                };
                Ok(OrderExpr::new(self.visit_expr(nth_node(item, 0)?)?, direction))
            })
            .collect()
    }

    /// `(limit, offset)` of a LIMIT clause.
    fn visit_limit(&self, node: &SyntaxNode) -> SqlResult<(Option<u64>, Option<u64>)> {
        let mut limit: Option<RowCount> = None;
        let mut offset: Option<u64> = None;
        let mut in_offset = false;
        let mut after_comma = false;
        let mut negative = false;

        for token in node.tokens() {
            match token.kind {
                TokenKind::Keyword(Keyword::Limit) => in_offset = false,
                TokenKind::Keyword(Keyword::Offset) => in_offset = true,
                TokenKind::Symbol(Symbol::Comma) => after_comma = true,
                TokenKind::Symbol(Symbol::Minus) => negative = true,
                TokenKind::Number => {
                    let count = self.row_count(token, negative)?;
                    negative = false;
                    if in_offset {
                        offset = Some(self.offset_value(token, count)?);
                    } else if after_comma {
                        // LIMIT offset, count
                        if let Some(first) = limit.take() {
                            offset = Some(self.offset_value(token, first)?);
                        }
                        limit = Some(count);
                    } else {
                        limit = Some(count);
                    }
                }
                _ => {}
            }
        }

        let limit = match limit {
            Some(RowCount::Rows(n)) => Some(n),
            Some(RowCount::Unbounded) | None => None,
        };
        Ok((limit, offset))
    }

    fn row_count(&self, token: &Token, negative: bool) -> SqlResult<RowCount> {
        let value: u64 = token.text.parse().map_err(|_| {
            error_at(self.source, token.offset, &token.text, "row count must be an integer")
        })?;
        Ok(match (negative, value) {
            (true, _) | (false, u64::MAX) => RowCount::Unbounded,
            (false, n) => RowCount::Rows(n),
        })
    }

    fn offset_value(&self, token: &Token, count: RowCount) -> SqlResult<u64> {
        match count {
            RowCount::Rows(n) => Ok(n),
            RowCount::Unbounded => Err(error_at(
                self.source,
                token.offset,
                &token.text,
                "offset must be a non-negative integer",
            )),
        }
    }

    pub fn visit_expr(&self, node: &SyntaxNode) -> SqlResult<Expression> {
        match node.rule {
            Rule::OrExpr | Rule::AndExpr => {
                let operator = if node.rule == Rule::OrExpr {
                    ConditionOperator::Or
                } else {
                    ConditionOperator::And
                };
                let items = node
                    .nodes()
                    .map(|n| self.visit_expr(n))
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(Condition::new(operator, items)?.into())
            }
            Rule::ParenExpr => self.visit_expr(nth_node(node, 0)?),
            Rule::Predicate => self.visit_predicate(node),
            Rule::Subquery => {
                let query = required(node.child(Rule::QueryExpression), "subquery")?;
                Ok(Expression::Subquery(Box::new(self.visit_query(query)?)))
            }
            Rule::ExprList => {
                let items = node
                    .nodes()
                    .map(|n| self.visit_expr(n))
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(ExprList::new(items)?.into())
            }
            Rule::CaseExpr => self.visit_case(node),
            Rule::FunctionCall => self.visit_function(node),
            Rule::ColumnRef => visit_column_ref(node),
            Rule::Literal => Ok(visit_literal(node)),
            other => Err(SqlError::invalid_expression(format!(
                "{:?} is not an expression",
                other
            ))),
        }
    }

    fn visit_predicate(&self, node: &SyntaxNode) -> SqlResult<Expression> {
        let negated = node.has_keyword(Keyword::Not);
        let left = self.visit_expr(nth_node(node, 0)?)?;

        if node.has_keyword(Keyword::Exists) {
            let op = BooleanOperator::Exists.negated_if(negated);
            return Ok(BooleanExpr::new(left, op, None)?.into());
        }
        if node.has_keyword(Keyword::Is) {
            let op = BooleanOperator::IsNull.negated_if(negated);
            return Ok(BooleanExpr::new(left, op, None)?.into());
        }
        if node.has_keyword(Keyword::Between) {
            let low = self.visit_expr(nth_node(node, 1)?)?;
            let high = self.visit_expr(nth_node(node, 2)?)?;
            return Ok(BooleanExpr::between(left, low, high, negated).into());
        }

        let right = self.visit_expr(nth_node(node, 1)?)?;
        let op = if node.has_keyword(Keyword::Like) {
            BooleanOperator::Like.negated_if(negated)
        } else if node.has_keyword(Keyword::In) {
            BooleanOperator::In.negated_if(negated)
        } else {
            let symbol = node
                .tokens()
                .find(|t| matches!(t.kind, TokenKind::Symbol(s) if s.is_comparison()))
                .ok_or_else(|| SqlError::invalid_expression("predicate without operator"))?;
            BooleanOperator::from_sql(&symbol.text).ok_or_else(|| {
                SqlError::unsupported(format!("comparison operator {}", symbol.text))
            })?
        };
        Ok(BooleanExpr::new(left, op, Some(right))?.into())
    }

    /// A simple CASE (`CASE x WHEN v ...`) becomes a searched CASE comparing `x = v`.
    fn visit_case(&self, node: &SyntaxNode) -> SqlResult<Expression> {
        let operand = node
            .nodes()
            .find(|n| !matches!(n.rule, Rule::WhenClause | Rule::ElseClause))
            .map(|n| self.visit_expr(n))
            .transpose()?;

        let mut when_then = Vec::new();
        for clause in node.children_of(Rule::WhenClause) {
            let when = self.visit_expr(nth_node(clause, 0)?)?;
            let then = self.visit_expr(nth_node(clause, 1)?)?;
            let when = match &operand {
                Some(subject) => {
                    BooleanExpr::new(subject.clone(), BooleanOperator::Eq, Some(when))?.into()
                }
                None => when,
            };
            when_then.push((when, then));
        }
        let else_result = node
            .child(Rule::ElseClause)
            .map(|clause| nth_node(clause, 0).and_then(|n| self.visit_expr(n)))
            .transpose()?;
        Ok(CaseExpr::new(when_then, else_result)?.into())
    }

    fn visit_function(&self, node: &SyntaxNode) -> SqlResult<Expression> {
        let name = node
            .names()
            .next()
            .ok_or_else(|| SqlError::invalid_expression("function without a name"))?;
        let args = node
            .nodes()
            .map(|n| self.visit_expr(n))
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(FuncCall::new(name.text.clone(), args)?
            .with_distinct(node.has_keyword(Keyword::Distinct))
            .into())
    }
}

fn visit_column_ref(node: &SyntaxNode) -> SqlResult<Expression> {
    let parts: Vec<&str> = node.names().map(|t| t.text.as_str()).collect();
    if node.has_symbol(Symbol::Star) {
        return match parts.as_slice() {
            [] => Ok(Expression::Star(None)),
            [table] => Ok(Expression::Star(Some(table.to_string()))),
            _ => Err(SqlError::unsupported("schema-qualified star")),
        };
    }
    let column = match parts.as_slice() {
        [name] => Column::new(*name),
        [table, name] => Column::qualified(*table, *name),
        [schema, table, name] => Column::qualified(*table, *name).with_schema(*schema),
        _ => return Err(SqlError::unsupported("column references with more than three parts")),
    };
    Ok(column.into())
}

fn visit_literal(node: &SyntaxNode) -> Expression {
    let negative = node.has_symbol(Symbol::Minus);
    match node.tokens().last() {
        Some(token) if token.kind == TokenKind::String => Expression::Value(token.text.clone()),
        Some(token) if token.kind == TokenKind::Number && negative => {
            Expression::Literal(format!("-{}", token.text))
        }
        Some(token) if token.kind == TokenKind::Number => Expression::Literal(token.text.clone()),
        Some(token) => Expression::Literal(token.text.to_uppercase()),
        None => Expression::Literal(String::new()),
    }
}

fn alias_name(node: &SyntaxNode) -> SqlResult<String> {
    node.names()
        .next()
        .map(|t| t.text.clone())
        .ok_or_else(|| SqlError::invalid_expression("alias without a name"))
}

fn nth_node(node: &SyntaxNode, n: usize) -> SqlResult<&SyntaxNode> {
    node.nodes().nth(n).ok_or_else(|| {
        SqlError::invalid_expression(format!("{:?} is missing operand {}", node.rule, n + 1))
    })
}

fn required<'n>(node: Option<&'n SyntaxNode>, what: &str) -> SqlResult<&'n SyntaxNode> {
    node.ok_or_else(|| SqlError::invalid_query(format!("missing {}", what)))
}
