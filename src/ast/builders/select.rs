//! Fluent builders for single selects and combined queries.

use std::collections::HashSet;

use tracing::debug;

use crate::ast::{
    CombineOperator, Condition, Expression, JoinTableSource, JoinTableType, OrderExpr,
    SelectQuery, SingleSelect, TableSource,
};
use crate::error::{SqlError, SqlResult};

/// Start a select over the given fields.
pub fn select<E: Into<Expression>>(fields: impl IntoIterator<Item = E>) -> SelectBuilder {
    SelectBuilder::new().with_fields(fields)
}

/// Assembles a [`SingleSelect`].
///
/// Chaining never fails; structural problems (duplicate join names) surface from
/// [`build`](Self::build). Without a FROM table the result is a select-list fragment and
/// every other clause is dropped.
#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    distinct: bool,
    fields: Vec<Expression>,
    from: Option<TableSource>,
    joins: Vec<JoinTableSource>,
    conditions: Vec<Expression>,
    group_by: Vec<Expression>,
    having: Vec<Expression>,
    order_by: Vec<OrderExpr>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields<E: Into<Expression>>(mut self, fields: impl IntoIterator<Item = E>) -> Self {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn field(mut self, field: impl Into<Expression>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn from(mut self, table: impl Into<TableSource>) -> Self {
        self.from = Some(table.into());
        self
    }

    pub fn join(
        mut self,
        table: impl Into<TableSource>,
        join_type: JoinTableType,
        on: impl Into<Expression>,
    ) -> Self {
        self.joins.push(JoinTableSource::new(table, join_type, on));
        self
    }

    pub fn inner_join(self, table: impl Into<TableSource>, on: impl Into<Expression>) -> Self {
        self.join(table, JoinTableType::Inner, on)
    }

    pub fn left_join(self, table: impl Into<TableSource>, on: impl Into<Expression>) -> Self {
        self.join(table, JoinTableType::Left, on)
    }

    /// Add a WHERE condition. Several conditions are joined with AND.
    pub fn where_(mut self, condition: impl Into<Expression>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn group_by<E: Into<Expression>>(mut self, exprs: impl IntoIterator<Item = E>) -> Self {
        self.group_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Add a HAVING condition. Several conditions are joined with AND.
    pub fn having(mut self, condition: impl Into<Expression>) -> Self {
        self.having.push(condition.into());
        self
    }

    pub fn order_by(mut self, order: OrderExpr) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub(crate) fn has_order(&self) -> bool {
        !self.order_by.is_empty()
    }

    pub(crate) fn has_pagination(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }

    /// Whether [`build`](Self::build) would drop clauses because there is no FROM table.
    pub(crate) fn has_clauses_without_from(&self) -> bool {
        self.from.is_none()
            && (!self.joins.is_empty()
                || !self.conditions.is_empty()
                || !self.group_by.is_empty()
                || !self.having.is_empty()
                || self.has_order()
                || self.has_pagination())
    }

    pub fn build(self) -> SqlResult<SingleSelect> {
        let select_list = if self.fields.is_empty() {
            vec![Expression::Star(None)]
        } else {
            self.fields
        };

        let Some(from) = self.from else {
            debug!(
                fields = select_list.len(),
                "no FROM table, building select-list fragment"
            );
            return Ok(SingleSelect {
                distinct: self.distinct,
                select_list,
                ..Default::default()
            });
        };

        let mut seen = HashSet::new();
        seen.insert(from.reference_name().to_string());
        for join in &self.joins {
            let name = join.table.reference_name();
            if !seen.insert(name.to_string()) {
                return Err(SqlError::invalid_query(format!(
                    "table '{}' is joined more than once",
                    name
                )));
            }
        }

        Ok(SingleSelect {
            distinct: self.distinct,
            select_list,
            from: Some(from),
            joins: self.joins,
            where_clause: combine_and(self.conditions)?,
            group_by: self.group_by,
            having: combine_and(self.having)?,
            order_by: self.order_by,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

fn combine_and(mut conditions: Vec<Expression>) -> SqlResult<Option<Expression>> {
    match conditions.len() {
        0 => Ok(None),
        1 => Ok(conditions.pop()),
        _ => Ok(Some(Condition::and(conditions)?.into())),
    }
}

/// Combines single selects with one set operator.
#[derive(Debug, Clone)]
pub struct SelectQueryBuilder {
    operator: Option<CombineOperator>,
    selects: Vec<SingleSelect>,
    conflict: Option<CombineOperator>,
}

impl SelectQueryBuilder {
    pub fn new(first: SingleSelect) -> Self {
        Self {
            operator: None,
            selects: vec![first],
            conflict: None,
        }
    }

    /// Append a member. Every member must use the same operator.
    pub fn combine(mut self, operator: CombineOperator, next: SingleSelect) -> Self {
        match self.operator {
            Some(existing) if existing != operator => {
                self.conflict.get_or_insert(operator);
            }
            _ => self.operator = Some(operator),
        }
        self.selects.push(next);
        self
    }

    pub fn union(self, next: SingleSelect) -> Self {
        self.combine(CombineOperator::Union, next)
    }

    pub fn union_all(self, next: SingleSelect) -> Self {
        self.combine(CombineOperator::UnionAll, next)
    }

    pub fn intersect(self, next: SingleSelect) -> Self {
        self.combine(CombineOperator::Intersect, next)
    }

    pub fn intersect_all(self, next: SingleSelect) -> Self {
        self.combine(CombineOperator::IntersectAll, next)
    }

    pub fn except(self, next: SingleSelect) -> Self {
        self.combine(CombineOperator::Except, next)
    }

    pub fn except_all(self, next: SingleSelect) -> Self {
        self.combine(CombineOperator::ExceptAll, next)
    }

    pub fn build(self) -> SqlResult<SelectQuery> {
        if let (Some(first), Some(other)) = (self.operator, self.conflict) {
            return Err(SqlError::invalid_query(format!(
                "cannot mix {} and {} in one query",
                first, other
            )));
        }
        SelectQuery::new(self.operator, self.selects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;

    #[test]
    fn test_empty_fields_become_star() {
        let select = SelectBuilder::new().from("users").build().unwrap();
        assert_eq!(select.select_list, vec![Expression::Star(None)]);
    }

    #[test]
    fn test_missing_from_drops_clauses() {
        let select = select(["a.id", "b.name"])
            .inner_join("b", eq("a.id", "b.id"))
            .where_(is_not_null("a.id"))
            .group_by(["a.id"])
            .limit(5)
            .build()
            .unwrap();
        assert!(select.is_fragment());
        assert!(!SelectBuilder::new().field("a").has_clauses_without_from());
        assert!(SelectBuilder::new().field("a").limit(0).has_clauses_without_from());
        assert!(select.joins.is_empty());
        assert!(select.where_clause.is_none());
        assert!(select.group_by.is_empty());
        assert_eq!(select.limit, None);
    }

    #[test]
    fn test_where_conditions_are_anded() {
        let select = select(["id"])
            .from("users")
            .where_(eq("a", 1))
            .where_(is_null("b"))
            .build()
            .unwrap();
        match select.where_clause {
            Some(Expression::Condition(c)) => assert_eq!(c.items().len(), 2),
            other => panic!("expected AND condition, got {:?}", other),
        }

        let single = select_one_where();
        assert!(matches!(single.where_clause, Some(Expression::Boolean(_))));
    }

    fn select_one_where() -> SingleSelect {
        select(["id"])
            .from("users")
            .where_(eq("a", 1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_duplicate_join_rejected() {
        let err = select(["a.id"])
            .from("a")
            .inner_join("b", eq("a.id", "b.id"))
            .left_join("b", eq("a.id", "b.id"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SqlError::InvalidQuery(_)));

        let ok = select(["a.id"])
            .from("a")
            .inner_join(TableSource::named("a").with_alias("a2"), eq("a.id", "a2.id"))
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn test_mixed_operators_rejected() {
        let s = select_one_where();
        let err = SelectQueryBuilder::new(s.clone())
            .union(s.clone())
            .except(s)
            .build()
            .unwrap_err();
        assert!(matches!(err, SqlError::InvalidQuery(_)));
    }

    #[test]
    fn test_union_all_query() {
        let s = select_one_where();
        let query = SelectQueryBuilder::new(s.clone()).union_all(s).build().unwrap();
        assert_eq!(query.combine_operator(), Some(CombineOperator::UnionAll));
        assert_eq!(query.single_selects().len(), 2);

        let lone = SelectQueryBuilder::new(select_one_where()).build().unwrap();
        assert!(!lone.is_compound());
    }
}
