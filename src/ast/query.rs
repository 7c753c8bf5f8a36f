use serde::{Deserialize, Serialize};

use crate::ast::expr::{Expression, OrderExpr};
use crate::ast::operators::{CombineOperator, JoinTableType};
use crate::error::{SqlError, SqlResult};

/// A table in FROM or JOIN position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableSource {
    Named {
        schema: Option<String>,
        name: String,
        alias: Option<String>,
    },
    /// Parenthesized query; the alias is mandatory.
    Derived {
        query: Box<SelectQuery>,
        alias: String,
    },
}

impl TableSource {
    pub fn named(name: impl Into<String>) -> Self {
        TableSource::Named {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        TableSource::Named {
            schema: Some(schema.into()),
            name: name.into(),
            alias: None,
        }
    }

    pub fn derived(query: SelectQuery, alias: impl Into<String>) -> Self {
        TableSource::Derived {
            query: Box::new(query),
            alias: alias.into(),
        }
    }

    /// Set the alias of a named table, or replace the alias of a derived one.
    pub fn with_alias(self, new_alias: impl Into<String>) -> Self {
        match self {
            TableSource::Named { schema, name, .. } => TableSource::Named {
                schema,
                name,
                alias: Some(new_alias.into()),
            },
            TableSource::Derived { query, .. } => TableSource::Derived {
                query,
                alias: new_alias.into(),
            },
        }
    }

    /// The name other clauses use to refer to this table: alias first, then table name.
    pub fn reference_name(&self) -> &str {
        match self {
            TableSource::Named {
                alias: Some(alias), ..
            } => alias,
            TableSource::Named { name, .. } => name,
            TableSource::Derived { alias, .. } => alias,
        }
    }
}

impl From<&str> for TableSource {
    /// `name` or `schema.name`
    fn from(path: &str) -> Self {
        match path.split_once('.') {
            Some((schema, name)) => TableSource::qualified(schema, name),
            None => TableSource::named(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinTableSource {
    pub table: TableSource,
    pub join_type: JoinTableType,
    pub on_condition: Expression,
}

impl JoinTableSource {
    pub fn new(
        table: impl Into<TableSource>,
        join_type: JoinTableType,
        on_condition: impl Into<Expression>,
    ) -> Self {
        Self {
            table: table.into(),
            join_type,
            on_condition: on_condition.into(),
        }
    }
}

/// One SELECT ... [FROM ...] block.
///
/// Fields are public like a plain record; [`SelectBuilder`](crate::ast::builders::SelectBuilder)
/// is the checked way to assemble one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SingleSelect {
    pub distinct: bool,
    pub select_list: Vec<Expression>,
    pub from: Option<TableSource>,
    pub joins: Vec<JoinTableSource>,
    pub where_clause: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderExpr>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SingleSelect {
    /// A select with no FROM table renders as a bare field list.
    pub fn is_fragment(&self) -> bool {
        self.from.is_none()
    }

    pub fn has_pagination(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }

    /// Number of output columns, unknown when the list contains a star.
    pub fn projected_arity(&self) -> Option<usize> {
        if self.select_list.iter().any(Expression::is_star) {
            None
        } else {
            Some(self.select_list.len())
        }
    }

    /// Reference names of the FROM table and every joined table, in order.
    pub fn table_names(&self) -> Vec<&str> {
        self.from
            .iter()
            .chain(self.joins.iter().map(|j| &j.table))
            .map(TableSource::reference_name)
            .collect()
    }
}

/// One or more single selects, combined by a set operator when there are several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SelectQueryParts")]
pub struct SelectQuery {
    combine_operator: Option<CombineOperator>,
    single_selects: Vec<SingleSelect>,
}

#[derive(Deserialize)]
struct SelectQueryParts {
    combine_operator: Option<CombineOperator>,
    single_selects: Vec<SingleSelect>,
}

impl TryFrom<SelectQueryParts> for SelectQuery {
    type Error = SqlError;

    fn try_from(parts: SelectQueryParts) -> SqlResult<Self> {
        SelectQuery::new(parts.combine_operator, parts.single_selects)
    }
}

impl SelectQuery {
    pub fn new(
        combine_operator: Option<CombineOperator>,
        single_selects: Vec<SingleSelect>,
    ) -> SqlResult<Self> {
        match (combine_operator, single_selects.len()) {
            (_, 0) => Err(SqlError::invalid_query("query has no select")),
            (Some(op), 1) => Err(SqlError::invalid_query(format!(
                "{} needs at least two selects",
                op
            ))),
            (None, n) if n > 1 => Err(SqlError::invalid_query(format!(
                "{} selects given without a combine operator",
                n
            ))),
            _ => Ok(Self {
                combine_operator,
                single_selects,
            }),
        }
    }

    pub fn single(select: SingleSelect) -> Self {
        Self {
            combine_operator: None,
            single_selects: vec![select],
        }
    }

    pub fn combine_operator(&self) -> Option<CombineOperator> {
        self.combine_operator
    }

    pub fn single_selects(&self) -> &[SingleSelect] {
        &self.single_selects
    }

    pub fn is_compound(&self) -> bool {
        self.combine_operator.is_some()
    }

    /// First pair of differing member arities, ignoring members that project a star.
    ///
    /// Mismatches are reported, never rejected.
    pub fn arity_mismatch(&self) -> Option<(usize, usize)> {
        let mut arities = self
            .single_selects
            .iter()
            .filter_map(SingleSelect::projected_arity);
        let first = arities.next()?;
        arities.find(|&n| n != first).map(|n| (first, n))
    }
}

impl From<SingleSelect> for SelectQuery {
    fn from(select: SingleSelect) -> Self {
        SelectQuery::single(select)
    }
}
